//! The consolidation pipeline: collections and songs are loaded independently,
//! cross-checked, and persisted as derived index artifacts plus a run log.

use crate::config::AppConfig;
use crate::index::{write_json_atomic, LibraryIndex, RunInputs, RunLog, RunOutputs, SongsIndex};
use crate::library::{
    aggregate_songs, load_collections, validate_references, CollectionDocument, CollectionSchema,
    ReferenceReport, ScanError,
};
use crate::song::SongRecord;
use crate::timestamps::{new_run_id, now_local_iso};
use anyhow::Result;
use tracing::{error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// Indexes were produced but the log carries errors, e.g. a malformed
    /// collection document.
    CompletedWithErrors,
    /// The songs directory does not exist. Only the run log is produced.
    SongsDirMissing,
    /// An I/O failure stopped the run.
    Failed,
}

impl RunStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::CompletedWithErrors | RunStatus::Failed => 1,
            RunStatus::SongsDirMissing => 2,
        }
    }

    /// Whether the song and library indexes exist for this run.
    pub fn has_indexes(&self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::CompletedWithErrors)
    }
}

#[derive(Debug)]
pub struct Consolidation {
    pub status: RunStatus,
    /// Ordered song list, empty when the run stopped before indexing.
    pub songs: Vec<SongRecord>,
    pub collections: CollectionDocument,
    pub collection_schema: Option<CollectionSchema>,
    pub references: ReferenceReport,
    pub log: RunLog,
}

impl Consolidation {
    fn stopped(status: RunStatus, mut log: RunLog) -> Consolidation {
        log.finish(now_local_iso());
        Consolidation {
            status,
            songs: vec![],
            collections: CollectionDocument::empty(),
            collection_schema: None,
            references: ReferenceReport::default(),
            log,
        }
    }
}

fn new_run_log(config: &AppConfig) -> RunLog {
    RunLog::new(
        new_run_id(),
        now_local_iso(),
        config.repo_root.display().to_string(),
        RunInputs {
            songs_dir: config.songs_dir.display().to_string(),
            setlists: config.collections_file.display().to_string(),
        },
        RunOutputs {
            songs_index: config.songs_index_path().display().to_string(),
            library_index: config.library_index_path().display().to_string(),
            log: config.run_log_path().display().to_string(),
        },
    )
}

/// Builds every artifact in memory. Nothing is written.
pub fn consolidate(config: &AppConfig) -> Consolidation {
    let mut log = new_run_log(config);

    if !config.songs_dir.is_dir() {
        log.error(format!("Missing songs folder: {}", config.songs_dir.display()));
        return Consolidation::stopped(RunStatus::SongsDirMissing, log);
    }

    let (collections, collection_schema) = match load_collections(&config.collections_file) {
        Ok(loaded) => (loaded.document, Some(loaded.schema)),
        Err(err) => {
            log.error(format!(
                "Failed to parse {}: {}",
                config.collections_file.display(),
                err
            ));
            (CollectionDocument::empty(), None)
        }
    };
    log.counts.setlists = collections.collections.len();
    log.counts.setlist_sets = collections.sets_count();

    let library = match aggregate_songs(
        &config.repo_root,
        &config.songs_dir,
        &config.extensions,
        config.warning_cap,
        &mut log,
    ) {
        Ok(library) => library,
        Err(err) => {
            let status = match err {
                ScanError::SongsDirMissing(_) => RunStatus::SongsDirMissing,
                _ => RunStatus::Failed,
            };
            log.error(err.to_string());
            return Consolidation::stopped(status, log);
        }
    };

    let songs = library.sorted_songs();
    log.counts.songs_indexed = songs.len();

    let references = validate_references(&collections, &library, config.warning_cap, &mut log);

    log.finish(now_local_iso());
    let status = if log.has_errors() {
        RunStatus::CompletedWithErrors
    } else {
        RunStatus::Success
    };

    Consolidation {
        status,
        songs,
        collections,
        collection_schema,
        references,
        log,
    }
}

fn write_indexes(config: &AppConfig, consolidation: &Consolidation) -> Result<()> {
    write_json_atomic(
        &config.songs_index_path(),
        &SongsIndex::new(&consolidation.songs),
    )?;
    write_json_atomic(
        &config.library_index_path(),
        &LibraryIndex::new(&consolidation.songs, &consolidation.collections.collections),
    )?;
    Ok(())
}

/// Persists the artifacts of `consolidation`. The run log is always written;
/// the indexes only when the run got far enough to build them.
pub fn write_outputs(config: &AppConfig, consolidation: &mut Consolidation) -> Result<()> {
    if consolidation.status.has_indexes() {
        if let Err(err) = write_indexes(config, consolidation) {
            consolidation.log.error(format!("{:#}", err));
            consolidation.status = RunStatus::Failed;
        }
    }
    write_json_atomic(&config.run_log_path(), &consolidation.log)
}

/// Consolidates and writes everything. `Err` means not even the run log could
/// be written.
pub fn run(config: &AppConfig) -> Result<Consolidation> {
    let mut consolidation = consolidate(config);
    write_outputs(config, &mut consolidation)?;
    Ok(consolidation)
}

pub fn report_summary(config: &AppConfig, consolidation: &Consolidation, wrote_outputs: bool) {
    let log = &consolidation.log;

    if !consolidation.status.has_indexes() {
        error!("Consolidation failed:");
        for err in log.errors.iter() {
            error!(" - {}", err);
        }
        if wrote_outputs {
            info!("Log written: {}", config.run_log_path().display());
        }
        return;
    }

    match (log.has_errors(), log.warnings.is_empty()) {
        (true, _) => error!(
            "Consolidation completed with {} errors and {} warnings.",
            log.errors.len(),
            log.warnings.len()
        ),
        (false, true) => info!("Consolidation complete, no issues found."),
        (false, false) => info!(
            "Consolidation complete, check the {} warnings above.",
            log.warnings.len()
        ),
    }
    info!(" - Songs indexed: {}", log.counts.songs_indexed);
    info!(" - Song files found: {}", log.counts.cho_files_found);
    info!(" - Missing UID files: {}", log.counts.uids_missing);
    info!(" - Collections: {}", log.counts.setlists);
    info!(
        " - Setlist missing UIDs: {}",
        log.counts.setlist_missing_uids
    );
    if wrote_outputs {
        info!("Outputs:");
        info!(" - {}", config.songs_index_path().display());
        info!(" - {}", config.library_index_path().display());
        info!(" - {}", config.run_log_path().display());
    } else {
        info!("Check only, nothing was written.");
    }
}
