//! Song file discovery and the per-uid merge.
//!
//! Reading and tag parsing run on the rayon pool, but merging always happens
//! sequentially in sorted path order: the first file (by path) to provide a
//! field or claim a persona keeps it.

use crate::index::RunLog;
use crate::song::{
    parse_tags, PersonaSlot, SlotClaim, SongFileMeta, SongRecord, FALLBACK_PERSONA_LABEL,
};
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Missing songs folder: {0}")]
    SongsDirMissing(PathBuf),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One song file after parsing, before it is merged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongFile {
    pub rel_path: String,
    pub meta: SongFileMeta,
}

/// Songs merged by uid, plus the files that could not be attributed to any.
#[derive(Clone, Debug, Default)]
pub struct SongLibrary {
    songs: BTreeMap<String, SongRecord>,
    missing_uid_files: Vec<String>,
}

impl SongLibrary {
    pub fn get(&self, uid: &str) -> Option<&SongRecord> {
        self.songs.get(uid)
    }

    pub fn contains_uid(&self, uid: &str) -> bool {
        self.songs.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn missing_uid_files(&self) -> &[String] {
        &self.missing_uid_files
    }

    /// Songs ordered by title, artist, then uid. Identical inputs always give
    /// the identical list, whatever order the filesystem listed the files in.
    pub fn sorted_songs(&self) -> Vec<SongRecord> {
        let mut songs: Vec<SongRecord> = self.songs.values().cloned().collect();
        songs.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        songs
    }
}

fn has_song_extension(file_name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| {
        file_name
            .strip_suffix(ext.as_str())
            .and_then(|stem| stem.strip_suffix('.'))
            .is_some()
    })
}

/// Every file under `songs_dir` with one of `extensions`, sorted by path.
pub fn discover_song_files(
    songs_dir: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, ScanError> {
    if !songs_dir.is_dir() {
        return Err(ScanError::SongsDirMissing(songs_dir.to_path_buf()));
    }

    let mut files = vec![];
    for entry in WalkDir::new(songs_dir) {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: songs_dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if has_song_extension(&entry.file_name().to_string_lossy(), extensions) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Path of `path` relative to `root`, always with `/` separators. A path
/// outside `root` climbs out of it with `..` segments.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let root: Vec<Component> = root.components().collect();
    let target: Vec<Component> = path.components().collect();
    let common = root
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    std::iter::repeat(Cow::Borrowed(".."))
        .take(root.len() - common)
        .chain(target[common..].iter().map(|c| c.as_os_str().to_string_lossy()))
        .collect::<Vec<_>>()
        .join("/")
}

fn read_song_file(repo_root: &Path, path: &Path) -> Result<SongFile, ScanError> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tags = parse_tags(&String::from_utf8_lossy(&bytes));
    Ok(SongFile {
        rel_path: relative_path(repo_root, path),
        meta: SongFileMeta::from_tags(&tags),
    })
}

/// Reads and parses `paths` in parallel. The output keeps the input order.
pub fn read_song_files(repo_root: &Path, paths: &[PathBuf]) -> Result<Vec<SongFile>, ScanError> {
    paths
        .par_iter()
        .map(|path| read_song_file(repo_root, path))
        .collect()
}

/// Merges parsed files into song records. `files` must already be in sorted
/// path order.
pub fn merge_song_files(files: Vec<SongFile>, log: &mut RunLog) -> SongLibrary {
    let mut library = SongLibrary::default();

    for SongFile { rel_path, meta } in files {
        let Some(uid) = meta.uid.clone() else {
            library.missing_uid_files.push(rel_path);
            continue;
        };

        let record = library
            .songs
            .entry(uid.clone())
            .or_insert_with(|| SongRecord::new(uid.clone()));
        record.absorb(&meta);

        match meta.persona.as_deref() {
            Some(persona) => {
                record.add_persona(persona);
                if persona == FALLBACK_PERSONA_LABEL {
                    log.warn(format!(
                        "UID {uid} declares persona '{persona}', which shadows the fallback slot: {rel_path}"
                    ));
                }
                let slot = PersonaSlot::Named(persona.to_owned());
                if let SlotClaim::Occupied { existing } = record.files.claim(slot, &rel_path) {
                    log.counts.uid_collisions_persona += 1;
                    log.warn(format!(
                        "UID {uid} has multiple files for persona '{persona}'. Keeping first: {existing}; ignoring: {rel_path}"
                    ));
                }
            }
            None => {
                log.counts.persona_missing += 1;
                match record.files.claim(PersonaSlot::Fallback, &rel_path) {
                    SlotClaim::Occupied { existing } => log.warn(format!(
                        "UID {uid} file missing persona tag and fallback '{FALLBACK_PERSONA_LABEL}' is already used by {existing}; skipping: {rel_path}"
                    )),
                    _ => log.warn(format!(
                        "UID {uid} file missing persona tag. Using fallback '{FALLBACK_PERSONA_LABEL}': {rel_path}"
                    )),
                }
            }
        }
    }

    for record in library.songs.values() {
        let files = record
            .files
            .iter()
            .map(|(_, path)| path)
            .collect::<Vec<_>>()
            .join(", ");
        if record.title.is_none() {
            log.warn(format!("UID {} missing {{title:}} in {}", record.uid, files));
        }
        if record.artist.is_none() {
            log.warn(format!("UID {} missing {{artist:}} in {}", record.uid, files));
        }
    }

    library
}

/// Discovers, reads and merges every song file under `songs_dir`.
pub fn aggregate_songs(
    repo_root: &Path,
    songs_dir: &Path,
    extensions: &[String],
    warning_cap: usize,
    log: &mut RunLog,
) -> Result<SongLibrary, ScanError> {
    let paths = discover_song_files(songs_dir, extensions)?;
    log.counts.cho_files_found = paths.len();
    info!("Scanning {} song files under {}", paths.len(), songs_dir.display());

    let files = read_song_files(repo_root, &paths)?;
    let library = merge_song_files(files, log);

    let missing = library.missing_uid_files();
    log.counts.uids_missing = missing.len();
    log.warn_capped(
        missing,
        warning_cap,
        |path| format!("Missing UID tag in: {path}"),
        |more| format!("...and {more} more files missing UID"),
    );

    debug!(
        "Merged {} songs, {} files without uid",
        library.len(),
        library.missing_uid_files().len()
    );
    Ok(library)
}
