//! Structured report of one consolidation run.
//!
//! A single `RunLog` is threaded by `&mut` through every pipeline stage. It is
//! serialized as the `consolidate.log.json` artifact whether or not the run
//! succeeds.

use serde::Serialize;
use tracing::{error, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInputs {
    pub songs_dir: String,
    pub setlists: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutputs {
    pub songs_index: String,
    pub library_index: String,
    pub log: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounts {
    pub cho_files_found: usize,
    pub songs_indexed: usize,
    pub uids_missing: usize,
    pub uid_collisions_persona: usize,
    pub persona_missing: usize,
    pub setlists: usize,
    pub setlist_sets: usize,
    pub setlist_songs_referenced: usize,
    pub setlist_missing_uids: usize,
    pub setlist_missing_uids_distinct: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLog {
    pub run_id: String,
    pub started: String,
    pub finished: Option<String>,
    pub repo_root: String,
    pub inputs: RunInputs,
    pub outputs: RunOutputs,
    pub counts: RunCounts,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl RunLog {
    pub fn new(
        run_id: impl Into<String>,
        started: impl Into<String>,
        repo_root: impl Into<String>,
        inputs: RunInputs,
        outputs: RunOutputs,
    ) -> RunLog {
        RunLog {
            run_id: run_id.into(),
            started: started.into(),
            finished: None,
            repo_root: repo_root.into(),
            inputs,
            outputs,
            counts: RunCounts::default(),
            warnings: vec![],
            errors: vec![],
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.errors.push(message);
    }

    /// Logs one warning per item up to `cap`, then a single summarizing entry
    /// built by `tail` from the number of items left out.
    pub fn warn_capped<I, F, T>(&mut self, items: &[I], cap: usize, describe: F, tail: T)
    where
        F: Fn(&I) -> String,
        T: FnOnce(usize) -> String,
    {
        for item in items.iter().take(cap) {
            self.warn(describe(item));
        }
        if items.len() > cap {
            self.warn(tail(items.len() - cap));
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn finish(&mut self, finished: impl Into<String>) {
        self.finished = Some(finished.into());
    }
}
