mod run_log;
mod writer;

pub use run_log::{RunCounts, RunInputs, RunLog, RunOutputs};
pub use writer::{
    to_stable_json, write_json_atomic, LibraryIndex, SongsIndex, LIBRARY_INDEX_VERSION,
};
