//! Songbook Consolidator Library
//!
//! Rebuilds the derived song and library indexes of a ChordPro songbook
//! repository. Song files under `songs/` and the collection document under
//! `library/` are only ever read.

pub mod config;
pub mod consolidate;
pub mod index;
pub mod library;
pub mod song;
pub mod timestamps;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, FileConfig};
pub use consolidate::{consolidate, run, write_outputs, Consolidation, RunStatus};
pub use index::RunLog;
pub use library::{CollectionDocument, SongLibrary};
pub use song::SongRecord;
