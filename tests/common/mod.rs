//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestRepo, SONG_A_UID};
//!
//! #[test]
//! fn test_consolidates() {
//!     let repo = TestRepo::with_default_songs();
//!     let consolidation = songbook_consolidator::run(&repo.config()).unwrap();
//!     assert!(consolidation.songs.iter().any(|s| s.uid == SONG_A_UID));
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::TestRepo;
