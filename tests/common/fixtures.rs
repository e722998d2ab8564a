//! Throwaway songbook repositories for end-to-end tests

use super::constants::*;
use serde_json::Value;
use songbook_consolidator::AppConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A repository root living in a temp dir, removed on drop.
pub struct TestRepo {
    pub dir: TempDir,
}

impl TestRepo {
    /// Repository with an empty `songs/` folder and no collection document.
    pub fn new() -> Self {
        let repo = Self::bare();
        fs::create_dir_all(repo.root().join("songs")).expect("Failed to create songs dir");
        repo
    }

    /// Repository root without any `songs/` folder.
    pub fn bare() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Fixture songbook: three songs, one file without uid, canonical collections.
    pub fn with_default_songs() -> Self {
        let repo = Self::new();
        repo.write_song("songs/amazing-grace/lead.cho", SONG_A_LEAD);
        repo.write_song("songs/amazing-grace/harmony.cho", SONG_A_HARMONY);
        repo.write_song("songs/blackbird.cho", SONG_B);
        repo.write_song("songs/yesterday.cho", SONG_C);
        repo.write_song("songs/drafts/untitled.cho", SONG_NO_UID);
        repo.write_song("songs/README.txt", "not a song");
        repo.write_collections(CANONICAL_COLLECTIONS);
        repo
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> AppConfig {
        AppConfig::for_repo(self.root()).expect("Failed to resolve config")
    }

    pub fn write_song(&self, rel_path: &str, text: &str) -> PathBuf {
        let path = self.root().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create song dir");
        }
        fs::write(&path, text).expect("Failed to write song file");
        path
    }

    pub fn write_collections(&self, text: &str) -> PathBuf {
        let path = self.root().join("library").join("setlists.json");
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create library dir");
        fs::write(&path, text).expect("Failed to write collection document");
        path
    }

    pub fn songs_index_path(&self) -> PathBuf {
        self.root().join("library").join("songs.index.json")
    }

    pub fn library_index_path(&self) -> PathBuf {
        self.root().join("library").join("library.index.json")
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.root().join("library").join("consolidate.log.json")
    }

    pub fn read_bytes(&self, path: &Path) -> Vec<u8> {
        fs::read(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    pub fn read_json(&self, path: &Path) -> Value {
        serde_json::from_slice(&self.read_bytes(path))
            .unwrap_or_else(|e| panic!("Invalid JSON in {}: {}", path.display(), e))
    }
}
