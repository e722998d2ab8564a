use crate::library::Collection;
use crate::song::SongRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

pub const LIBRARY_INDEX_VERSION: i64 = 1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongsIndex<'a> {
    pub song_count: usize,
    pub songs: &'a [SongRecord],
}

impl<'a> SongsIndex<'a> {
    pub fn new(songs: &'a [SongRecord]) -> SongsIndex<'a> {
        SongsIndex {
            song_count: songs.len(),
            songs,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LibraryIndex<'a> {
    pub version: i64,
    pub songs: &'a [SongRecord],
    pub collections: &'a [Collection],
}

impl<'a> LibraryIndex<'a> {
    pub fn new(songs: &'a [SongRecord], collections: &'a [Collection]) -> LibraryIndex<'a> {
        LibraryIndex {
            version: LIBRARY_INDEX_VERSION,
            songs,
            collections,
        }
    }
}

/// Pretty-printed JSON with a trailing newline.
pub fn to_stable_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// Serializes `value` next to `path` and renames it into place, so readers
/// never observe a partially written artifact.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("Output path has no parent directory: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let text = to_stable_json(value)?;
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(text.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote {} ({} bytes)", path.display(), text.len());
    Ok(())
}
