//! Offline rewrite of a collection document into the canonical schema.

use super::{load_collections, CollectionDocument, CollectionSchema};
use crate::index::write_json_atomic;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationReport {
    pub schema: CollectionSchema,
    pub collections: usize,
    pub duplicates_removed: usize,
}

/// Drops repeated song references within each set, keeping the first
/// occurrence in place. Returns how many references were removed.
pub fn dedupe_set_songs(document: &mut CollectionDocument) -> usize {
    let mut removed = 0;
    for collection in document.collections.iter_mut() {
        let Some(sets) = collection.sets_mut() else {
            continue;
        };
        for set in sets.iter_mut() {
            let Some(Value::Array(songs)) = set.get_mut("songs") else {
                continue;
            };
            let mut kept: Vec<Value> = Vec::with_capacity(songs.len());
            for song in songs.drain(..) {
                if kept.contains(&song) {
                    removed += 1;
                } else {
                    kept.push(song);
                }
            }
            *songs = kept;
        }
    }
    removed
}

/// Resolves `path` to an absolute path without symlinks or `..` segments.
/// `path` may not exist yet, its parent directory is created if needed.
fn resolve_output(path: &Path) -> Result<PathBuf> {
    if let Ok(resolved) = path.canonicalize() {
        return Ok(resolved);
    }
    let file_name = path
        .file_name()
        .with_context(|| format!("Output path has no file name: {}", path.display()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    let parent = parent
        .canonicalize()
        .with_context(|| format!("Error resolving path: {}", parent.display()))?;
    Ok(parent.join(file_name))
}

fn same_file(input: &Path, output: &Path) -> Result<bool> {
    let input = input
        .canonicalize()
        .with_context(|| format!("Error resolving path: {}", input.display()))?;
    Ok(input == resolve_output(output)?)
}

/// Loads `input` in either schema and writes it to `output` in canonical form.
/// `input` itself is never modified.
pub fn migrate_collection_file(input: &Path, output: &Path, force: bool) -> Result<MigrationReport> {
    if !input.is_file() {
        bail!("Collection document not found: {}", input.display());
    }
    if same_file(input, output)? {
        bail!("Refusing to overwrite the source document {}", input.display());
    }
    if output.exists() && !force {
        bail!(
            "Output {} already exists, pass --force to replace it",
            output.display()
        );
    }

    let loaded = load_collections(input)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    let mut document = loaded.document;
    let duplicates_removed = dedupe_set_songs(&mut document);

    write_json_atomic(output, &document)?;
    info!(
        "Wrote {} collections to {} ({} duplicate references removed)",
        document.collections.len(),
        output.display(),
        duplicates_removed
    );

    Ok(MigrationReport {
        schema: loaded.schema,
        collections: document.collections.len(),
        duplicates_removed,
    })
}
