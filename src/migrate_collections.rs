//! Collection Migration Tool
//!
//! Rewrites a collection document (legacy `setlists` or canonical
//! `collections` schema) into the canonical schema, removing repeated song
//! references within each set. The input document is left untouched.

use anyhow::Result;
use clap::Parser;
use songbook_consolidator::config::{DEFAULT_COLLECTIONS_FILE, DEFAULT_LIBRARY_DIR};
use songbook_consolidator::library::{migrate_collection_file, CollectionSchema};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT_FILE: &str = "setlists.v2.json";

#[derive(Parser, Debug)]
#[command(name = "migrate-collections")]
#[command(about = "Rewrite a setlist document into the canonical collections schema")]
struct Args {
    /// Collection document to migrate. Defaults to library/setlists.json.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Where to write the canonical document. Defaults to setlists.v2.json
    /// next to the input.
    #[arg(long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Replace the output file if it already exists.
    #[arg(long, default_value_t = false)]
    force: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let input = args.input.unwrap_or_else(|| {
        PathBuf::from(DEFAULT_LIBRARY_DIR).join(DEFAULT_COLLECTIONS_FILE)
    });
    let output = args.output.unwrap_or_else(|| {
        input
            .parent()
            .map(|dir| dir.join(DEFAULT_OUTPUT_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
    });

    info!("Input: {}", input.display());
    info!("Output: {}", output.display());

    let report = migrate_collection_file(&input, &output, args.force)?;

    if report.schema == CollectionSchema::Legacy {
        info!("Migrated legacy setlists to collections.");
    } else {
        info!("Input already uses the collections schema.");
    }
    info!("Collections: {}", report.collections);
    info!("Duplicate references removed: {}", report.duplicates_removed);

    Ok(())
}
