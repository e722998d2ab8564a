mod aggregate;
mod collections;
mod migrate;
mod validate;

pub use aggregate::{
    aggregate_songs, discover_song_files, merge_song_files, read_song_files, relative_path,
    ScanError, SongFile, SongLibrary,
};
pub use collections::{
    load_collections, migrate_legacy, parse_collection_document, Collection, CollectionDocument,
    CollectionError, CollectionSchema, LoadedCollections, LEGACY_COLLECTION_TYPE,
    UNNAMED_COLLECTION,
};
pub use migrate::{dedupe_set_songs, migrate_collection_file, MigrationReport};
pub use validate::{check_references, validate_references, ReferenceReport};
