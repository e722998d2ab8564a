use super::{CollectionDocument, SongLibrary};
use crate::index::RunLog;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Result of checking every setlist song reference against the song library.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceReport {
    pub referenced: usize,
    /// Unresolved reference occurrences, duplicates included.
    pub unresolved_occurrences: usize,
    /// Distinct unresolved references, sorted.
    pub unresolved: Vec<String>,
}

/// Song references are uid strings. Anything else is kept in its JSON form so
/// it can be reported, and never resolves.
fn reference_key(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

pub fn check_references(collections: &CollectionDocument, songs: &SongLibrary) -> ReferenceReport {
    let mut report = ReferenceReport::default();
    let mut unresolved = BTreeSet::new();

    for collection in &collections.collections {
        for song_list in collection.song_lists() {
            for reference in song_list {
                report.referenced += 1;
                let resolved = matches!(reference, Value::String(uid) if songs.contains_uid(uid));
                if !resolved {
                    report.unresolved_occurrences += 1;
                    unresolved.insert(reference_key(reference).into_owned());
                }
            }
        }
    }

    report.unresolved = unresolved.into_iter().collect();
    report
}

/// Runs [`check_references`] and records its findings. Never fails the run.
pub fn validate_references(
    collections: &CollectionDocument,
    songs: &SongLibrary,
    warning_cap: usize,
    log: &mut RunLog,
) -> ReferenceReport {
    let report = check_references(collections, songs);

    log.counts.setlist_songs_referenced = report.referenced;
    log.counts.setlist_missing_uids = report.unresolved_occurrences;
    log.counts.setlist_missing_uids_distinct = report.unresolved.len();
    log.warn_capped(
        &report.unresolved,
        warning_cap,
        |uid| format!("Setlists reference missing UID: {uid}"),
        |more| format!("...and {more} more missing UIDs referenced by setlists"),
    );

    report
}
