//! Collection (setlist) document loading.
//!
//! Two on-disk schemas exist. The canonical one is keyed by `collections` and is
//! passed through untouched apart from defaulting `version`, so rebuilding from
//! it is byte-for-byte reproducible. The legacy one is keyed by `setlists` and
//! is migrated into the canonical shape, stamping `updated` with the current
//! time.

use crate::timestamps::now_local_iso;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Collection type assigned to every migrated legacy setlist.
pub const LEGACY_COLLECTION_TYPE: &str = "gig";

/// Name given to a legacy setlist that carries neither a name nor an id.
pub const UNNAMED_COLLECTION: &str = "Unnamed";

const COLLECTIONS_KEY: &str = "collections";
const SETLISTS_KEY: &str = "setlists";

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("'collections' must be an array")]
    CollectionsNotList,

    #[error("'setlists' must be an array")]
    SetlistsNotList,

    #[error("legacy setlist #{0} is not a JSON object")]
    LegacyEntryNotObject(usize),

    #[error("document must contain either 'collections' or 'setlists'")]
    UnrecognizedSchema,
}

/// One collection exactly as it appears in the document. Only the parts the
/// engine reads are interpreted, everything is written back verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection(Value);

impl Collection {
    pub fn new(value: Value) -> Collection {
        Collection(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&Value> {
        self.0.get("name")
    }

    /// The `sets` list, empty when absent or not a list.
    pub fn sets(&self) -> &[Value] {
        self.0
            .get("sets")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn sets_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.0.get_mut("sets").and_then(Value::as_array_mut)
    }

    /// The `songs` array of every set that has one.
    pub fn song_lists(&self) -> impl Iterator<Item = &Vec<Value>> {
        self.sets()
            .iter()
            .filter_map(|set| set.get("songs").and_then(Value::as_array))
    }
}

/// A canonical collection document. Top-level fields keep their document
/// order; the `collections` entry is served from [`Self::collections`].
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionDocument {
    fields: Map<String, Value>,
    pub collections: Vec<Collection>,
}

impl CollectionDocument {
    pub fn empty() -> CollectionDocument {
        let mut fields = Map::new();
        fields.insert("version".to_owned(), Value::from(1));
        fields.insert(COLLECTIONS_KEY.to_owned(), Value::Array(vec![]));
        CollectionDocument {
            fields,
            collections: vec![],
        }
    }

    /// `fields` must hold a `collections` array.
    fn from_fields(mut fields: Map<String, Value>) -> CollectionDocument {
        let items = match fields.get_mut(COLLECTIONS_KEY) {
            Some(Value::Array(items)) => std::mem::take(items),
            _ => {
                fields.insert(COLLECTIONS_KEY.to_owned(), Value::Array(vec![]));
                vec![]
            }
        };
        CollectionDocument {
            fields,
            collections: items.into_iter().map(Collection::new).collect(),
        }
    }

    pub fn version(&self) -> Option<&Value> {
        self.fields.get("version")
    }

    pub fn updated(&self) -> Option<&str> {
        self.fields.get("updated").and_then(Value::as_str)
    }

    /// Any top-level field other than `collections`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match key {
            COLLECTIONS_KEY => None,
            _ => self.fields.get(key),
        }
    }

    pub fn sets_count(&self) -> usize {
        self.collections.iter().map(|c| c.sets().len()).sum()
    }
}

impl Serialize for CollectionDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            if key == COLLECTIONS_KEY {
                map.serialize_entry(key, &self.collections)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionSchema {
    /// No document on disk.
    Missing,
    Canonical,
    Legacy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedCollections {
    pub schema: CollectionSchema,
    pub document: CollectionDocument,
}

pub fn load_collections(path: &Path) -> Result<LoadedCollections, CollectionError> {
    if !path.exists() {
        info!(
            "No collection document at {}, starting with an empty library.",
            path.display()
        );
        return Ok(LoadedCollections {
            schema: CollectionSchema::Missing,
            document: CollectionDocument::empty(),
        });
    }

    let bytes = std::fs::read(path)?;
    let value: Value = serde_json::from_str(&String::from_utf8_lossy(&bytes))?;
    let loaded = parse_collection_document(value)?;
    debug!(
        "Loaded {} collections from {} ({:?} schema)",
        loaded.document.collections.len(),
        path.display(),
        loaded.schema
    );
    Ok(loaded)
}

/// Detects the schema of an already-parsed document and normalizes it.
pub fn parse_collection_document(value: Value) -> Result<LoadedCollections, CollectionError> {
    let Value::Object(root) = value else {
        return Err(CollectionError::NotAnObject);
    };

    if let Some(collections) = root.get(COLLECTIONS_KEY) {
        if !collections.is_array() {
            return Err(CollectionError::CollectionsNotList);
        }
        return Ok(LoadedCollections {
            schema: CollectionSchema::Canonical,
            document: pass_through_canonical(root),
        });
    }

    if let Some(setlists) = root.get(SETLISTS_KEY) {
        if !setlists.is_array() {
            return Err(CollectionError::SetlistsNotList);
        }
        return Ok(LoadedCollections {
            schema: CollectionSchema::Legacy,
            document: migrate_legacy(&root, &now_local_iso())?,
        });
    }

    Err(CollectionError::UnrecognizedSchema)
}

/// Pure: the output depends on the input alone, no timestamp is injected.
fn pass_through_canonical(mut root: Map<String, Value>) -> CollectionDocument {
    if !root.contains_key("version") {
        root.insert("version".to_owned(), Value::from(1));
    }
    CollectionDocument::from_fields(root)
}

/// Empty strings, zero, null, false and empty containers do not count as a
/// label when falling back between `id` and `name`.
fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn label<'a>(entry: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    entry.get(key).filter(|value| is_meaningful(value))
}

/// Converts a `setlists`-keyed document, stamping `updated` with `updated`.
/// Field values are carried over as they are, whatever their JSON type.
pub fn migrate_legacy(
    root: &Map<String, Value>,
    updated: &str,
) -> Result<CollectionDocument, CollectionError> {
    let entries = root
        .get(SETLISTS_KEY)
        .and_then(Value::as_array)
        .ok_or(CollectionError::SetlistsNotList)?;

    let mut collections = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Value::Object(entry) = entry else {
            return Err(CollectionError::LegacyEntryNotObject(index));
        };

        let id = label(entry, "id");
        let name = label(entry, "name");

        let mut collection = Map::new();
        collection.insert(
            "id".to_owned(),
            id.or(name).cloned().unwrap_or_else(|| Value::from("")),
        );
        collection.insert("type".to_owned(), Value::from(LEGACY_COLLECTION_TYPE));
        collection.insert(
            "name".to_owned(),
            name.or(id)
                .cloned()
                .unwrap_or_else(|| Value::from(UNNAMED_COLLECTION)),
        );
        collection.insert(
            "notes".to_owned(),
            entry.get("notes").cloned().unwrap_or_else(|| Value::from("")),
        );
        collection.insert(
            "sets".to_owned(),
            entry.get("sets").cloned().unwrap_or_else(|| Value::Array(vec![])),
        );
        for (key, value) in entry {
            if !collection.contains_key(key) {
                collection.insert(key.clone(), value.clone());
            }
        }
        collections.push(Value::Object(collection));
    }

    let mut fields = Map::new();
    fields.insert(
        "version".to_owned(),
        root.get("version").cloned().unwrap_or_else(|| Value::from(1)),
    );
    fields.insert("updated".to_owned(), Value::from(updated));
    fields.insert(COLLECTIONS_KEY.to_owned(), Value::Array(collections));
    Ok(CollectionDocument::from_fields(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn as_json(document: &CollectionDocument) -> String {
        serde_json::to_string(document).unwrap()
    }

    #[test]
    fn migrates_legacy_setlists() {
        let value = json!({
            "setlists": [
                { "id": "gig1", "name": "Gig One", "sets": [{ "songs": ["a", "b"] }] }
            ]
        });
        let loaded = parse_collection_document(value).unwrap();

        assert_eq!(loaded.schema, CollectionSchema::Legacy);
        let doc = loaded.document;
        assert_eq!(doc.version(), Some(&json!(1)));
        assert!(doc.updated().is_some());
        assert_eq!(doc.collections.len(), 1);
        assert_eq!(
            doc.collections[0].as_value(),
            &json!({
                "id": "gig1",
                "type": "gig",
                "name": "Gig One",
                "notes": "",
                "sets": [{ "songs": ["a", "b"] }]
            })
        );
    }

    #[test]
    fn legacy_id_and_name_fall_back_on_each_other() {
        let root = json!({
            "version": 3,
            "setlists": [
                { "name": "Only Name" },
                { "id": "only-id", "notes": "bring capo" },
                { "id": "", "name": "" },
                { "id": 7, "venue": "Blue Room" }
            ]
        });
        let Value::Object(root) = root else {
            unreachable!()
        };
        let doc = migrate_legacy(&root, "2024-01-01T00:00:00+00:00").unwrap();

        assert_eq!(doc.version(), Some(&json!(3)));
        assert_eq!(doc.updated(), Some("2024-01-01T00:00:00+00:00"));

        let c = &doc.collections;
        assert_eq!((c[0].id(), c[0].name()), (Some(&json!("Only Name")), Some(&json!("Only Name"))));
        assert_eq!((c[1].id(), c[1].name()), (Some(&json!("only-id")), Some(&json!("only-id"))));
        assert_eq!(c[1].as_value()["notes"], "bring capo");
        assert_eq!((c[2].id(), c[2].name()), (Some(&json!("")), Some(&json!(UNNAMED_COLLECTION))));
        assert_eq!((c[3].id(), c[3].name()), (Some(&json!(7)), Some(&json!(7))));
        assert_eq!(c[3].as_value()["venue"], "Blue Room");
    }

    #[test]
    fn legacy_notes_and_sets_are_carried_as_is() {
        let root = json!({
            "setlists": [
                { "id": "a", "notes": null, "sets": "tbd" },
                { "id": "b", "notes": ["line 1", "line 2"] }
            ]
        });
        let Value::Object(root) = root else {
            unreachable!()
        };
        let doc = migrate_legacy(&root, "now").unwrap();

        assert_eq!(doc.collections[0].as_value()["notes"], Value::Null);
        assert_eq!(doc.collections[0].as_value()["sets"], "tbd");
        assert!(doc.collections[0].sets().is_empty());
        assert_eq!(doc.collections[1].as_value()["notes"], json!(["line 1", "line 2"]));
        assert_eq!(doc.collections[1].as_value()["sets"], json!([]));
    }

    #[test]
    fn canonical_documents_pass_through_without_stamp() {
        let value = json!({
            "collections": [
                {
                    "id": "c1",
                    "type": "rehearsal",
                    "name": "Tuesday",
                    "notes": "",
                    "sets": [{ "name": "Set 1", "songs": ["u1"] }],
                    "color": "red"
                }
            ]
        });
        let loaded = parse_collection_document(value).unwrap();

        assert_eq!(loaded.schema, CollectionSchema::Canonical);
        assert_eq!(loaded.document.version(), Some(&json!(1)));
        assert_eq!(loaded.document.updated(), None);
        assert_eq!(loaded.document.collections[0].kind(), Some("rehearsal"));
        assert_eq!(loaded.document.collections[0].as_value()["color"], "red");
    }

    #[test]
    fn canonical_fields_keep_their_values_and_order() {
        let value = json!({
            "contract": "song_uid_v2",
            "collections": [
                { "name": "X", "id": 5, "notes": null, "sets": [{ "songs": ["a"], "name": "S1" }] }
            ],
            "version": 1.5
        });
        let doc = parse_collection_document(value).unwrap().document;

        assert_eq!(doc.field("contract"), Some(&json!("song_uid_v2")));
        assert_eq!(doc.version(), Some(&json!(1.5)));
        assert_eq!(
            as_json(&doc),
            r#"{"contract":"song_uid_v2","collections":[{"name":"X","id":5,"notes":null,"sets":[{"songs":["a"],"name":"S1"}]}],"version":1.5}"#
        );
    }

    #[test]
    fn canonical_version_default_is_appended() {
        let doc = parse_collection_document(json!({ "collections": [] }))
            .unwrap()
            .document;
        assert_eq!(as_json(&doc), r#"{"collections":[],"version":1}"#);
    }

    #[test]
    fn canonical_pass_through_is_deterministic() {
        let value = json!({
            "version": 2,
            "updated": "2023-12-24T10:00:00+01:00",
            "collections": [{ "id": "c1", "type": "gig", "name": "X", "sets": [] }]
        });
        let first = parse_collection_document(value.clone()).unwrap();
        let second = parse_collection_document(value).unwrap();

        assert_eq!(as_json(&first.document), as_json(&second.document));
        assert_eq!(first.document.updated(), Some("2023-12-24T10:00:00+01:00"));
    }

    #[test]
    fn collections_key_wins_over_setlists() {
        let value = json!({ "collections": [], "setlists": [{ "id": "x" }] });
        let loaded = parse_collection_document(value).unwrap();
        assert_eq!(loaded.schema, CollectionSchema::Canonical);
        assert!(loaded.document.collections.is_empty());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(
            parse_collection_document(json!([1, 2])),
            Err(CollectionError::NotAnObject)
        ));
        assert!(matches!(
            parse_collection_document(json!({ "collections": {} })),
            Err(CollectionError::CollectionsNotList)
        ));
        assert!(matches!(
            parse_collection_document(json!({ "setlists": "nope" })),
            Err(CollectionError::SetlistsNotList)
        ));
        assert!(matches!(
            parse_collection_document(json!({ "version": 1 })),
            Err(CollectionError::UnrecognizedSchema)
        ));
        assert!(matches!(
            parse_collection_document(json!({ "setlists": [42] })),
            Err(CollectionError::LegacyEntryNotObject(0))
        ));
    }

    #[test]
    fn missing_file_is_an_empty_library() {
        let dir = TempDir::new().unwrap();
        let loaded = load_collections(&dir.path().join("setlists.json")).unwrap();

        assert_eq!(loaded.schema, CollectionSchema::Missing);
        assert_eq!(loaded.document, CollectionDocument::empty());
        assert_eq!(as_json(&loaded.document), r#"{"version":1,"collections":[]}"#);
    }

    #[test]
    fn invalid_json_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("setlists.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_collections(&path),
            Err(CollectionError::Json(_))
        ));
    }

    #[test]
    fn song_lists_skip_sets_without_songs() {
        let collection = Collection::new(json!({
            "id": "c",
            "sets": [
                { "songs": ["a"] },
                { "name": "encore" },
                { "songs": "not-a-list" },
                { "songs": ["b", "c"] }
            ]
        }));
        let lists: Vec<&Vec<Value>> = collection.song_lists().collect();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[1], &vec![json!("b"), json!("c")]);
    }

    #[test]
    fn non_object_collections_are_kept() {
        let doc = parse_collection_document(json!({ "collections": ["loose", { "sets": 3 }] }))
            .unwrap()
            .document;

        assert_eq!(doc.collections.len(), 2);
        assert_eq!(doc.sets_count(), 0);
        assert_eq!(doc.collections[0].as_value(), &json!("loose"));
    }
}
