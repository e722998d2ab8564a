use super::SongFileMeta;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Key used in serialized `files` maps for files that declare no persona.
pub const FALLBACK_PERSONA_LABEL: &str = "_default";

/// Slot a song file occupies within its song record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PersonaSlot {
    Named(String),
    Fallback,
}

impl PersonaSlot {
    pub fn from_persona(persona: Option<&str>) -> PersonaSlot {
        match persona {
            Some(p) => PersonaSlot::Named(p.to_owned()),
            None => PersonaSlot::Fallback,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PersonaSlot::Named(name) => name,
            PersonaSlot::Fallback => FALLBACK_PERSONA_LABEL,
        }
    }
}

/// Outcome of trying to associate a file with a persona slot.
#[derive(Debug, PartialEq, Eq)]
pub enum SlotClaim<'a> {
    Recorded,
    /// The same path was already recorded for the slot.
    Unchanged,
    /// Another file holds the slot, first-seen wins.
    Occupied { existing: &'a str },
}

/// Persona slot to relative file path, in association order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonaFiles {
    entries: Vec<(PersonaSlot, String)>,
}

impl PersonaFiles {
    pub fn get(&self, slot: &PersonaSlot) -> Option<&str> {
        self.entries
            .iter()
            .find(|(s, _)| s == slot)
            .map(|(_, path)| path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PersonaSlot, &str)> {
        self.entries.iter().map(|(slot, path)| (slot, path.as_str()))
    }

    pub fn claim(&mut self, slot: PersonaSlot, path: &str) -> SlotClaim<'_> {
        match self.entries.iter().position(|(s, _)| *s == slot) {
            Some(index) if self.entries[index].1 == path => SlotClaim::Unchanged,
            Some(index) => SlotClaim::Occupied {
                existing: &self.entries[index].1,
            },
            None => {
                self.entries.push((slot, path.to_owned()));
                SlotClaim::Recorded
            }
        }
    }

    fn fallback_is_shadowed(&self) -> bool {
        self.entries
            .iter()
            .any(|(s, _)| matches!(s, PersonaSlot::Named(n) if n == FALLBACK_PERSONA_LABEL))
    }
}

impl Serialize for PersonaFiles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let shadowed = self.fallback_is_shadowed();
        let visible: Vec<&(PersonaSlot, String)> = self
            .entries
            .iter()
            .filter(|(slot, _)| !(shadowed && *slot == PersonaSlot::Fallback))
            .collect();

        let mut map = serializer.serialize_map(Some(visible.len()))?;
        for (slot, path) in visible {
            map.serialize_entry(slot.label(), path)?;
        }
        map.end()
    }
}

/// One logical song, merged from every file sharing its uid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SongRecord {
    pub uid: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub singer: Option<String>,
    pub duration: Option<String>,
    pub key: Option<String>,
    pub tempo: Option<i64>,
    pub capo: Option<i64>,
    pub personas: Vec<String>,
    pub files: PersonaFiles,
}

fn fill_gap<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if slot.is_none() {
        *slot = value.clone();
    }
}

impl SongRecord {
    pub fn new(uid: impl Into<String>) -> SongRecord {
        SongRecord {
            uid: uid.into(),
            title: None,
            artist: None,
            singer: None,
            duration: None,
            key: None,
            tempo: None,
            capo: None,
            personas: vec![],
            files: PersonaFiles::default(),
        }
    }

    /// Fills currently-empty scalar fields from `meta`. Populated fields are
    /// never overwritten.
    pub fn absorb(&mut self, meta: &SongFileMeta) {
        fill_gap(&mut self.title, &meta.title);
        fill_gap(&mut self.artist, &meta.artist);
        fill_gap(&mut self.singer, &meta.singer);
        fill_gap(&mut self.duration, &meta.duration);
        fill_gap(&mut self.key, &meta.key);
        fill_gap(&mut self.tempo, &meta.tempo);
        fill_gap(&mut self.capo, &meta.capo);
    }

    /// Returns true when the persona was not yet listed.
    pub fn add_persona(&mut self, persona: &str) -> bool {
        if self.personas.iter().any(|p| p == persona) {
            return false;
        }
        self.personas.push(persona.to_owned());
        true
    }

    /// Ordering key of the published song list: title, artist, then uid.
    /// Absent values sort as empty strings, so before everything else.
    pub fn sort_key(&self) -> (&str, &str, &str) {
        (
            self.title.as_deref().unwrap_or(""),
            self.artist.as_deref().unwrap_or(""),
            &self.uid,
        )
    }
}
