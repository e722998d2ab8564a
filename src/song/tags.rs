//! ChordPro-style directive extraction.
//!
//! Only single-line `{key: value}` directives are recognised. A directive whose
//! value spans several lines is not a directive at all and is skipped like any
//! other lyric or chord line.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref TAG_LINE_REGEX: Regex = Regex::new(r"^\s*\{([a-zA-Z0-9_\-]+)\s*:\s*(.*?)\}\s*$")
        .expect("Invalid Regex, this should be fixed at compile time.");
}

/// Directives found in one song file, keyed by lower-cased tag name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: HashMap<String, String>,
}

impl TagSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|v| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// First occurrence of a key wins, later duplicates are dropped.
    fn insert_first(&mut self, key: String, value: String) {
        self.tags.entry(key).or_insert(value);
    }
}

/// Extracts every single-line directive from the full text of a song file.
///
/// Lines that are not directives are ignored, so arbitrary song bodies never
/// produce an error.
pub fn parse_tags(text: &str) -> TagSet {
    let mut tag_set = TagSet::default();
    for line in text.lines() {
        let Some(captures) = TAG_LINE_REGEX.captures(line) else {
            continue;
        };
        let key = captures[1].trim().to_lowercase();
        let value = captures[2].trim().to_owned();
        tag_set.insert_first(key, value);
    }
    tag_set
}
