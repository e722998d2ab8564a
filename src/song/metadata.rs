use super::TagSet;

/// Typed view over the directives of a single song file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SongFileMeta {
    pub uid: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub persona: Option<String>,
    pub singer: Option<String>,
    pub duration: Option<String>,
    pub tempo: Option<i64>,
    pub key: Option<String>,
    pub capo: Option<i64>,
}

fn text_tag(tags: &TagSet, key: &str) -> Option<String> {
    tags.get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Base-10 integer, whitespace trimmed. Anything else is treated as absent.
pub fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

impl SongFileMeta {
    pub fn from_tags(tags: &TagSet) -> SongFileMeta {
        // `song_uid` is the legacy spelling of the identity tag.
        let uid = text_tag(tags, "uid").or_else(|| text_tag(tags, "song_uid"));

        SongFileMeta {
            uid,
            title: text_tag(tags, "title"),
            artist: text_tag(tags, "artist"),
            persona: text_tag(tags, "persona"),
            singer: text_tag(tags, "singer"),
            duration: text_tag(tags, "duration"),
            tempo: tags.get("tempo").and_then(parse_int),
            key: text_tag(tags, "key"),
            capo: tags.get("capo").and_then(parse_int),
        }
    }
}
