mod metadata;
mod record;
mod tags;

pub use metadata::{parse_int, SongFileMeta};
pub use record::{PersonaFiles, PersonaSlot, SlotClaim, SongRecord, FALLBACK_PERSONA_LABEL};
pub use tags::{parse_tags, TagSet};
