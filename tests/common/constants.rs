//! Shared constants for end-to-end tests
//!
//! When the fixture songbook changes, update only this file.

// ============================================================================
// Fixture Songs
// ============================================================================

/// "Amazing Grace", two personas
pub const SONG_A_UID: &str = "uid-amazing-grace";

/// "Blackbird", no persona tag
pub const SONG_B_UID: &str = "uid-blackbird";

/// "Yesterday", single persona
pub const SONG_C_UID: &str = "uid-yesterday";

pub const SONG_A_LEAD: &str = "{title: Amazing Grace}
{artist: Traditional}
{uid: uid-amazing-grace}
{persona: Lead}
{key: G}
{tempo: 72}
{capo: 0}

[G]Amazing [C]grace, how [G]sweet the sound
";

pub const SONG_A_HARMONY: &str = "{title: Amazing Grace (harmony)}
{uid: uid-amazing-grace}
{persona: Harmony}
{singer: Robin}
{duration: 3:10}
{tempo: not-a-number}

[G]Amazing [C]grace
";

pub const SONG_B: &str = "{title: Blackbird}
{artist: The Beatles}
{song_uid: uid-blackbird}
{capo: 3}

[G]Blackbird singing in the [Am7]dead of night
";

pub const SONG_C: &str = "{title: Yesterday}
{artist: The Beatles}
{uid: uid-yesterday}
{persona: Lead}
{tempo: 97}
";

pub const SONG_NO_UID: &str = "{title: Untitled Draft}
{artist: Nobody}
";

// ============================================================================
// Fixture Collections
// ============================================================================

pub const CANONICAL_COLLECTIONS: &str = r#"{
  "version": 1,
  "updated": "2024-03-01T20:00:00+01:00",
  "collections": [
    {
      "id": "spring-gig",
      "type": "gig",
      "name": "Spring Gig",
      "notes": "",
      "sets": [
        { "name": "Set 1", "songs": ["uid-amazing-grace", "uid-blackbird"] },
        { "name": "Encore", "songs": ["uid-yesterday"] }
      ]
    }
  ]
}
"#;
