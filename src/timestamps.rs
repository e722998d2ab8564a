use chrono::{Local, SecondsFormat, Utc};

/// Local wall-clock time as ISO-8601 with offset, e.g. `2024-05-01T20:15:03+02:00`.
pub fn now_local_iso() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Compact UTC stamp identifying one consolidation run, e.g. `20240501T181503Z`.
pub fn new_run_id() -> String {
    Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}
