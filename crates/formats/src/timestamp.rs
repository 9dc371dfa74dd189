use chrono::{DateTime, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Formats `raw` with `pattern`, keeping the offset it was issued in.
///
/// Feeds send RFC 3339 (`2025-07-28T14:00:00+08:00`) or naive local
/// (`2025-07-28 14:00:00`) times. Unparseable text is returned unchanged so a
/// malformed time never hides the rest of a record.
fn reformat(raw: &str, pattern: &str) -> String {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return t.format(pattern).to_string();
    }
    for input in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, input) {
            return t.format(pattern).to_string();
        }
    }
    raw.to_string()
}

/// `YYYY/MM/DD HH:MM:SS`, used in track point descriptions.
pub fn display_timestamp(raw: &str) -> String {
    reformat(raw, DISPLAY_FORMAT)
}

/// `YYYY/MM/DD HH:MM`, the start of a forecast period.
pub fn display_minute(raw: &str) -> String {
    reformat(raw, "%Y/%m/%d %H:%M")
}

/// Short `HH:MM` form used for the end of a forecast period.
pub fn display_clock(raw: &str) -> String {
    reformat(raw, "%H:%M")
}
