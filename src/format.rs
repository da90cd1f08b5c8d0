use chrono::{Datelike, NaiveDateTime};

/// Render a last-updated timestamp as `Jan 2nd 24`.
pub fn format_updated(ts: &NaiveDateTime) -> String {
    let day = ts.day();
    format!("{} {}{} {}", ts.format("%b"), day, ordinal_suffix(day), ts.format("%y"))
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
