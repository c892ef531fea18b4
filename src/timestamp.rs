//! NetScaler timestamp handling.
//!
//! NetScaler lines open with `Oct 29 12:04:12`: month abbreviation, day and
//! time, no year. Both the line timestamps and the `--since`/`--until` bounds
//! are pinned to the same caller-supplied year so they compare directly.

use chrono::{NaiveDateTime, ParseError};

/// Format shared by log lines, CLI bounds and the report header.
pub const TIMESTAMP_FORMAT: &str = "%b %d %H:%M:%S";

/// Parse a `<Mon> <DD> <HH:MM:SS>` string, stamping it with `year`.
pub fn parse_timestamp(text: &str, year: i32) -> Result<NaiveDateTime, ParseError> {
    let with_year = format!("{} {}", year, text.trim());
    NaiveDateTime::parse_from_str(&with_year, "%Y %b %d %H:%M:%S")
}

/// Best-effort timestamp extraction from the start of a log line.
///
/// The first three whitespace-separated tokens are tried as a timestamp
/// whatever the line looks like. Anything that does not parse yields `None`.
pub fn parse_line_timestamp(line: &str, year: i32) -> Option<NaiveDateTime> {
    let mut tokens = line.split_whitespace();
    let (month, day, time) = (tokens.next()?, tokens.next()?, tokens.next()?);
    parse_timestamp(&format!("{} {} {}", month, day, time), year).ok()
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
