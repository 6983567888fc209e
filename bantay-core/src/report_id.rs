//! Report identifier derivation
//!
//! Report ids are human-readable and scoped to a local calendar day:
//! `IR-{dateKey}-{sequence:04}` where `dateKey` is `YYYYMMDD`.

use chrono::{Datelike, NaiveDate};

/// Prefix carried by every report id.
pub const REPORT_ID_PREFIX: &str = "IR";

/// Derive the 8-digit `YYYYMMDD` day key for a calendar date.
///
/// The caller decides which timezone's "today" applies; the submission
/// flow uses the local calendar day.
pub fn date_key(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// Format a report id from its day key and allocated sequence.
///
/// Pure function of `(date_key, sequence)`: the sequence is zero-padded to
/// four digits and widens naturally past 9999.
pub fn format_report_id(date_key: &str, sequence: u32) -> String {
    format!("{REPORT_ID_PREFIX}-{date_key}-{sequence:04}")
}

/// Split a report id back into `(date_key, sequence)`.
///
/// Returns `None` for strings this system never generated.
pub fn parse_report_id(report_id: &str) -> Option<(String, u32)> {
    let rest = report_id.strip_prefix(REPORT_ID_PREFIX)?.strip_prefix('-')?;
    let (day, seq) = rest.split_at_checked(8)?;
    if !day.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let seq = seq.strip_prefix('-')?;
    if seq.len() < 4 {
        return None;
    }
    Some((day.to_string(), seq.parse().ok()?))
}

// =============================================================================
// TESTS
// =============================================================================
