//! Registration timestamp normalization.
//!
//! Event headers carry ISO-8601 timestamps with anywhere from zero to nine
//! fractional digits and an optional `Z` or numeric offset. The fraction is
//! padded or truncated to exactly six digits before parsing, so every event
//! ends up with microsecond precision.

use chrono::{DateTime, Utc};

use crate::error::{IngestError, Result};

/// Number of fractional digits kept.
pub const FRACTION_DIGITS: usize = 6;

/// Rewrite `raw` with exactly six fractional digits and an explicit offset.
///
/// `"2024-04-18T10:35:24.6Z"` becomes `"2024-04-18T10:35:24.600000Z"`.
pub fn normalize_timestamp(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let (date_time, offset) = split_offset(trimmed);
    let (base, fraction) = date_time.split_once('.').unwrap_or((date_time, ""));

    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(IngestError::Timestamp {
            value: raw.to_string(),
            reason: "fractional seconds must be digits".to_string(),
        });
    }

    let mut digits: String = fraction.chars().take(FRACTION_DIGITS).collect();
    while digits.len() < FRACTION_DIGITS {
        digits.push('0');
    }

    let base = base.replacen(' ', "T", 1);
    Ok(format!("{base}.{digits}{offset}"))
}

/// Parse a registration timestamp into UTC with microsecond precision.
pub fn parse_registration_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let normalized = normalize_timestamp(raw)?;
    DateTime::parse_from_rfc3339(&normalized)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| IngestError::Timestamp {
            value: raw.to_string(),
            reason: err.to_string(),
        })
}

/// Split off a trailing `Z` or `+HH:MM`/`-HH:MM`; a missing offset means UTC.
fn split_offset(value: &str) -> (&str, &str) {
    if let Some(stripped) = value.strip_suffix(['Z', 'z']) {
        return (stripped, "Z");
    }
    let time_start = value
        .find(['T', 't', ' '])
        .map_or(value.len(), |index| index + 1);
    match value[time_start..].find(['+', '-']) {
        Some(index) => value.split_at(time_start + index),
        None => (value, "Z"),
    }
}
