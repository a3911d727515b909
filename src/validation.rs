// ✅ Validation - raw form values in, yes/no out
// Shared by entry creation and import normalization

use chrono::NaiveDate;

/// Canonical textual date format (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// True iff `s` is shaped `DDDD-DD-DD` AND names a real calendar day.
///
/// Both checks are needed: chrono alone accepts `2024-2-1`, and the shape
/// check alone accepts `2024-13-01`.
pub fn is_valid_date(s: &str) -> bool {
    has_canonical_shape(s) && NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
}

fn has_canonical_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return false;
    }

    bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

/// Parse an hours field: finite and `>= 0`, surrounding whitespace ignored
pub fn parse_hours(s: &str) -> Option<f64> {
    let value: f64 = s.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

pub fn is_valid_hours(s: &str) -> bool {
    parse_hours(s).is_some()
}

/// Defensive numeric coercion: anything that is not a finite number counts as zero
pub fn hours_or_zero(hours: f64) -> f64 {
    if hours.is_finite() {
        hours
    } else {
        0.0
    }
}
