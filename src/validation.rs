//! Input checks shared by the record store and the form front end.
//!
//! Date checks are purely syntactic: they verify the fixed-width layout and
//! the numeric ranges of each component but never consult a calendar, so
//! `2024-02-30 10:00` passes.

use crate::error::ValidationError;

/// Trim a required name, rejecting blank input.
pub fn require_name(entity: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingName { entity });
    }
    Ok(trimmed.to_string())
}

/// Check `value` against `YYYY-MM-DD HH:MM`.
pub fn validate_datetime(value: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidDateTime {
        value: value.to_string(),
    };

    let (date, time) = value.split_once(' ').ok_or_else(invalid)?;
    if !date_is_well_formed(date) || !time_is_well_formed(time) {
        return Err(invalid());
    }
    Ok(())
}

/// Check `value` against `YYYY-MM-DD`.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    if date_is_well_formed(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidDate {
            value: value.to_string(),
        })
    }
}

fn date_is_well_formed(date: &str) -> bool {
    let mut parts = date.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    digits(year, 4).is_some()
        && digits(month, 2).is_some_and(|m| (1..=12).contains(&m))
        && digits(day, 2).is_some_and(|d| (1..=31).contains(&d))
}

fn time_is_well_formed(time: &str) -> bool {
    let Some((hour, minute)) = time.split_once(':') else {
        return false;
    };

    digits(hour, 2).is_some_and(|h| h <= 23) && digits(minute, 2).is_some_and(|m| m <= 59)
}

/// Parse exactly `width` ASCII digits.
fn digits(part: &str, width: usize) -> Option<u32> {
    if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
