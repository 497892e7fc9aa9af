//! MOHID time records.
//!
//! MOHID writes each output instant as a six-element floating point vector:
//!
//! ```text
//! [2025., 4., 25., 12., 0., 0.]   // year, month, day, hour, minute, second
//! ```
//!
//! The values are always small whole numbers, so they are narrowed to 16-bit
//! integers before building the calendar timestamp.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Number of elements in one MOHID time record.
pub const TIME_RECORD_LEN: usize = 6;

const FIELD_NAMES: [&str; TIME_RECORD_LEN] = ["year", "month", "day", "hour", "minute", "second"];

#[derive(Debug, Error, PartialEq)]
pub enum TimeRecordError {
    #[error("expected 6 elements, found {0}")]
    WrongLength(usize),

    #[error("{field} = {value} is not a whole number")]
    NonIntegral { field: &'static str, value: f64 },

    #[error("{field} = {value} does not fit in a 16-bit integer")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("{0:?} is not a valid calendar date and time")]
    InvalidDate([i16; TIME_RECORD_LEN]),
}

/// Build a timestamp from one `[year, month, day, hour, minute, second]`
/// record.
pub fn time_from_record(record: &[f64]) -> Result<NaiveDateTime, TimeRecordError> {
    if record.len() != TIME_RECORD_LEN {
        return Err(TimeRecordError::WrongLength(record.len()));
    }

    let mut parts = [0i16; TIME_RECORD_LEN];
    for (i, &value) in record.iter().enumerate() {
        parts[i] = narrow_i16(FIELD_NAMES[i], value)?;
    }

    let [year, month, day, hour, minute, second] = parts;
    let invalid = || TimeRecordError::InvalidDate(parts);

    if month < 0 || day < 0 || hour < 0 || minute < 0 || second < 0 {
        return Err(invalid());
    }

    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, second as u32))
        .ok_or_else(invalid)
}

/// True if `times` never goes backwards.
pub fn is_chronological(times: &[NaiveDateTime]) -> bool {
    times.windows(2).all(|w| w[0] <= w[1])
}

fn narrow_i16(field: &'static str, value: f64) -> Result<i16, TimeRecordError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(TimeRecordError::NonIntegral { field, value });
    }
    if value < i16::MIN as f64 || value > i16::MAX as f64 {
        return Err(TimeRecordError::OutOfRange { field, value });
    }
    Ok(value as i16)
}
