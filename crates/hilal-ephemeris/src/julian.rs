//! Julian Day conversions.
//!
//! Works from the Unix epoch (JD 2440587.5) in milliseconds, which keeps the
//! round trip exact to the millisecond for any `DateTime<Utc>`.

use chrono::{DateTime, Utc};

use hilal_types::HilalError;

/// Julian Day of 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_JD: f64 = 2440587.5;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Converts `DateTime<Utc>` to Julian Day.
pub fn datetime_to_jd(dt: DateTime<Utc>) -> f64 {
    UNIX_EPOCH_JD + dt.timestamp_millis() as f64 / MS_PER_DAY
}

/// Converts a Julian Day to `DateTime<Utc>`, rounded to the millisecond.
///
/// # Errors
/// Returns `HilalError::Ephemeris` when the JD is not finite or outside
/// chrono's representable range.
pub fn jd_to_datetime(jd: f64) -> Result<DateTime<Utc>, HilalError> {
    let ms = ((jd - UNIX_EPOCH_JD) * MS_PER_DAY).round();
    if !ms.is_finite() || ms.abs() > i64::MAX as f64 {
        return Err(HilalError::ephemeris(format!("Invalid datetime from JD {}", jd)));
    }
    DateTime::from_timestamp_millis(ms as i64)
        .ok_or_else(|| HilalError::ephemeris(format!("Invalid datetime from JD {}", jd)))
}
