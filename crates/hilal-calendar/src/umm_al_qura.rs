//! Umm al-Qura conversion backed by the `hijri_date` tables.

use chrono::{Datelike, NaiveDate};
use hijri_date::HijriDate;
use std::cell::RefCell;

use hilal_types::HilalError;

use crate::HijriParts;

/// Minimum Gregorian year for Umm al-Qura conversion.
pub const UMM_AL_QURA_MIN_YEAR: i32 = 1938;
/// Maximum Gregorian year for Umm al-Qura conversion.
pub const UMM_AL_QURA_MAX_YEAR: i32 = 2076;

// The offset scan converts neighbouring days repeatedly; keep the last one.
thread_local! {
    static UMM_AL_QURA_CACHE: RefCell<Option<(NaiveDate, HijriParts)>> = const { RefCell::new(None) };
}

fn out_of_range(date: NaiveDate) -> HilalError {
    HilalError::DateOutOfRange {
        date,
        min: NaiveDate::from_ymd_opt(UMM_AL_QURA_MIN_YEAR, 1, 1).unwrap_or(NaiveDate::MIN),
        max: NaiveDate::from_ymd_opt(UMM_AL_QURA_MAX_YEAR, 12, 31).unwrap_or(NaiveDate::MAX),
    }
}

/// Converts a Gregorian date to Umm al-Qura.
///
/// # Errors
/// Returns `DateOutOfRange` outside 1938-2076.
pub fn to_umm_al_qura(date: NaiveDate) -> Result<HijriParts, HilalError> {
    let cached = UMM_AL_QURA_CACHE.with(|cache| {
        cache.borrow().as_ref().and_then(|(d, parts)| (*d == date).then_some(*parts))
    });
    if let Some(parts) = cached {
        return Ok(parts);
    }

    if date.year() < UMM_AL_QURA_MIN_YEAR || date.year() > UMM_AL_QURA_MAX_YEAR {
        return Err(out_of_range(date));
    }

    let hijri = HijriDate::from_gr(date.year() as usize, date.month() as usize, date.day() as usize)
        .map_err(|_| out_of_range(date))?;
    let parts = HijriParts::new(hijri.year() as i32, hijri.month() as u32, hijri.day() as u32);

    UMM_AL_QURA_CACHE.with(|cache| {
        *cache.borrow_mut() = Some((date, parts));
    });

    Ok(parts)
}
