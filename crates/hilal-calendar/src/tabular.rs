//! Arithmetic (tabular) Islamic calendars.
//!
//! 30-year cycle with 11 leap years; odd months have 30 days, even months 29,
//! and Dhu al-Hijjah gains a day in leap years. The civil and astronomical
//! variants differ only in their epoch.

use chrono::NaiveDate;

use hilal_types::HilalError;

use crate::HijriParts;

/// Epoch of the civil variant: Friday 16 July 622 (Julian), proleptic Gregorian.
fn civil_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(622, 7, 19).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Epoch {
    /// Friday epoch.
    Civil,
    /// Thursday epoch, one day earlier.
    Astronomical,
}

impl Epoch {
    fn date(self) -> NaiveDate {
        match self {
            Self::Civil => civil_epoch(),
            Self::Astronomical => civil_epoch().pred_opt().unwrap_or(NaiveDate::MIN),
        }
    }
}

pub fn is_leap_year(year: i64) -> bool {
    (14 + 11 * year).rem_euclid(30) < 11
}

pub fn month_length(year: i64, month: u32) -> u32 {
    match month {
        12 if is_leap_year(year) => 30,
        m if m % 2 == 1 => 30,
        _ => 29,
    }
}

/// Days from the epoch to the given Hijri date (1 Muharram 1 AH is day 0).
fn days_from_epoch(year: i64, month: u32, day: u32) -> i64 {
    let month = i64::from(month);
    (year - 1) * 354
        + (3 + 11 * year).div_euclid(30)
        + 29 * (month - 1)
        + month / 2
        + i64::from(day)
        - 1
}

/// Converts a Gregorian date to the arithmetic calendar with the given epoch.
///
/// # Errors
/// Returns `DateOutOfRange` for dates before 1 Muharram 1 AH.
pub fn to_tabular(date: NaiveDate, epoch: Epoch) -> Result<HijriParts, HilalError> {
    let start = epoch.date();
    let days = (date - start).num_days();
    if days < 0 {
        return Err(HilalError::DateOutOfRange { date, min: start, max: NaiveDate::MAX });
    }

    let year = (30 * days + 10646).div_euclid(10631);
    let into_year = days - days_from_epoch(year, 1, 1);
    let month = ((11 * into_year + 330).div_euclid(325)).clamp(1, 12) as u32;
    let day = (days - days_from_epoch(year, month, 1) + 1) as u32;

    let year = i32::try_from(year)
        .map_err(|_| HilalError::CalendarConversion(format!("Hijri year {} overflows", year)))?;
    Ok(HijriParts::new(year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_epoch_is_first_day() {
        assert_eq!(to_tabular(ymd(622, 7, 19), Epoch::Civil).unwrap(), HijriParts::new(1, 1, 1));
        assert_eq!(to_tabular(ymd(622, 7, 18), Epoch::Astronomical).unwrap(), HijriParts::new(1, 1, 1));
        assert!(to_tabular(ymd(622, 7, 18), Epoch::Civil).is_err());
    }

    #[test]
    fn test_known_civil_dates() {
        assert_eq!(to_tabular(ymd(2024, 3, 11), Epoch::Civil).unwrap(), HijriParts::new(1445, 9, 1));
        assert_eq!(to_tabular(ymd(2024, 3, 10), Epoch::Civil).unwrap(), HijriParts::new(1445, 8, 29));
        assert_eq!(to_tabular(ymd(2024, 4, 10), Epoch::Civil).unwrap(), HijriParts::new(1445, 10, 1));
        assert_eq!(to_tabular(ymd(2026, 10, 15), Epoch::Civil).unwrap(), HijriParts::new(1448, 5, 3));
    }

    #[test]
    fn test_astronomical_epoch_runs_one_day_ahead() {
        assert_eq!(to_tabular(ymd(2024, 3, 10), Epoch::Astronomical).unwrap(), HijriParts::new(1445, 9, 1));
        assert_eq!(to_tabular(ymd(2025, 3, 1), Epoch::Astronomical).unwrap(), HijriParts::new(1446, 9, 2));
    }

    #[test]
    fn test_month_lengths_match_day_sequence() {
        // Walk a whole 30-year cycle and check each month ends where its length says.
        let mut d = ymd(2000, 1, 1);
        let mut prev = to_tabular(d, Epoch::Civil).unwrap();
        for _ in 0..(30 * 355) {
            d = d.succ_opt().unwrap();
            let cur = to_tabular(d, Epoch::Civil).unwrap();
            if cur.day == 1 {
                assert_eq!(prev.day, month_length(i64::from(prev.year), prev.month));
            } else {
                assert_eq!(cur.day, prev.day + 1);
                assert_eq!(cur.month, prev.month);
            }
            prev = cur;
        }
    }

    #[test]
    fn test_leap_years_per_cycle() {
        let leaps = (1..=30).filter(|y| is_leap_year(*y)).collect::<Vec<_>>();
        assert_eq!(leaps, vec![2, 5, 7, 10, 13, 16, 18, 21, 24, 26, 29]);
    }
}
