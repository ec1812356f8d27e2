//! Hijri calendar systems for Hilal.
//!
//! Provides the [`CalendarFormatter`] capability used by the offset engine and a
//! [`StandardCalendar`] implementation covering Umm al-Qura and the two
//! arithmetic calendars.

pub mod system;
pub mod tabular;
pub mod umm_al_qura;

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use std::fmt;

pub use hilal_types::HilalError;
pub use system::CalendarSystem;
pub use tabular::{Epoch, to_tabular};
pub use umm_al_qura::{to_umm_al_qura, UMM_AL_QURA_MAX_YEAR, UMM_AL_QURA_MIN_YEAR};

/// A date in a Hijri calendar system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HijriParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl HijriParts {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn month_name(&self) -> &'static str {
        get_hijri_month_name(self.month)
    }
}

impl fmt::Display for HijriParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.day, self.month_name(), self.year)
    }
}

/// Returns Hijri month name.
pub fn get_hijri_month_name(month: u32) -> &'static str {
    match month {
        1 => "Muharram", 2 => "Safar", 3 => "Rabi' al-Awwal", 4 => "Rabi' al-Thani",
        5 => "Jumada al-Ula", 6 => "Jumada al-Akhirah", 7 => "Rajab", 8 => "Sha'ban",
        9 => "Ramadhan", 10 => "Shawwal", 11 => "Dhu al-Qi'dah", 12 => "Dhu al-Hijjah",
        _ => "Unknown",
    }
}

/// Renders Gregorian dates in a named Hijri calendar system.
pub trait CalendarFormatter: fmt::Debug + Send + Sync {
    fn hijri_date(&self, date: NaiveDate, system: CalendarSystem) -> Result<HijriParts, HilalError>;

    fn day_of_month(&self, date: NaiveDate, system: CalendarSystem) -> Result<u32, HilalError> {
        self.hijri_date(date, system).map(|h| h.day)
    }

    fn month_of(&self, date: NaiveDate, system: CalendarSystem) -> Result<u32, HilalError> {
        self.hijri_date(date, system).map(|h| h.month)
    }
}

/// Built-in formatter for every [`CalendarSystem`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCalendar;

impl CalendarFormatter for StandardCalendar {
    fn hijri_date(
        &self,
        date: NaiveDate,
        system: CalendarSystem,
    ) -> Result<HijriParts, HilalError> {
        match system {
            CalendarSystem::UmmAlQura => to_umm_al_qura(date),
            CalendarSystem::Civil => to_tabular(date, Epoch::Civil),
            CalendarSystem::Tabular => to_tabular(date, Epoch::Astronomical),
        }
    }
}
