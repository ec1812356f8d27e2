//! Day offset between the alternate (tabular) calendar and a sighting-based one.
//!
//! The engine walks back from the requested date to the 29th day of the
//! previous alternate month, evaluates the crescent at that sunset, and
//! compares the month length the sighting implies with the one the
//! alternate calendar actually used.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use tracing::{debug, error, instrument, warn};

use hilal_calendar::{CalendarFormatter, CalendarSystem};
use hilal_ephemeris::{EphemerisService, PrayerTimeService};
use hilal_types::{CalendarAdjustment, HilalError, Observer, VisibilityCriteria};

use crate::evaluator::HilalEvaluator;
use crate::settings::{HilalSettings, DEFAULT_SCAN_LIMIT_DAYS};

/// Local clock time assumed for sunset when no prayer time is available.
const FALLBACK_SUNSET_HOUR: u32 = 18;

/// Computes the [`CalendarAdjustment`] for a date.
///
/// Holds only borrowed services and plain settings, so it is cheap to copy
/// and safe to share between threads.
#[derive(Debug, Clone, Copy)]
pub struct CalendarOffsetEngine<'a> {
    ephemeris: &'a dyn EphemerisService,
    prayer_times: &'a dyn PrayerTimeService,
    calendar: &'a dyn CalendarFormatter,
    scan_calendar: CalendarSystem,
    scan_limit_days: u32,
    utc_offset_minutes: Option<i32>,
}

impl<'a> CalendarOffsetEngine<'a> {
    pub fn new(
        ephemeris: &'a dyn EphemerisService,
        prayer_times: &'a dyn PrayerTimeService,
        calendar: &'a dyn CalendarFormatter,
    ) -> Self {
        Self {
            ephemeris,
            prayer_times,
            calendar,
            scan_calendar: CalendarSystem::default(),
            scan_limit_days: DEFAULT_SCAN_LIMIT_DAYS,
            utc_offset_minutes: None,
        }
    }

    pub fn with_scan_calendar(mut self, system: CalendarSystem) -> Self {
        self.scan_calendar = system;
        self
    }

    pub fn with_scan_limit_days(mut self, days: u32) -> Self {
        self.scan_limit_days = days;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: Option<i32>) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Applies the engine-level parts of `settings` (calendar, scan limit, offset).
    pub fn with_settings(self, settings: &HilalSettings) -> Self {
        self.with_scan_calendar(settings.scan_calendar)
            .with_scan_limit_days(settings.scan_limit_days)
            .with_utc_offset_minutes(settings.utc_offset_minutes)
    }

    pub fn scan_calendar(&self) -> CalendarSystem {
        self.scan_calendar
    }

    /// Day offset for `date`. Never fails: errors become a zero offset whose
    /// trace carries the message.
    #[instrument(skip(self, observer, criteria), fields(calendar = %self.scan_calendar))]
    pub fn compute_offset(
        &self,
        date: NaiveDate,
        observer: &Observer,
        criteria: &VisibilityCriteria,
        enabled: bool,
    ) -> CalendarAdjustment {
        if !enabled {
            return CalendarAdjustment::disabled();
        }

        match self.try_compute(date, observer, criteria) {
            Ok(adjustment) => adjustment,
            Err(e) => {
                warn!(error = %e, %date, "calendar offset fell back to zero");
                CalendarAdjustment::failed(&e)
            }
        }
    }

    /// [`compute_offset`](Self::compute_offset) driven entirely by `settings`.
    pub fn compute_with_settings(
        &self,
        date: NaiveDate,
        observer: &Observer,
        settings: &HilalSettings,
    ) -> CalendarAdjustment {
        if !settings.auto_adjust {
            return CalendarAdjustment::disabled();
        }
        if let Err(e) = settings.validate() {
            warn!(error = %e, "invalid hilal settings");
            return CalendarAdjustment::failed(&e);
        }
        self.with_settings(settings)
            .compute_offset(date, observer, &settings.criteria, true)
    }

    fn try_compute(
        &self,
        date: NaiveDate,
        observer: &Observer,
        criteria: &VisibilityCriteria,
    ) -> Result<CalendarAdjustment, HilalError> {
        let current_month = self.calendar.month_of(date, self.scan_calendar)?;

        let Some(boundary) = self.find_month_boundary(date, current_month)? else {
            warn!(%date, days = self.scan_limit_days, "no day 29 of the previous month in scan window");
            return Ok(CalendarAdjustment::scan_limit_reached(self.scan_limit_days));
        };
        debug!(%boundary, "month boundary");

        let (sunset, used_fallback) = match self.prayer_times.sunset_for(boundary, observer) {
            Some(sunset) => (sunset, false),
            None => (self.fallback_sunset(boundary, observer)?, true),
        };

        let measurement = HilalEvaluator::new(self.ephemeris).evaluate(sunset, observer, criteria)?;

        let next_day = boundary
            .checked_add_days(Days::new(1))
            .ok_or_else(|| HilalError::CalendarConversion(format!("no day after {}", boundary)))?;
        let alternate_month_length = if self.calendar.day_of_month(next_day, self.scan_calendar)? == 1 {
            29
        } else {
            30
        };

        let adjustment = CalendarAdjustment::applied(
            boundary,
            sunset,
            used_fallback,
            *criteria,
            measurement,
            alternate_month_length,
        );

        if !(-1..=1).contains(&adjustment.day_offset) {
            error!(offset = adjustment.day_offset, "day offset outside -1..=1");
        }
        debug_assert!((-1..=1).contains(&adjustment.day_offset));

        Ok(adjustment)
    }

    /// Walks back from `date` (inclusive) to the first 29th day of a month
    /// other than `current_month`.
    fn find_month_boundary(
        &self,
        date: NaiveDate,
        current_month: u32,
    ) -> Result<Option<NaiveDate>, HilalError> {
        for back in 0..self.scan_limit_days {
            let day = date
                .checked_sub_days(Days::new(u64::from(back)))
                .ok_or_else(|| HilalError::CalendarConversion(format!("no date {} days before {}", back, date)))?;
            let hijri = self.calendar.hijri_date(day, self.scan_calendar)?;
            if hijri.day == 29 && hijri.month != current_month {
                return Ok(Some(day));
            }
        }
        Ok(None)
    }

    /// 18:00 local on `date`, local meaning the configured offset or the observer's mean solar time.
    fn fallback_sunset(
        &self,
        date: NaiveDate,
        observer: &Observer,
    ) -> Result<DateTime<Utc>, HilalError> {
        let minutes = self
            .utc_offset_minutes
            .unwrap_or_else(|| observer.mean_solar_offset_minutes());
        let zone = FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| HilalError::invalid_config(format!("UTC offset {} minutes out of range", minutes)))?;
        let local = date
            .and_hms_opt(FALLBACK_SUNSET_HOUR, 0, 0)
            .ok_or_else(|| HilalError::CalendarConversion(format!("invalid local time on {}", date)))?;

        zone.from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| HilalError::invalid_config(format!("no local 18:00 on {}", date)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use hilal_calendar::StandardCalendar;
    use hilal_ephemeris::{MeeusEphemeris, PrecomputedSunsets};

    #[test]
    fn test_fallback_sunset_uses_configured_offset() {
        let eph = MeeusEphemeris::new();
        let sunsets = PrecomputedSunsets::new();
        let engine = CalendarOffsetEngine::new(&eph, &sunsets, &StandardCalendar)
            .with_utc_offset_minutes(Some(7 * 60));
        let jakarta = Observer::new_unchecked(-6.2088, 106.8456);
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let sunset = engine.fallback_sunset(date, &jakarta).unwrap();
        assert_eq!(sunset.hour(), 11);
        assert_eq!(sunset.minute(), 0);
    }

    #[test]
    fn test_fallback_sunset_uses_mean_solar_time() {
        let eph = MeeusEphemeris::new();
        let sunsets = PrecomputedSunsets::new();
        let engine = CalendarOffsetEngine::new(&eph, &sunsets, &StandardCalendar);
        let jakarta = Observer::new_unchecked(-6.2088, 106.8456);
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        // 18:00 - 7h07m
        let sunset = engine.fallback_sunset(date, &jakarta).unwrap();
        assert_eq!((sunset.hour(), sunset.minute()), (10, 53));
    }

    #[test]
    fn test_boundary_scan_civil() {
        let eph = MeeusEphemeris::new();
        let sunsets = PrecomputedSunsets::new();
        let engine = CalendarOffsetEngine::new(&eph, &sunsets, &StandardCalendar)
            .with_scan_calendar(CalendarSystem::Civil);

        // 2024-04-10 is 1 Shawwal 1445 (civil); 29 Ramadhan is 2024-04-08.
        let date = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        let boundary = engine.find_month_boundary(date, 10).unwrap();
        assert_eq!(boundary, NaiveDate::from_ymd_opt(2024, 4, 8));

        let short = engine.with_scan_limit_days(2);
        assert_eq!(short.find_month_boundary(date, 10).unwrap(), None);
    }
}
