//! Presentation helpers: the live hilal panel and the Hijri day header.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::fmt;

use hilal_calendar::{CalendarFormatter, CalendarSystem, HijriParts};
use hilal_ephemeris::EphemerisService;
use hilal_types::{CalendarAdjustment, HilalError, HilalMeasurement, Observer, VisibilityCriteria};

use crate::evaluator::HilalEvaluator;
use crate::settings::HilalSettings;

pub const PENDING_MESSAGE: &str = "waiting for location and sunset time";

/// Sighting verdict shown under the measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    /// Crescent meets the criteria; the month has 29 days.
    Visible,
    /// Not visible; the month is completed to 30 days.
    Istikmal,
}

impl Verdict {
    pub fn from_measurement(measurement: &HilalMeasurement) -> Self {
        if measurement.is_eligible { Self::Visible } else { Self::Istikmal }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Visible => "meets visibility criteria",
            Self::Istikmal => "not yet visible, month completed to 30 days",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One labelled value on the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRow {
    pub label: &'static str,
    pub value: String,
}

/// Ijtima', moon age, altitude, elongation.
pub type DashboardRows = SmallVec<[DashboardRow; 4]>;

/// State of the live hilal panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum HilalDashboard {
    Pending { message: String },
    Error { message: String },
    Ready {
        measurement: HilalMeasurement,
        criteria: VisibilityCriteria,
        rows: DashboardRows,
        verdict: Verdict,
    },
}

impl HilalDashboard {
    /// Evaluates the crescent at today's sunset for the panel.
    ///
    /// Missing location or sunset leaves the panel pending; evaluation
    /// errors are shown, never raised.
    pub fn build(
        sunset: Option<DateTime<Utc>>,
        observer: Option<&Observer>,
        criteria: &VisibilityCriteria,
        ephemeris: &dyn EphemerisService,
    ) -> Self {
        match Self::measure(sunset, observer, criteria, ephemeris) {
            Ok(measurement) => Self::ready(measurement, *criteria),
            Err(e) if e.is_missing_input() => Self::pending(),
            Err(e) => Self::Error { message: e.to_string() },
        }
    }

    fn measure(
        sunset: Option<DateTime<Utc>>,
        observer: Option<&Observer>,
        criteria: &VisibilityCriteria,
        ephemeris: &dyn EphemerisService,
    ) -> Result<HilalMeasurement, HilalError> {
        let observer =
            observer.ok_or_else(|| HilalError::MissingInput("observer location".into()))?;
        let sunset = sunset.ok_or_else(|| HilalError::MissingInput("sunset time".into()))?;
        HilalEvaluator::new(ephemeris).evaluate(sunset, observer, criteria)
    }

    pub fn pending() -> Self {
        Self::Pending { message: PENDING_MESSAGE.to_string() }
    }

    pub fn ready(measurement: HilalMeasurement, criteria: VisibilityCriteria) -> Self {
        let measurement = measurement.with_criteria(&criteria);
        let rows: DashboardRows = smallvec![
            DashboardRow {
                label: "Ijtima'",
                value: measurement.conjunction_time.format("%Y-%m-%d %H:%M UTC").to_string(),
            },
            DashboardRow { label: "Moon age", value: format!("{:.1} h", measurement.moon_age_hours) },
            DashboardRow { label: "Altitude", value: format!("{:.2}°", measurement.moon_altitude_deg) },
            DashboardRow { label: "Elongation", value: format!("{:.2}°", measurement.elongation_deg) },
        ];
        Self::Ready {
            verdict: Verdict::from_measurement(&measurement),
            measurement,
            criteria,
            rows,
        }
    }

    /// Same measurement judged against other thresholds. Other states are unchanged.
    pub fn with_criteria(&self, criteria: &VisibilityCriteria) -> Self {
        match self {
            Self::Ready { measurement, .. } => Self::ready(*measurement, *criteria),
            other => other.clone(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            Self::Ready { verdict, .. } => Some(*verdict),
            _ => None,
        }
    }

    /// Compact altitude check, e.g. `Alt:4.21° >= Tgt:3° ? true`.
    pub fn debug_line(&self) -> Option<String> {
        match self {
            Self::Ready { measurement, criteria, .. } => Some(format!(
                "Alt:{:.2}° >= Tgt:{}° ? {}",
                measurement.moon_altitude_deg,
                criteria.min_altitude_deg,
                measurement.moon_altitude_deg >= criteria.min_altitude_deg
            )),
            _ => None,
        }
    }
}

/// Header for one day: Gregorian date and the Hijri date in effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetails {
    /// e.g. "10 March 2024"
    pub gregorian: String,
    pub weekday: String,
    pub hijri: HijriParts,
    /// e.g. "1 Ramadhan 1445"
    pub hijri_label: String,
    /// Name of the calendar system the Hijri date is rendered in.
    pub calendar: String,
    /// True once maghrib has passed and the Hijri day has rolled over.
    pub after_maghrib: bool,
}

/// Builds the day header for `date`.
///
/// The Hijri date is shifted by `day_offset`, and by one more day once `now`
/// is at or past `maghrib`, since the Islamic day begins at sunset.
pub fn day_details(
    date: NaiveDate,
    maghrib: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    day_offset: i64,
    calendar: &dyn CalendarFormatter,
    system: CalendarSystem,
) -> Result<DayDetails, HilalError> {
    let after_maghrib = maghrib.is_some_and(|m| now >= m);
    let shift = day_offset + i64::from(after_maghrib);
    let hijri_day = date
        .checked_add_signed(Duration::days(shift))
        .ok_or_else(|| HilalError::CalendarConversion(format!("{} shifted by {} days", date, shift)))?;
    let hijri = calendar.hijri_date(hijri_day, system)?;

    Ok(DayDetails {
        gregorian: date.format("%-d %B %Y").to_string(),
        weekday: date.format("%A").to_string(),
        hijri,
        hijri_label: hijri.to_string(),
        calendar: system.label().to_string(),
        after_maghrib,
    })
}

/// [`day_details`] in the user's display calendar, shifted by a computed adjustment.
pub fn day_details_with_settings(
    date: NaiveDate,
    maghrib: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    adjustment: &CalendarAdjustment,
    calendar: &dyn CalendarFormatter,
    settings: &HilalSettings,
) -> Result<DayDetails, HilalError> {
    day_details(date, maghrib, now, adjustment.day_offset, calendar, settings.display_calendar)
}
