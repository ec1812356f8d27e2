//! Calendar adjustment result and its structured trace.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Deserialize};
use std::fmt;

use crate::{HilalError, HilalMeasurement, VisibilityCriteria};

/// How an adjustment was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AdjustmentOutcome {
    /// Auto-adjustment switched off; nothing was computed.
    Disabled,
    /// No 29th day of the previous month within the scan window.
    ScanLimitReached { days_scanned: u32 },
    /// A collaborator failed; the offset fell back to zero.
    Failed { reason: String },
    /// Offset derived from the sighting at the month boundary.
    #[serde(rename_all = "camelCase")]
    Applied {
        boundary_date: NaiveDate,
        boundary_sunset: DateTime<Utc>,
        used_fallback_sunset: bool,
        criteria: VisibilityCriteria,
        measurement: HilalMeasurement,
        alternate_month_length: u32,
        sighted_month_length: u32,
    },
}

impl fmt::Display for AdjustmentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::ScanLimitReached { days_scanned } => write!(
                f,
                "scan limit reached: no day 29 of the previous month within {} days",
                days_scanned
            ),
            Self::Failed { reason } => write!(f, "{}", reason),
            Self::Applied {
                boundary_date,
                boundary_sunset,
                used_fallback_sunset,
                criteria,
                measurement,
                alternate_month_length,
                sighted_month_length,
            } => {
                writeln!(f, "Boundary: {} (day 29 of previous month)", boundary_date)?;
                writeln!(
                    f,
                    "Sunset: {}{}",
                    boundary_sunset.format("%Y-%m-%d %H:%M:%S UTC"),
                    if *used_fallback_sunset { " (fallback 18:00 local)" } else { "" }
                )?;
                writeln!(
                    f,
                    "Altitude: {:.2}° vs min {}°",
                    measurement.moon_altitude_deg, criteria.min_altitude_deg
                )?;
                writeln!(
                    f,
                    "Elongation: {:.2}° vs min {}°",
                    measurement.elongation_deg, criteria.min_elongation_deg
                )?;
                writeln!(
                    f,
                    "Month length: calendar {} / sighting {}",
                    alternate_month_length, sighted_month_length
                )?;
                write!(
                    f,
                    "Adjustment: {:+}",
                    i64::from(*alternate_month_length) - i64::from(*sighted_month_length)
                )
            }
        }
    }
}

/// Day offset to add to a date before rendering it in the alternate calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarAdjustment {
    pub day_offset: i64,
    /// Diagnostic text. Not meant for control flow.
    pub trace: String,
    pub outcome: AdjustmentOutcome,
}

impl CalendarAdjustment {
    fn zero(outcome: AdjustmentOutcome) -> Self {
        Self { day_offset: 0, trace: outcome.to_string(), outcome }
    }

    pub fn disabled() -> Self {
        Self::zero(AdjustmentOutcome::Disabled)
    }

    pub fn scan_limit_reached(days_scanned: u32) -> Self {
        Self::zero(AdjustmentOutcome::ScanLimitReached { days_scanned })
    }

    pub fn failed(error: &HilalError) -> Self {
        Self::zero(AdjustmentOutcome::Failed { reason: error.to_string() })
    }

    /// Builds an applied adjustment: `alternate_month_length - sighted_month_length`.
    pub fn applied(
        boundary_date: NaiveDate,
        boundary_sunset: DateTime<Utc>,
        used_fallback_sunset: bool,
        criteria: VisibilityCriteria,
        measurement: HilalMeasurement,
        alternate_month_length: u32,
    ) -> Self {
        let sighted_month_length = measurement.sighted_month_length();
        let day_offset = i64::from(alternate_month_length) - i64::from(sighted_month_length);
        let outcome = AdjustmentOutcome::Applied {
            boundary_date,
            boundary_sunset,
            used_fallback_sunset,
            criteria,
            measurement,
            alternate_month_length,
            sighted_month_length,
        };
        Self { day_offset, trace: outcome.to_string(), outcome }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, AdjustmentOutcome::Applied { .. })
    }

    /// The boundary measurement, when one was taken.
    pub fn measurement(&self) -> Option<&HilalMeasurement> {
        match &self.outcome {
            AdjustmentOutcome::Applied { measurement, .. } => Some(measurement),
            _ => None,
        }
    }
}

impl fmt::Display for CalendarAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+} day(s): {}", self.day_offset, self.trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn boundary_measurement(eligible: bool) -> HilalMeasurement {
        let sunset = Utc.with_ymd_and_hms(2024, 3, 10, 11, 5, 0).unwrap();
        HilalMeasurement {
            observed_at: sunset,
            conjunction_time: Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap(),
            moon_age_hours: 2.083,
            moon_altitude_deg: if eligible { 5.0 } else { 0.71 },
            elongation_deg: if eligible { 7.0 } else { 2.3 },
            is_eligible: eligible,
        }
    }

    #[test]
    fn test_disabled_trace() {
        let adj = CalendarAdjustment::disabled();
        assert_eq!(adj.day_offset, 0);
        assert_eq!(adj.trace, "disabled");
        assert!(!adj.is_applied());
    }

    #[test]
    fn test_scan_limit_trace() {
        let adj = CalendarAdjustment::scan_limit_reached(40);
        assert_eq!(adj.day_offset, 0);
        assert!(adj.trace.contains("scan limit"));
        assert!(adj.trace.contains("40"));
    }

    #[test]
    fn test_failed_carries_message() {
        let adj = CalendarAdjustment::failed(&HilalError::ephemeris("moon position unavailable"));
        assert_eq!(adj.day_offset, 0);
        assert_eq!(adj.trace, "Ephemeris computation failed: moon position unavailable");
    }

    #[test]
    fn test_applied_offsets() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let sunset = Utc.with_ymd_and_hms(2024, 3, 10, 11, 5, 0).unwrap();
        let criteria = VisibilityCriteria::mabims();

        let seen = CalendarAdjustment::applied(date, sunset, false, criteria, boundary_measurement(true), 30);
        assert_eq!(seen.day_offset, 1);
        assert!(seen.trace.ends_with("Adjustment: +1"));

        let istikmal = CalendarAdjustment::applied(date, sunset, true, criteria, boundary_measurement(false), 30);
        assert_eq!(istikmal.day_offset, 0);
        assert!(istikmal.trace.contains("fallback"));

        let short = CalendarAdjustment::applied(date, sunset, false, criteria, boundary_measurement(false), 29);
        assert_eq!(short.day_offset, -1);
        assert!(short.measurement().is_some());
    }
}
