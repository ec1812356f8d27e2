use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use std::fmt;

use crate::VisibilityCriteria;

/// Crescent parameters at one sunset for one observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HilalMeasurement {
    /// Sunset instant the measurement was taken at.
    pub observed_at: DateTime<Utc>,
    /// Last conjunction (ijtima') at or before `observed_at`.
    pub conjunction_time: DateTime<Utc>,
    /// Hours between conjunction and sunset.
    pub moon_age_hours: f64,
    /// Moon altitude above the horizon (degrees).
    pub moon_altitude_deg: f64,
    /// Angular separation between Sun and Moon (degrees).
    pub elongation_deg: f64,
    /// Whether the criteria used for this measurement were met.
    pub is_eligible: bool,
}

impl HilalMeasurement {
    /// Returns the same measurement judged against other thresholds.
    pub fn with_criteria(&self, criteria: &VisibilityCriteria) -> Self {
        Self {
            is_eligible: criteria.is_satisfied_by(self.moon_altitude_deg, self.elongation_deg),
            ..*self
        }
    }

    /// Month length implied by this sighting: 29 if seen, otherwise completed to 30 (istikmal).
    pub fn sighted_month_length(&self) -> u32 {
        if self.is_eligible { 29 } else { 30 }
    }
}

impl fmt::Display for HilalMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "age {:.1} h, altitude {:.2}°, elongation {:.2}° ({})",
            self.moon_age_hours,
            self.moon_altitude_deg,
            self.elongation_deg,
            if self.is_eligible { "visible" } else { "istikmal" }
        )
    }
}
