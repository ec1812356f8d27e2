//! Crescent measurement at a sunset.

use chrono::{DateTime, Utc};
use tracing::debug;

use hilal_ephemeris::{Body, EphemerisService};
use hilal_types::{HilalError, HilalMeasurement, Observer, VisibilityCriteria};

use crate::ijtima::find_last_conjunction_before;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Measures moon age, altitude and elongation at sunset and judges them
/// against a [`VisibilityCriteria`].
#[derive(Debug, Clone, Copy)]
pub struct HilalEvaluator<'a> {
    ephemeris: &'a dyn EphemerisService,
}

impl<'a> HilalEvaluator<'a> {
    pub fn new(ephemeris: &'a dyn EphemerisService) -> Self {
        Self { ephemeris }
    }

    /// Evaluates the crescent at `sunset` for `observer`.
    ///
    /// # Errors
    /// Propagates ephemeris failures and conjunction lookup errors.
    pub fn evaluate(
        &self,
        sunset: DateTime<Utc>,
        observer: &Observer,
        criteria: &VisibilityCriteria,
    ) -> Result<HilalMeasurement, HilalError> {
        let conjunction_time = find_last_conjunction_before(self.ephemeris, sunset)?;
        let moon_age_hours = (sunset - conjunction_time).num_milliseconds() as f64 / MS_PER_HOUR;

        let moon = self.ephemeris.equatorial_position(Body::Moon, sunset, observer)?;
        let sun = self.ephemeris.equatorial_position(Body::Sun, sunset, observer)?;

        let moon_altitude_deg = self.ephemeris.horizontal_altitude(
            sunset,
            observer,
            moon.right_ascension,
            moon.declination,
        )?;
        let elongation_deg = self.ephemeris.angle_between(&sun.vector, &moon.vector);

        let measurement = HilalMeasurement {
            observed_at: sunset,
            conjunction_time,
            moon_age_hours,
            moon_altitude_deg,
            elongation_deg,
            is_eligible: criteria.is_satisfied_by(moon_altitude_deg, elongation_deg),
        };
        debug!(%measurement, %sunset, "hilal measurement");
        Ok(measurement)
    }
}
