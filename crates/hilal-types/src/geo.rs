//! Observer and visibility criteria types.

use serde::{Serialize, Deserialize};

use crate::HilalError;

/// Observer location (Latitude, Longitude) with elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Elevation above sea level in meters. Default: 0.0
    #[serde(default)]
    pub elevation: f64,
}

impl Observer {
    /// Creates a new validated observer at sea level.
    ///
    /// Returns `Err(HilalError::ValidationError)` if coordinates are out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, HilalError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(HilalError::ValidationError(
                format!("Latitude {} out of range [-90, 90]", latitude)
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(HilalError::ValidationError(
                format!("Longitude {} out of range [-180, 180]", longitude)
            ));
        }
        Ok(Self { latitude, longitude, elevation: 0.0 })
    }

    /// Creates an observer without validation. Use with trusted inputs only.
    #[inline]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, elevation: 0.0 }
    }

    /// Sets the elevation (meters above sea level).
    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    /// Mean solar time offset from UTC in whole minutes (15° of longitude per hour).
    pub fn mean_solar_offset_minutes(&self) -> i32 {
        (self.longitude / 15.0 * 60.0).round() as i32
    }
}

/// Configurable moon visibility criteria for hilal observation.
///
/// Default values match MABIMS (Indonesia/Malaysia/Brunei/Singapore).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityCriteria {
    /// Minimum moon altitude above horizon (degrees). Default: 3.0
    pub min_altitude_deg: f64,
    /// Minimum elongation between sun and moon (degrees). Default: 6.4
    pub min_elongation_deg: f64,
}

impl Default for VisibilityCriteria {
    fn default() -> Self {
        Self { min_altitude_deg: 3.0, min_elongation_deg: 6.4 }
    }
}

impl VisibilityCriteria {
    /// Creates criteria with custom thresholds. Thresholds must be finite and non-negative.
    pub fn new(min_altitude_deg: f64, min_elongation_deg: f64) -> Result<Self, HilalError> {
        let criteria = Self { min_altitude_deg, min_elongation_deg };
        criteria.validate()?;
        Ok(criteria)
    }

    /// MABIMS criteria (default for Southeast Asia).
    pub fn mabims() -> Self { Self::default() }

    /// Istanbul 1978 criteria (more conservative).
    pub fn istanbul_1978() -> Self {
        Self { min_altitude_deg: 5.0, min_elongation_deg: 8.0 }
    }

    pub fn validate(&self) -> Result<(), HilalError> {
        for (name, value) in [
            ("minimum altitude", self.min_altitude_deg),
            ("minimum elongation", self.min_elongation_deg),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(HilalError::ValidationError(
                    format!("{} must be a non-negative number of degrees, got {}", name, value)
                ));
            }
        }
        Ok(())
    }

    /// Both thresholds must be met (inclusive).
    #[inline]
    pub fn is_satisfied_by(&self, moon_altitude_deg: f64, elongation_deg: f64) -> bool {
        moon_altitude_deg >= self.min_altitude_deg && elongation_deg >= self.min_elongation_deg
    }
}
