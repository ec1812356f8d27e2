//! Sun and Moon positions, lunar phase search and sunset times for Hilal.
//!
//! The crescent evaluation only talks to the [`EphemerisService`] and
//! [`PrayerTimeService`] traits. [`MeeusEphemeris`] and [`AstronomicalSunset`]
//! are the built-in implementations (VSOP87 for the Sun, ELP-2000/82 for the Moon).

pub mod vsop87;
pub mod elp2000;
pub mod coords;
pub mod julian;
pub mod meeus;
pub mod sunset;

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use std::fmt;

pub use hilal_types::{HilalError, Observer};
pub use meeus::MeeusEphemeris;
pub use sunset::{AstronomicalSunset, PrayerTimeService, PrecomputedSunsets};

/// Bodies the ephemeris can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Sun => write!(f, "Sun"),
            Body::Moon => write!(f, "Moon"),
        }
    }
}

/// Cartesian equatorial vector (km).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Builds a vector from right ascension / declination (degrees) and distance.
    pub fn from_equatorial(ra_deg: f64, dec_deg: f64, distance: f64) -> Self {
        let (ra, dec) = (ra_deg.to_radians(), dec_deg.to_radians());
        Self {
            x: distance * dec.cos() * ra.cos(),
            y: distance * dec.cos() * ra.sin(),
            z: distance * dec.sin(),
        }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Angle to `other` in degrees, in [0, 180]. Zero-length vectors give 0.
    pub fn angle_to(&self, other: &Vector3) -> f64 {
        let denom = self.length() * other.length();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos().to_degrees()
    }
}

/// Equatorial position of a body as seen by an observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialPosition {
    /// Right ascension, degrees in [0, 360).
    pub right_ascension: f64,
    /// Declination, degrees.
    pub declination: f64,
    /// Observer-to-body distance in km.
    pub distance_km: f64,
    pub vector: Vector3,
}

impl EquatorialPosition {
    pub fn new(right_ascension: f64, declination: f64, distance_km: f64) -> Self {
        Self {
            right_ascension,
            declination,
            distance_km,
            vector: Vector3::from_equatorial(right_ascension, declination, distance_km),
        }
    }
}

/// Celestial-mechanics capability consumed by the crescent evaluation.
pub trait EphemerisService: fmt::Debug + Send + Sync {
    /// Equatorial coordinates of `body` at `at` for `observer`.
    fn equatorial_position(
        &self,
        body: Body,
        at: DateTime<Utc>,
        observer: &Observer,
    ) -> Result<EquatorialPosition, HilalError>;

    /// Altitude above the horizon (degrees) of the given equatorial coordinates.
    fn horizontal_altitude(
        &self,
        at: DateTime<Utc>,
        observer: &Observer,
        right_ascension: f64,
        declination: f64,
    ) -> Result<f64, HilalError>;

    /// Angular separation of two position vectors in degrees.
    fn angle_between(&self, a: &Vector3, b: &Vector3) -> f64 {
        a.angle_to(b)
    }

    /// Next instant within `window_days` of `start` at which the body reaches
    /// `target_phase_deg` (Moon–Sun ecliptic longitude difference).
    ///
    /// Returns `Ok(None)` when no such instant falls inside the window.
    fn search_phase(
        &self,
        body: Body,
        target_phase_deg: f64,
        start: DateTime<Utc>,
        window_days: f64,
    ) -> Result<Option<DateTime<Utc>>, HilalError>;
}
