//! Geocentric Sun from the VSOP87D Earth series.
//!
//! Reference: Jean Meeus, "Astronomical Algorithms", Chapter 25.

use vsop87::vsop87d;

use crate::coords::{normalize_degrees, EclipticPosition};

/// Kilometres per astronomical unit.
pub const AU_KM: f64 = 149_597_870.7;

/// Geocentric ecliptic position of the Sun; distance in km.
///
/// The Sun is placed opposite the heliocentric Earth: longitude + 180°,
/// latitude negated, same radius.
pub fn sun_position(jd: f64) -> EclipticPosition {
    let earth = vsop87d::earth(jd);

    EclipticPosition {
        longitude: normalize_degrees(earth.longitude().to_degrees() + 180.0),
        latitude: -earth.latitude().to_degrees(),
        distance_km: earth.distance() * AU_KM,
    }
}
