//! Geocentric Moon from ELP-2000/82 via the `astro` crate.

use astro::lunar;

use crate::coords::{normalize_degrees, EclipticPosition};

/// Geocentric ecliptic position of the Moon; distance in km.
pub fn moon_position(jd: f64) -> EclipticPosition {
    // EclPoint angles are in radians.
    let (ecl_point, dist_km) = lunar::geocent_ecl_pos(jd);

    EclipticPosition {
        longitude: normalize_degrees(ecl_point.long.to_degrees()),
        latitude: ecl_point.lat.to_degrees(),
        distance_km: dist_km,
    }
}
