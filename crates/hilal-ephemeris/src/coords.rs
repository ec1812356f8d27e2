//! Coordinate conversions and corrections.
//!
//! Implements:
//! - Ecliptic → Equatorial conversion
//! - Equatorial → Horizontal (Azimuth/Altitude) conversion
//! - Local Sidereal Time (LST)
//! - Topocentric parallax on the reference ellipsoid
//! - Atmospheric refraction
//!
//! Reference: Jean Meeus, "Astronomical Algorithms", Chapters 11, 12, 13, 16, 40.

use serde::{Serialize, Deserialize};

use crate::Vector3;

/// Earth's equatorial radius in km.
pub const EARTH_RADIUS_KM: f64 = 6378.14;

/// Polar-to-equatorial axis ratio (b/a) of the IAU 1976 ellipsoid.
const EARTH_AXIS_RATIO: f64 = 0.99664719;

/// Geocentric ecliptic coordinates: degrees and km.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclipticPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub distance_km: f64,
}

/// Normalizes an angle to [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 { 0.0 } else { a }
}

/// Normalizes an angle to [-180, 180).
pub fn normalize_signed(angle: f64) -> f64 {
    normalize_degrees(angle + 180.0) - 180.0
}

/// Mean obliquity of the ecliptic for a given Julian Day (simplified formula).
///
/// Reference: Meeus, Eq. 22.2 (simplified)
pub fn mean_obliquity(jd: f64) -> f64 {
    let t = (jd - 2451545.0) / 36525.0;
    23.439291 - 0.0130042 * t - 1.64e-7 * t * t + 5.04e-7 * t * t * t
}

/// Converts ecliptic longitude/latitude to (right ascension, declination), all in degrees.
pub fn ecliptic_to_equatorial(lon: f64, lat: f64, obliquity: f64) -> (f64, f64) {
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    let (sin_eps, cos_eps) = obliquity.to_radians().sin_cos();

    // Meeus Eq. 13.3, 13.4
    let ra = (sin_lon * cos_eps - sin_lat / cos_lat * sin_eps).atan2(cos_lon);
    let dec = (sin_lat * cos_eps + cos_lat * sin_eps * sin_lon).asin();

    (normalize_degrees(ra.to_degrees()), dec.to_degrees())
}

/// Local mean sidereal time in degrees [0, 360) for a Julian Day and east longitude.
///
/// Reference: Meeus, Eq. 12.4.
pub fn local_sidereal_time(jd: f64, longitude: f64) -> f64 {
    let t = (jd - 2451545.0) / 36525.0;

    let theta_0 = 280.46061837
        + 360.98564736629 * (jd - 2451545.0)
        + 0.000387933 * t * t
        - t * t * t / 38710000.0;

    normalize_degrees(normalize_degrees(theta_0) + longitude)
}

/// Converts equatorial coordinates to (azimuth from North clockwise, altitude), degrees.
pub fn equatorial_to_horizontal(ra: f64, dec: f64, lst: f64, lat: f64) -> (f64, f64) {
    let (sin_h, cos_h) = (lst - ra).to_radians().sin_cos();
    let (sin_dec, cos_dec) = dec.to_radians().sin_cos();
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();

    // Meeus Eq. 13.6
    let alt = (sin_lat * sin_dec + cos_lat * cos_dec * cos_h).asin();

    // Meeus Eq. 13.5 gives azimuth from South; shift to North.
    let az = sin_h.atan2(cos_h * sin_lat - sin_dec / cos_dec * cos_lat);

    (normalize_degrees(az.to_degrees() + 180.0), alt.to_degrees())
}

/// Refraction (degrees) to add to a true altitude to get the apparent one.
///
/// R = 1.02 / tan(h + 10.3 / (h + 5.11)) arcminutes, standard atmosphere.
/// Zero below -1°.
///
/// Reference: Meeus, Eq. 16.4.
pub fn refraction_correction(altitude: f64) -> f64 {
    if altitude < -1.0 {
        return 0.0;
    }
    let h = altitude.max(0.0);
    let r_arcmin = 1.02 / (h + 10.3 / (h + 5.11)).to_radians().tan();
    r_arcmin / 60.0
}

/// Observer's geocentric position terms (ρ sin φ', ρ cos φ').
///
/// Reference: Meeus, Chapter 11.
pub fn geocentric_observer_terms(latitude: f64, elevation_m: f64) -> (f64, f64) {
    let phi = latitude.to_radians();
    let u = (EARTH_AXIS_RATIO * phi.tan()).atan();
    let h = elevation_m / (EARTH_RADIUS_KM * 1000.0);

    let rho_sin_phi = EARTH_AXIS_RATIO * u.sin() + h * phi.sin();
    let rho_cos_phi = u.cos() + h * phi.cos();
    (rho_sin_phi, rho_cos_phi)
}

/// Topocentric place of a body given its geocentric one.
///
/// Returns (right ascension, declination, observer-to-body distance in km).
///
/// Reference: Meeus, Eq. 40.2, 40.3.
pub fn apply_parallax(
    ra: f64,
    dec: f64,
    distance_km: f64,
    latitude: f64,
    elevation_m: f64,
    lst: f64,
) -> (f64, f64, f64) {
    let (rho_sin_phi, rho_cos_phi) = geocentric_observer_terms(latitude, elevation_m);

    // Equatorial horizontal parallax (Meeus Eq. 40.1)
    let sin_pi = EARTH_RADIUS_KM / distance_km;

    let (sin_h, cos_h) = (lst - ra).to_radians().sin_cos();
    let (sin_dec, cos_dec) = dec.to_radians().sin_cos();

    let delta_ra = (-rho_cos_phi * sin_pi * sin_h).atan2(cos_dec - rho_cos_phi * sin_pi * cos_h);
    let dec_topo = ((sin_dec - rho_sin_phi * sin_pi) * delta_ra.cos())
        .atan2(cos_dec - rho_cos_phi * sin_pi * cos_h);

    let ra_topo = normalize_degrees(ra + delta_ra.to_degrees());

    // Observer sits at RA = LST on the equatorial frame.
    let body = Vector3::from_equatorial(ra, dec, distance_km);
    let (sin_lst, cos_lst) = lst.to_radians().sin_cos();
    let site = Vector3::new(
        EARTH_RADIUS_KM * rho_cos_phi * cos_lst,
        EARTH_RADIUS_KM * rho_cos_phi * sin_lst,
        EARTH_RADIUS_KM * rho_sin_phi,
    );
    let distance_topo = Vector3::new(body.x - site.x, body.y - site.y, body.z - site.z).length();

    (ra_topo, dec_topo.to_degrees(), distance_topo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: f64, m: f64, s: f64) -> f64 {
        (h + m / 60.0 + s / 3600.0) * 15.0
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_degrees(-30.0), 330.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert!((normalize_signed(350.0) + 10.0).abs() < 1e-12);
        assert!((normalize_signed(190.0) + 170.0).abs() < 1e-12);
        assert!((normalize_signed(-190.0) - 170.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_obliquity_meeus_22a() {
        // 1987 April 10, 0h TD: 23°26'27.407"
        let eps = mean_obliquity(2446895.5);
        assert!((eps - 23.440946).abs() < 1e-4);
    }

    #[test]
    fn test_sidereal_time_meeus_12a() {
        // 1987 April 10, 0h UT: 13h10m46.3668s
        let lst = local_sidereal_time(2446895.5, 0.0);
        assert!((lst - hms(13.0, 10.0, 46.3668)).abs() < 1e-4);

        let east = local_sidereal_time(2446895.5, 100.0);
        assert!((normalize_signed(east - lst) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_ecliptic_to_equatorial_meeus_13a() {
        // Pollux
        let (ra, dec) = ecliptic_to_equatorial(113.215630, 6.684170, 23.4392911);
        assert!((ra - 116.328942).abs() < 1e-4);
        assert!((dec - 28.026183).abs() < 1e-4);
    }

    #[test]
    fn test_horizontal_meeus_13b() {
        // Venus from Washington, hour angle 64.352133°
        let ra = 347.3193375;
        let lst = normalize_degrees(ra + 64.352133);
        let lat = 38.0 + 55.0 / 60.0 + 17.0 / 3600.0;
        let (az, alt) = equatorial_to_horizontal(ra, -6.719892, lst, lat);
        assert!((alt - 15.1249).abs() < 1e-3);
        assert!((az - 248.0337).abs() < 1e-3);
    }

    #[test]
    fn test_refraction() {
        assert!((refraction_correction(0.0) - 0.4830).abs() < 1e-3);
        assert!(refraction_correction(10.0) < refraction_correction(5.0));
        assert!(refraction_correction(45.0) > 0.0);
        assert_eq!(refraction_correction(-2.0), 0.0);
    }

    #[test]
    fn test_observer_terms_palomar() {
        // Meeus 11.a
        let (s, c) = geocentric_observer_terms(33.0 + 21.0 / 60.0 + 22.0 / 3600.0, 1706.0);
        assert!((s - 0.546861).abs() < 1e-6);
        assert!((c - 0.836339).abs() < 1e-6);
    }

    #[test]
    fn test_parallax_meeus_40a() {
        // Mars from Palomar, 2003 August 28
        let ra = hms(22.0, 38.0, 7.25);
        let dec = -(15.0 + 46.0 / 60.0 + 15.9 / 3600.0);
        let dist = 0.37276 * crate::vsop87::AU_KM;
        let lat = 33.0 + 21.0 / 60.0 + 22.0 / 3600.0;
        let lst = normalize_degrees(ra + 288.7958);

        let (ra_topo, dec_topo, dist_topo) = apply_parallax(ra, dec, dist, lat, 1706.0, lst);
        assert!((ra_topo - hms(22.0, 38.0, 8.54)).abs() < 1e-4);
        assert!((dec_topo + (15.0 + 46.0 / 60.0 + 30.0 / 3600.0)).abs() < 1e-4);
        assert!((dist_topo - dist).abs() < EARTH_RADIUS_KM);
    }

    #[test]
    fn test_parallax_lowers_moon_near_horizon() {
        // Moon on the western horizon: parallax pushes it down by about its horizontal parallax.
        let lat = 0.0;
        let lst = 0.0;
        let ra = 270.0;
        let (_, alt_geo) = equatorial_to_horizontal(ra, 0.0, lst, lat);
        let (ra_topo, dec_topo, _) = apply_parallax(ra, 0.0, 384_400.0, lat, 0.0, lst);
        let (_, alt_topo) = equatorial_to_horizontal(ra_topo, dec_topo, lst, lat);
        let drop = alt_geo - alt_topo;
        assert!(drop > 0.9 && drop < 1.0, "drop {}", drop);
    }
}
