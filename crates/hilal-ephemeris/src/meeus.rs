//! Default [`EphemerisService`] built on VSOP87 and ELP-2000/82.

use chrono::{DateTime, Utc};
use tracing::trace;

use hilal_types::{HilalError, Observer};

use crate::coords::{self, normalize_signed, EclipticPosition};
use crate::julian::{datetime_to_jd, jd_to_datetime};
use crate::{elp2000, vsop87, Body, EphemerisService, EquatorialPosition};

/// Coarse scan step for the phase search: the Moon gains about 3° on the Sun per step.
const DEFAULT_STEP_DAYS: f64 = 0.25;
/// Bisection stops once the bracket is narrower than this (~0.09 s).
const DEFAULT_CONVERGENCE_DAYS: f64 = 1e-6;
const MAX_BISECTIONS: usize = 64;

/// Sun and Moon from the Meeus algorithms.
///
/// The Moon is topocentric (parallax for the observer's latitude and
/// elevation). The Sun is geocentric; its parallax is under 9 arcseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeeusEphemeris {
    step_days: f64,
    convergence_days: f64,
}

impl Default for MeeusEphemeris {
    fn default() -> Self {
        Self {
            step_days: DEFAULT_STEP_DAYS,
            convergence_days: DEFAULT_CONVERGENCE_DAYS,
        }
    }
}

impl MeeusEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geocentric ecliptic position of `body` at a Julian Day.
    pub fn ecliptic_position(&self, body: Body, jd: f64) -> EclipticPosition {
        match body {
            Body::Sun => vsop87::sun_position(jd),
            Body::Moon => elp2000::moon_position(jd),
        }
    }

    /// Moon minus Sun ecliptic longitude, less `target`, in [-180, 180).
    fn phase_offset(&self, jd: f64, target: f64) -> f64 {
        let moon = elp2000::moon_position(jd);
        let sun = vsop87::sun_position(jd);
        normalize_signed(moon.longitude - sun.longitude - target)
    }

    fn bisect(&self, mut t_a: f64, mut t_b: f64, target: f64) -> f64 {
        for _ in 0..MAX_BISECTIONS {
            if t_b - t_a < self.convergence_days {
                break;
            }
            let t_mid = 0.5 * (t_a + t_b);
            if self.phase_offset(t_mid, target) >= 0.0 {
                t_b = t_mid;
            } else {
                t_a = t_mid;
            }
        }
        0.5 * (t_a + t_b)
    }
}

/// A sign change that is a real crossing and not the ±180° wrap.
fn is_genuine_crossing(f_a: f64, f_b: f64) -> bool {
    f_a < 0.0 && f_b >= 0.0 && (f_a - f_b).abs() < 270.0
}

impl EphemerisService for MeeusEphemeris {
    fn equatorial_position(
        &self,
        body: Body,
        at: DateTime<Utc>,
        observer: &Observer,
    ) -> Result<EquatorialPosition, HilalError> {
        let jd = datetime_to_jd(at);
        let ecl = self.ecliptic_position(body, jd);
        let obliquity = coords::mean_obliquity(jd);
        let (ra, dec) = coords::ecliptic_to_equatorial(ecl.longitude, ecl.latitude, obliquity);

        let position = match body {
            Body::Sun => EquatorialPosition::new(ra, dec, ecl.distance_km),
            Body::Moon => {
                let lst = coords::local_sidereal_time(jd, observer.longitude);
                let (ra, dec, dist) = coords::apply_parallax(
                    ra,
                    dec,
                    ecl.distance_km,
                    observer.latitude,
                    observer.elevation,
                    lst,
                );
                EquatorialPosition::new(ra, dec, dist)
            }
        };

        if !(position.right_ascension.is_finite() && position.declination.is_finite()) {
            return Err(HilalError::ephemeris(format!("non-finite {} position at {}", body, at)));
        }
        Ok(position)
    }

    fn horizontal_altitude(
        &self,
        at: DateTime<Utc>,
        observer: &Observer,
        right_ascension: f64,
        declination: f64,
    ) -> Result<f64, HilalError> {
        if !(right_ascension.is_finite() && declination.is_finite()) {
            return Err(HilalError::ephemeris("non-finite equatorial coordinates"));
        }
        let jd = datetime_to_jd(at);
        let lst = coords::local_sidereal_time(jd, observer.longitude);
        let (_, altitude) =
            coords::equatorial_to_horizontal(right_ascension, declination, lst, observer.latitude);
        Ok(altitude + coords::refraction_correction(altitude))
    }

    fn search_phase(
        &self,
        body: Body,
        target_phase_deg: f64,
        start: DateTime<Utc>,
        window_days: f64,
    ) -> Result<Option<DateTime<Utc>>, HilalError> {
        if body != Body::Moon {
            return Err(HilalError::ephemeris(format!("phase search is defined for the Moon, not the {}", body)));
        }
        if !(window_days.is_finite() && window_days > 0.0 && target_phase_deg.is_finite()) {
            return Err(HilalError::ephemeris(format!(
                "invalid phase search window {} days / target {}°",
                window_days, target_phase_deg
            )));
        }

        let jd_start = datetime_to_jd(start);
        let jd_end = jd_start + window_days;

        let mut t_prev = jd_start;
        let mut f_prev = self.phase_offset(t_prev, target_phase_deg);
        if f_prev == 0.0 {
            return Ok(Some(start));
        }

        while t_prev < jd_end {
            let t_curr = (t_prev + self.step_days).min(jd_end);
            let f_curr = self.phase_offset(t_curr, target_phase_deg);

            if is_genuine_crossing(f_prev, f_curr) {
                let jd = self.bisect(t_prev, t_curr, target_phase_deg);
                let event = jd_to_datetime(jd)?;
                trace!(%event, target_phase_deg, "phase crossing");
                return Ok(Some(event));
            }

            t_prev = t_curr;
            f_prev = f_curr;
        }

        Ok(None)
    }
}
