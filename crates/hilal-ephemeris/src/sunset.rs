//! Sunset (maghrib) providers.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

use hilal_types::Observer;

use crate::julian::datetime_to_jd;
use crate::{coords, vsop87};

/// Source of sunset instants for a date and place.
pub trait PrayerTimeService: std::fmt::Debug + Send + Sync {
    /// Sunset on `date` for `observer`, or `None` when unavailable.
    fn sunset_for(&self, date: NaiveDate, observer: &Observer) -> Option<DateTime<Utc>>;
}

/// Latitude beyond which the Sun may not set.
pub const POLAR_LATITUDE_LIMIT: f64 = 66.5;

/// Standard refraction at the horizon, 34 arcminutes.
const HORIZON_REFRACTION_DEG: f64 = 0.567;
/// Solar semi-diameter, 16 arcminutes.
const SUN_SEMI_DIAMETER_DEG: f64 = 0.267;
const MS_PER_HOUR: f64 = 3_600_000.0;
/// 12 hours halve to under a second in 16 steps.
const MAX_BISECTIONS: usize = 32;

/// Sunset from the VSOP87 Sun, found by bisection on the Sun's altitude
/// between local mean noon and local mean midnight.
///
/// The target altitude is adjusted for:
/// - Atmospheric refraction (~34 arcminutes)
/// - Sun's semi-diameter (~16 arcminutes)
/// - Horizon dip from elevation: dip = 2.076 * sqrt(elevation_m) arcminutes
#[derive(Debug, Clone, Copy, Default)]
pub struct AstronomicalSunset;

impl AstronomicalSunset {
    /// Target geometric altitude of the Sun's centre at sunset, degrees.
    pub fn target_altitude(elevation_m: f64) -> f64 {
        let dip_deg = 2.076 * elevation_m.max(0.0).sqrt() / 60.0;
        -(HORIZON_REFRACTION_DEG + SUN_SEMI_DIAMETER_DEG + dip_deg)
    }

    /// Geometric altitude of the Sun's centre, degrees.
    pub fn sun_altitude(at: DateTime<Utc>, observer: &Observer) -> f64 {
        let jd = datetime_to_jd(at);
        let sun = vsop87::sun_position(jd);
        let obliquity = coords::mean_obliquity(jd);
        let (ra, dec) = coords::ecliptic_to_equatorial(sun.longitude, sun.latitude, obliquity);
        let lst = coords::local_sidereal_time(jd, observer.longitude);
        let (_, altitude) = coords::equatorial_to_horizontal(ra, dec, lst, observer.latitude);
        altitude
    }

    /// Sunset on `date`, or `None` for polar latitudes and for days on which
    /// the Sun does not cross the target altitude between noon and midnight.
    pub fn estimate(date: NaiveDate, observer: &Observer) -> Option<DateTime<Utc>> {
        if observer.latitude.abs() > POLAR_LATITUDE_LIMIT {
            return None;
        }

        let noon_offset_ms = (observer.longitude / 15.0 * MS_PER_HOUR).round() as i64;
        let mut low =
            date.and_hms_opt(12, 0, 0)?.and_utc() - Duration::milliseconds(noon_offset_ms);
        let mut high = low + Duration::hours(12);

        let target = Self::target_altitude(observer.elevation);
        let above = |at: DateTime<Utc>| -> Option<bool> {
            let altitude = Self::sun_altitude(at, observer);
            altitude.is_finite().then_some(altitude > target)
        };

        // Sun must be up at noon and down at midnight.
        if !above(low)? || above(high)? {
            return None;
        }

        for _ in 0..MAX_BISECTIONS {
            if high - low <= Duration::seconds(1) {
                break;
            }
            let mid = low + (high - low) / 2;
            if above(mid)? {
                low = mid;
            } else {
                high = mid;
            }
        }

        Some(low + (high - low) / 2)
    }
}

impl PrayerTimeService for AstronomicalSunset {
    fn sunset_for(&self, date: NaiveDate, observer: &Observer) -> Option<DateTime<Utc>> {
        Self::estimate(date, observer)
    }
}

/// Sunsets supplied up front, e.g. from a published prayer timetable for one place.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedSunsets {
    table: BTreeMap<NaiveDate, DateTime<Utc>>,
}

impl PrecomputedSunsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, sunset: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.table.insert(date, sunset)
    }

    pub fn with(mut self, date: NaiveDate, sunset: DateTime<Utc>) -> Self {
        self.table.insert(date, sunset);
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl FromIterator<(NaiveDate, DateTime<Utc>)> for PrecomputedSunsets {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, DateTime<Utc>)>>(iter: I) -> Self {
        Self { table: iter.into_iter().collect() }
    }
}

impl PrayerTimeService for PrecomputedSunsets {
    fn sunset_for(&self, date: NaiveDate, _observer: &Observer) -> Option<DateTime<Utc>> {
        self.table.get(&date).copied()
    }
}
