//! Ijtima' (conjunction) lookup.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use hilal_ephemeris::{Body, EphemerisService};
use hilal_types::HilalError;

/// Days before the reference at which the search starts.
pub const LOOKBACK_DAYS: i64 = 30;
/// Width of each phase search window.
pub const SEARCH_WINDOW_DAYS: f64 = 35.0;
/// Repeated searches may place the same new moon up to about a second apart.
pub const SAME_EVENT_TOLERANCE_MS: i64 = 2_000;

/// Finds the most recent new moon at or before `reference`.
///
/// Searches forward from 30 days earlier and keeps stepping one second past
/// each event until the next one falls after `reference`. An event found
/// less than [`SAME_EVENT_TOLERANCE_MS`] after `reference` is taken to be at
/// `reference`.
///
/// # Errors
/// - `NoConjunction` when the first event found is already after `reference`.
/// - `Ephemeris` when a search window holds no new moon, or the ephemeris
///   returns an event that does not move forward.
pub fn find_last_conjunction_before(
    ephemeris: &dyn EphemerisService,
    reference: DateTime<Utc>,
) -> Result<DateTime<Utc>, HilalError> {
    let start = reference - Duration::days(LOOKBACK_DAYS);
    let mut last = next_new_moon(ephemeris, start)?;
    if last > reference {
        return Err(HilalError::NoConjunction { reference });
    }

    loop {
        let next = next_new_moon(ephemeris, last + Duration::seconds(1))?;
        if next <= last {
            return Err(HilalError::ephemeris(format!(
                "new moon search went backwards: {} after {}",
                next, last
            )));
        }
        if next > reference {
            if next - reference < Duration::milliseconds(SAME_EVENT_TOLERANCE_MS) {
                last = reference;
            }
            break;
        }
        last = next;
    }

    debug!(conjunction = %last, %reference, "last conjunction");
    Ok(last)
}

fn next_new_moon(
    ephemeris: &dyn EphemerisService,
    from: DateTime<Utc>,
) -> Result<DateTime<Utc>, HilalError> {
    ephemeris
        .search_phase(Body::Moon, 0.0, from, SEARCH_WINDOW_DAYS)?
        .ok_or_else(|| {
            HilalError::ephemeris(format!(
                "no new moon within {} days of {}",
                SEARCH_WINDOW_DAYS, from
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hilal_ephemeris::{EquatorialPosition, Observer};

    /// New moons at fixed instants; phase search returns the first one at or after `start`.
    #[derive(Debug)]
    struct FixedLunations(Vec<DateTime<Utc>>);

    impl EphemerisService for FixedLunations {
        fn equatorial_position(
            &self,
            _: Body,
            _: DateTime<Utc>,
            _: &Observer,
        ) -> Result<EquatorialPosition, HilalError> {
            Err(HilalError::ephemeris("unused"))
        }

        fn horizontal_altitude(
            &self,
            _: DateTime<Utc>,
            _: &Observer,
            _: f64,
            _: f64,
        ) -> Result<f64, HilalError> {
            Err(HilalError::ephemeris("unused"))
        }

        fn search_phase(
            &self,
            _: Body,
            _: f64,
            start: DateTime<Utc>,
            window_days: f64,
        ) -> Result<Option<DateTime<Utc>>, HilalError> {
            let end = start + Duration::milliseconds((window_days * 86_400_000.0) as i64);
            Ok(self.0.iter().copied().find(|t| *t >= start && *t <= end))
        }
    }

    /// Like [`FixedLunations`], but a search started more than 20 days before
    /// an event places it 800 ms late, the way bisection from a distant
    /// bracket can.
    #[derive(Debug)]
    struct JitteryLunations(Vec<DateTime<Utc>>);

    impl EphemerisService for JitteryLunations {
        fn equatorial_position(
            &self,
            _: Body,
            _: DateTime<Utc>,
            _: &Observer,
        ) -> Result<EquatorialPosition, HilalError> {
            Err(HilalError::ephemeris("unused"))
        }

        fn horizontal_altitude(
            &self,
            _: DateTime<Utc>,
            _: &Observer,
            _: f64,
            _: f64,
        ) -> Result<f64, HilalError> {
            Err(HilalError::ephemeris("unused"))
        }

        fn search_phase(
            &self,
            _: Body,
            _: f64,
            start: DateTime<Utc>,
            window_days: f64,
        ) -> Result<Option<DateTime<Utc>>, HilalError> {
            let end = start + Duration::milliseconds((window_days * 86_400_000.0) as i64);
            Ok(self.0.iter().copied().find(|t| *t >= start && *t <= end).map(|t| {
                if t - start > Duration::days(20) {
                    t + Duration::milliseconds(800)
                } else {
                    t
                }
            }))
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn lunations() -> FixedLunations {
        FixedLunations(vec![
            utc(2024, 2, 9, 23),
            utc(2024, 3, 10, 9),
            utc(2024, 4, 8, 18),
        ])
    }

    #[test]
    fn test_picks_latest_before_reference() {
        let found = find_last_conjunction_before(&lunations(), utc(2024, 3, 10, 11)).unwrap();
        assert_eq!(found, utc(2024, 3, 10, 9));

        let found = find_last_conjunction_before(&lunations(), utc(2024, 3, 10, 8)).unwrap();
        assert_eq!(found, utc(2024, 2, 9, 23));
    }

    #[test]
    fn test_event_at_reference_counts() {
        let found = find_last_conjunction_before(&lunations(), utc(2024, 3, 10, 9)).unwrap();
        assert_eq!(found, utc(2024, 3, 10, 9));
    }

    #[test]
    fn test_jittered_event_at_reference_is_kept() {
        let eph = JitteryLunations(vec![
            utc(2024, 2, 9, 23),
            utc(2024, 3, 10, 9),
            utc(2024, 4, 8, 18),
        ]);
        let new_moon = utc(2024, 3, 10, 9);

        // Re-found 800 ms late from the previous lunation; still this month's new moon.
        for lag_ms in [0, 1, 500] {
            let reference = new_moon + Duration::milliseconds(lag_ms);
            let found = find_last_conjunction_before(&eph, reference).unwrap();
            assert!(found <= reference);
            assert!(found >= new_moon, "lag {} ms gave {}", lag_ms, found);
        }

        // A reference clearly before the new moon still gets the previous one.
        let found = find_last_conjunction_before(&eph, new_moon - Duration::seconds(3)).unwrap();
        assert!(found < utc(2024, 2, 10, 0));
    }

    #[test]
    fn test_first_event_after_reference() {
        let eph = FixedLunations(vec![utc(2024, 3, 6, 9)]);
        let err = find_last_conjunction_before(&eph, utc(2024, 3, 5, 0)).unwrap_err();
        assert!(matches!(err, HilalError::NoConjunction { .. }));
    }

    #[test]
    fn test_missing_following_event_is_an_error() {
        let eph = FixedLunations(vec![utc(2024, 3, 10, 9)]);
        let err = find_last_conjunction_before(&eph, utc(2024, 3, 20, 0)).unwrap_err();
        assert!(matches!(err, HilalError::Ephemeris(_)));
    }

    #[derive(Debug)]
    struct Stuck;

    impl EphemerisService for Stuck {
        fn equatorial_position(
            &self,
            _: Body,
            _: DateTime<Utc>,
            _: &Observer,
        ) -> Result<EquatorialPosition, HilalError> {
            Err(HilalError::ephemeris("unused"))
        }

        fn horizontal_altitude(
            &self,
            _: DateTime<Utc>,
            _: &Observer,
            _: f64,
            _: f64,
        ) -> Result<f64, HilalError> {
            Err(HilalError::ephemeris("unused"))
        }

        fn search_phase(
            &self,
            _: Body,
            _: f64,
            _: DateTime<Utc>,
            _: f64,
        ) -> Result<Option<DateTime<Utc>>, HilalError> {
            Ok(Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()))
        }
    }

    #[test]
    fn test_non_advancing_ephemeris_terminates() {
        let err = find_last_conjunction_before(&Stuck, utc(2024, 3, 10, 0)).unwrap_err();
        assert!(err.to_string().contains("backwards"));
    }
}
