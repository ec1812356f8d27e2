//! # Hilal Core
//!
//! Crescent (hilal) visibility at sunset and the day offset it implies
//! between a tabular Hijri calendar and a sighting-based one.
//!
//! The pipeline only talks to three capabilities:
//! [`EphemerisService`], [`PrayerTimeService`] and [`CalendarFormatter`].
//! Default implementations ship in the sibling crates.

pub mod dashboard;
pub mod evaluator;
pub mod ijtima;
pub mod offset;
pub mod settings;

pub use hilal_types as types;
pub use hilal_calendar as calendar;
pub use hilal_ephemeris as astronomy;

pub use hilal_types::{
    AdjustmentOutcome, CalendarAdjustment, HilalError, HilalMeasurement, Observer,
    VisibilityCriteria,
};
pub use hilal_calendar::{CalendarFormatter, CalendarSystem, HijriParts, StandardCalendar};
pub use hilal_ephemeris::{
    AstronomicalSunset, Body, EphemerisService, EquatorialPosition, MeeusEphemeris,
    PrayerTimeService, PrecomputedSunsets, Vector3,
};

pub use dashboard::{day_details, day_details_with_settings, DayDetails, HilalDashboard, Verdict};
pub use evaluator::HilalEvaluator;
pub use ijtima::find_last_conjunction_before;
pub use offset::CalendarOffsetEngine;
pub use settings::{parse_threshold, HilalSettings};

pub mod prelude {
    pub use crate::types::*;
    pub use crate::{CalendarFormatter, CalendarSystem, HijriParts, StandardCalendar};
    pub use crate::{AstronomicalSunset, EphemerisService, MeeusEphemeris, PrayerTimeService};
    pub use crate::{CalendarOffsetEngine, HilalEvaluator, HilalSettings};
    pub use crate::{day_details, day_details_with_settings, HilalDashboard};
}
