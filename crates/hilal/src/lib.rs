//! # Hilal
//!
//! Lunar crescent (hilal) visibility and the Hijri calendar day offset it
//! implies, with Meeus astronomy (VSOP87 Sun, ELP-2000/82 Moon).
//!
//! This crate is a facade that re-exports functionality from the `hilal` ecosystem.
//!
//! ## Modules
//!
//! - `types`: Core types (Observer, VisibilityCriteria, CalendarAdjustment, etc.)
//! - `calendar`: Hijri calendar systems (Umm al-Qura, civil, tabular)
//! - `astronomy`: Sun/Moon positions, phase search, sunset
//! - `offset`: Calendar offset engine
//!
//! ## Usage
//!
//! ```rust
//! use hilal::prelude::*;
//! use chrono::NaiveDate;
//!
//! let ephemeris = MeeusEphemeris::new();
//! let engine = CalendarOffsetEngine::new(&ephemeris, &AstronomicalSunset, &StandardCalendar);
//! let jakarta = Observer::new(-6.2088, 106.8456).unwrap();
//! let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
//!
//! let settings = HilalSettings::new().with_auto_adjust(true);
//! let adjustment = engine.compute_with_settings(date, &jakarta, &settings);
//! println!("{}", adjustment.trace);
//! ```

pub use hilal_core::*;
