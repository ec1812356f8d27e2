//! Hilal configuration.
//!
//! Settings can be built in code, parsed from JSON, or read from `HILAL_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument};

use hilal_calendar::CalendarSystem;
use hilal_types::{HilalError, VisibilityCriteria};

/// Default number of days scanned back for the previous month's 29th day.
pub const DEFAULT_SCAN_LIMIT_DAYS: u32 = 40;
const MAX_SCAN_LIMIT_DAYS: u32 = 400;
/// Largest UTC offset in use anywhere (UTC+14).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

pub const ENV_AUTO_ADJUST: &str = "HILAL_AUTO_ADJUST";
pub const ENV_MIN_ALTITUDE: &str = "HILAL_MIN_ALTITUDE";
pub const ENV_MIN_ELONGATION: &str = "HILAL_MIN_ELONGATION";
pub const ENV_CALENDAR: &str = "HILAL_CALENDAR";
pub const ENV_DISPLAY_CALENDAR: &str = "HILAL_DISPLAY_CALENDAR";
pub const ENV_SCAN_LIMIT_DAYS: &str = "HILAL_SCAN_LIMIT_DAYS";
pub const ENV_UTC_OFFSET_MINUTES: &str = "HILAL_UTC_OFFSET_MINUTES";

fn default_scan_limit_days() -> u32 {
    DEFAULT_SCAN_LIMIT_DAYS
}

/// Parses a threshold typed as text. Surrounding whitespace is ignored and
/// anything that is not a number reads as `0.0`.
pub fn parse_threshold(text: &str) -> f64 {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Configuration for the calendar offset engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HilalSettings {
    /// Adjust the displayed date from the crescent sighting. Default: false
    #[serde(default)]
    pub auto_adjust: bool,
    #[serde(default)]
    pub criteria: VisibilityCriteria,
    /// Calendar scanned for the month boundary.
    #[serde(default)]
    pub scan_calendar: CalendarSystem,
    /// Calendar the user reads dates in.
    #[serde(default)]
    pub display_calendar: CalendarSystem,
    #[serde(default = "default_scan_limit_days")]
    pub scan_limit_days: u32,
    /// Offset used for the 18:00 fallback sunset. `None` uses the observer's mean solar time.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl Default for HilalSettings {
    fn default() -> Self {
        Self {
            auto_adjust: false,
            criteria: VisibilityCriteria::default(),
            scan_calendar: CalendarSystem::default(),
            display_calendar: CalendarSystem::default(),
            scan_limit_days: DEFAULT_SCAN_LIMIT_DAYS,
            utc_offset_minutes: None,
        }
    }
}

impl FromStr for HilalSettings {
    type Err = HilalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
            .map_err(|e| HilalError::invalid_config(format!("settings JSON: {}", e)))
    }
}

impl HilalSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalizes a builder chain and runs validation.
    pub fn build(self) -> Result<Self, HilalError> {
        self.validate()?;
        Ok(self)
    }

    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), HilalError> {
        self.criteria
            .validate()
            .map_err(|e| HilalError::invalid_config(e.to_string()))?;

        if !(1..=MAX_SCAN_LIMIT_DAYS).contains(&self.scan_limit_days) {
            return Err(HilalError::invalid_config(format!(
                "scan limit must be between 1 and {} days, got {}",
                MAX_SCAN_LIMIT_DAYS, self.scan_limit_days
            )));
        }

        if let Some(offset) = self.utc_offset_minutes {
            if offset.abs() > MAX_UTC_OFFSET_MINUTES {
                return Err(HilalError::invalid_config(format!(
                    "UTC offset must be within ±{} minutes, got {}",
                    MAX_UTC_OFFSET_MINUTES, offset
                )));
            }
        }

        Ok(())
    }

    /// Loads settings from `HILAL_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are errors.
    #[instrument]
    pub fn from_env() -> Result<Self, HilalError> {
        debug!("Loading hilal settings from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HilalError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(v) = lookup(ENV_AUTO_ADJUST) {
            settings.auto_adjust = parse_bool(ENV_AUTO_ADJUST, &v)?;
        }
        if let Some(v) = lookup(ENV_MIN_ALTITUDE) {
            settings.criteria.min_altitude_deg = parse_number(ENV_MIN_ALTITUDE, &v)?;
        }
        if let Some(v) = lookup(ENV_MIN_ELONGATION) {
            settings.criteria.min_elongation_deg = parse_number(ENV_MIN_ELONGATION, &v)?;
        }
        if let Some(v) = lookup(ENV_CALENDAR) {
            settings.scan_calendar = parse_calendar(ENV_CALENDAR, &v)?;
        }
        if let Some(v) = lookup(ENV_DISPLAY_CALENDAR) {
            settings.display_calendar = parse_calendar(ENV_DISPLAY_CALENDAR, &v)?;
        }
        if let Some(v) = lookup(ENV_SCAN_LIMIT_DAYS) {
            settings.scan_limit_days = parse_number(ENV_SCAN_LIMIT_DAYS, &v)?;
        }
        if let Some(v) = lookup(ENV_UTC_OFFSET_MINUTES) {
            settings.utc_offset_minutes = Some(parse_number(ENV_UTC_OFFSET_MINUTES, &v)?);
        }

        settings.build()
    }

    /// Loads and validates settings from a JSON file.
    #[instrument(skip(path), fields(file = %path.as_ref().display()))]
    pub fn try_from_json(path: impl AsRef<Path>) -> Result<Self, HilalError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            HilalError::invalid_config(format!("cannot read {}: {}", path.as_ref().display(), e))
        })?;
        content.parse::<Self>()?.build()
    }

    // ========== Fluent Helper Methods ==========

    pub fn with_auto_adjust(mut self, enabled: bool) -> Self {
        self.auto_adjust = enabled;
        self
    }

    pub fn with_criteria(mut self, criteria: VisibilityCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Sets the altitude threshold from settings-screen text (see [`parse_threshold`]).
    pub fn with_min_altitude_text(mut self, text: &str) -> Self {
        self.criteria.min_altitude_deg = parse_threshold(text);
        self
    }

    /// Sets the elongation threshold from settings-screen text (see [`parse_threshold`]).
    pub fn with_min_elongation_text(mut self, text: &str) -> Self {
        self.criteria.min_elongation_deg = parse_threshold(text);
        self
    }

    pub fn with_scan_calendar(mut self, calendar: CalendarSystem) -> Self {
        self.scan_calendar = calendar;
        self
    }

    pub fn with_display_calendar(mut self, calendar: CalendarSystem) -> Self {
        self.display_calendar = calendar;
        self
    }

    pub fn with_scan_limit_days(mut self, days: u32) -> Self {
        self.scan_limit_days = days;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = Some(minutes);
        self
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, HilalError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(HilalError::invalid_config(format!("{} is not a boolean: {:?}", name, other))),
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, HilalError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| HilalError::invalid_config(format!("{} is not a valid number: {:?}", name, value)))
}

fn parse_calendar(name: &str, value: &str) -> Result<CalendarSystem, HilalError> {
    value
        .parse::<CalendarSystem>()
        .map_err(|e| HilalError::invalid_config(format!("{}: {}", name, e)))
}
