//! Calendar system identifiers.

use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use hilal_types::HilalError;

/// Hijri calendar system, identified by its Unicode calendar id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CalendarSystem {
    /// Saudi Umm al-Qura calendar (table based).
    #[default]
    #[serde(rename = "islamic-umalqura", alias = "")]
    UmmAlQura,
    /// Arithmetic calendar, Friday epoch (16 July 622 Julian).
    #[serde(rename = "islamic-civil")]
    Civil,
    /// Arithmetic calendar, Thursday (astronomical) epoch.
    #[serde(rename = "islamic-tbla")]
    Tabular,
}

impl CalendarSystem {
    pub const ALL: [CalendarSystem; 3] = [Self::UmmAlQura, Self::Civil, Self::Tabular];

    pub fn id(&self) -> &'static str {
        match self {
            Self::UmmAlQura => "islamic-umalqura",
            Self::Civil => "islamic-civil",
            Self::Tabular => "islamic-tbla",
        }
    }

    /// Human-readable name shown next to a rendered date.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UmmAlQura => "Islamic (Umm al-Qura)",
            Self::Civil => "Islamic (civil)",
            Self::Tabular => "Islamic (tabular)",
        }
    }
}

impl fmt::Display for CalendarSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CalendarSystem {
    type Err = HilalError;

    /// Parses a calendar id. An empty id selects the default system.
    ///
    /// `islamic` and `islamic-rgsa` are sighting based on the host platform and
    /// are rejected as unsupported.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "islamic-umalqura" => Ok(Self::UmmAlQura),
            "islamic-civil" => Ok(Self::Civil),
            "islamic-tbla" => Ok(Self::Tabular),
            other => Err(HilalError::UnsupportedCalendar(other.to_string())),
        }
    }
}
