//! Rule configurations shipped with lintbridge.

use std::fmt;

/// A rule configuration compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BundledConfig {
    /// Sun coding conventions.
    #[default]
    SunChecks,
    /// Google Java Style.
    GoogleChecks,
}

impl BundledConfig {
    /// Every bundled configuration, in presentation order.
    pub const ALL: [BundledConfig; 2] = [Self::SunChecks, Self::GoogleChecks];

    /// Stable identifier, persisted in settings and cache keys.
    pub fn id(self) -> &'static str {
        match self {
            Self::SunChecks => "bundled-sun-checks",
            Self::GoogleChecks => "bundled-google-checks",
        }
    }

    /// Human-readable name.
    pub fn description(self) -> &'static str {
        match self {
            Self::SunChecks => "Sun Checks",
            Self::GoogleChecks => "Google Checks",
        }
    }

    /// The configuration document.
    pub fn text(self) -> &'static str {
        match self {
            Self::SunChecks => include_str!("../bundled/sun_checks.xml"),
            Self::GoogleChecks => include_str!("../bundled/google_checks.xml"),
        }
    }

    /// Looks up a configuration by its [`id`](Self::id).
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|config| config.id() == id)
    }

    /// Picks a configuration from a loose description such as `"sun"` or
    /// `"Google Checks"`. Anything not naming Sun maps to Google.
    pub fn from_description(description: &str) -> Self {
        if description.to_ascii_lowercase().contains("sun") {
            Self::SunChecks
        } else {
            Self::GoogleChecks
        }
    }
}

impl fmt::Display for BundledConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
