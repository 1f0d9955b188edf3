//! TOML-driven tracker configuration.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! review_day = "friday"
//! presence_history_limit = 50
//! default_radius_meters = 100.0
//! ```

use std::path::Path;
use std::str::FromStr;

use chrono::Weekday;
use serde::Deserialize;

use siwes_contracts::error::{TrackError, TrackResult};
use siwes_contracts::records::DEFAULT_RADIUS_METERS;

/// Resolved runtime configuration for the operation gates.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// The only day of the week on which weekly reviews are accepted.
    pub review_day: Weekday,
    /// How many presence records a history read returns.
    pub presence_history_limit: usize,
    /// Geofence radius applied to locations created without one.
    pub default_radius_meters: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            review_day: Weekday::Fri,
            presence_history_limit: 50,
            default_radius_meters: DEFAULT_RADIUS_METERS,
        }
    }
}

/// The raw TOML shape; all fields optional.
#[derive(Debug, Deserialize)]
struct RawConfig {
    review_day: Option<String>,
    presence_history_limit: Option<usize>,
    default_radius_meters: Option<f64>,
}

impl TrackerConfig {
    /// Parse `s` as TOML configuration.
    ///
    /// Returns `TrackError::Config` if the TOML is malformed or the review
    /// day is not a recognizable weekday name.
    pub fn from_toml_str(s: &str) -> TrackResult<Self> {
        let raw: RawConfig = toml::from_str(s).map_err(|e| TrackError::Config {
            reason: format!("failed to parse tracker config TOML: {e}"),
        })?;

        let mut config = Self::default();
        if let Some(day) = raw.review_day {
            config.review_day = Weekday::from_str(&day).map_err(|_| TrackError::Config {
                reason: format!("unrecognized review day '{day}'"),
            })?;
        }
        if let Some(limit) = raw.presence_history_limit {
            config.presence_history_limit = limit;
        }
        if let Some(radius) = raw.default_radius_meters {
            if !radius.is_finite() || radius < 0.0 {
                return Err(TrackError::Config {
                    reason: format!("default radius must be non-negative, got {radius}"),
                });
            }
            config.default_radius_meters = radius;
        }
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> TrackResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TrackError::Config {
            reason: format!("failed to read config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = TrackerConfig::from_toml_str("").unwrap();
        assert_eq!(config.review_day, Weekday::Fri);
        assert_eq!(config.presence_history_limit, 50);
        assert_eq!(config.default_radius_meters, 100.0);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config = TrackerConfig::from_toml_str(
            r#"
            review_day = "wednesday"
            presence_history_limit = 10
            default_radius_meters = 250.0
            "#,
        )
        .unwrap();
        assert_eq!(config.review_day, Weekday::Wed);
        assert_eq!(config.presence_history_limit, 10);
        assert_eq!(config.default_radius_meters, 250.0);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let result = TrackerConfig::from_toml_str("this is not toml ][[[");
        assert!(matches!(result, Err(TrackError::Config { .. })));
    }

    #[test]
    fn unknown_weekday_rejected() {
        let result = TrackerConfig::from_toml_str(r#"review_day = "freitag""#);
        match result {
            Err(TrackError::Config { reason }) => assert!(reason.contains("freitag")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn negative_radius_rejected() {
        let result = TrackerConfig::from_toml_str("default_radius_meters = -5.0");
        assert!(matches!(result, Err(TrackError::Config { .. })));
    }
}
