use std::env;

use chrono_tz::Tz;

use crate::time::{DstPolicy, TimeNormalizer};

/// Process-wide settings, read once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Reference zone for wall-clock input (`ROOMBOOK_TIMEZONE`, IANA name).
    pub timezone: Tz,
    /// Tie-break for repeated/skipped local hours (`ROOMBOOK_DST_POLICY`).
    pub dst_policy: DstPolicy,
    /// Seed sample rooms and users on startup (`ROOMBOOK_SEED`).
    pub seed: bool,
    /// Prometheus exporter port (`ROOMBOOK_METRICS_PORT`); disabled when unset.
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            dst_policy: DstPolicy::default(),
            seed: false,
            metrics_port: None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: unknown time zone '{value}'")]
    Timezone { var: &'static str, value: String },
    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(value) = lookup("ROOMBOOK_TIMEZONE") {
            config.timezone = value.trim().parse().map_err(|_| ConfigError::Timezone {
                var: "ROOMBOOK_TIMEZONE",
                value,
            })?;
        }
        if let Some(value) = lookup("ROOMBOOK_DST_POLICY") {
            config.dst_policy = value.parse().map_err(|e: crate::engine::BookingError| {
                ConfigError::Invalid {
                    var: "ROOMBOOK_DST_POLICY",
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = lookup("ROOMBOOK_SEED") {
            config.seed = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(ConfigError::Invalid {
                        var: "ROOMBOOK_SEED",
                        reason: format!("expected a boolean, got '{other}'"),
                    });
                }
            };
        }
        if let Some(value) = lookup("ROOMBOOK_METRICS_PORT") {
            let port = value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "ROOMBOOK_METRICS_PORT",
                reason: format!("not a port number: '{value}'"),
            })?;
            config.metrics_port = Some(port);
        }

        Ok(config)
    }

    pub fn normalizer(&self) -> TimeNormalizer {
        TimeNormalizer::new(self.timezone, self.dst_policy)
    }
}
