//! Client configuration (TOML).
//!
//! The poll cadence knobs live here because the protocol core defines no
//! timeout of its own: retry interval and give-up budget are caller
//! policy.

use serde::{Deserialize, Serialize};

use simbus_common::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
use simbus_common::consts::DEFAULT_SEGMENT_KEY;

/// Client process configuration.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "info"
/// service_name = "simbus-client-01"
///
/// segment_key = 24601
/// poll_interval_us = 250
/// poll_budget = 20000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Common SIMBUS application fields.
    pub shared: SharedConfig,

    /// Shared segment key the server publishes under.
    #[serde(default = "default_segment_key")]
    pub segment_key: u32,

    /// Sleep between empty polls [µs].
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,

    /// Empty polls before an exchange is abandoned.
    #[serde(default = "default_poll_budget")]
    pub poll_budget: u32,
}

fn default_segment_key() -> u32 {
    DEFAULT_SEGMENT_KEY
}

fn default_poll_interval_us() -> u64 {
    250
}

fn default_poll_budget() -> u32 {
    20_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig {
                log_level: LogLevel::Info,
                service_name: "simbus-client".to_string(),
            },
            segment_key: default_segment_key(),
            poll_interval_us: default_poll_interval_us(),
            poll_budget: default_poll_budget(),
        }
    }
}

impl ConfigLoader for ClientConfig {}

impl ClientConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the shared section is
    /// invalid or a poll knob is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.poll_interval_us == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_us must be positive".to_string(),
            ));
        }
        if self.poll_budget == 0 {
            return Err(ConfigError::ValidationError(
                "poll_budget must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.segment_key, DEFAULT_SEGMENT_KEY);
        assert_eq!(config.shared.service_name, "simbus-client");
    }

    #[test]
    fn loads_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
            segment_key = 4242
            poll_interval_us = 100

            [shared]
            log_level = "trace"
            service_name = "bench-client"
            "#,
        )
        .unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.segment_key, 4242);
        assert_eq!(config.poll_interval_us, 100);
        assert_eq!(config.poll_budget, 20_000); // default preserved
        assert_eq!(config.shared.log_level, LogLevel::Trace);
    }

    #[test]
    fn zero_poll_budget_fails_validation() {
        let mut config = ClientConfig::default();
        config.poll_budget = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_poll_interval_fails_validation() {
        let mut config = ClientConfig::default();
        config.poll_interval_us = 0;
        assert!(config.validate().is_err());
    }
}
