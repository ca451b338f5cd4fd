//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `breezehub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use breezehub_adapter_virtual::VirtualConfig;
use breezehub_app::preset_proxy::ProxyConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Write-coalescing settings.
    pub proxy: ProxySection,
    /// Poll loop settings.
    pub polling: PollingConfig,
    /// Simulated remote service.
    #[serde(rename = "virtual")]
    pub virtual_store: VirtualConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Preset proxy tuning.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProxySection {
    /// Quiet period after the last edit before a preset is saved, in milliseconds.
    pub debounce_ms: u64,
}

/// How often presets are refreshed from the remote service.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
}

impl Config {
    /// Load configuration from `breezehub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are unusable.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("breezehub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BREEZEHUB_DEBOUNCE_MS")
            && let Ok(ms) = val.parse()
        {
            self.proxy.debounce_ms = ms;
        }
        if let Ok(val) = std::env::var("BREEZEHUB_POLL_INTERVAL_SECS")
            && let Ok(secs) = val.parse()
        {
            self.polling.interval_secs = secs;
        }
        if let Ok(val) = std::env::var("BREEZEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.proxy.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "proxy.debounce_ms must be non-zero".to_string(),
            ));
        }
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "polling.interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig {
            debounce: Duration::from_millis(self.proxy.debounce_ms),
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "breezehubd=info,breezehub=info".to_string(),
        }
    }
}

impl Default for ProxySection {
    fn default() -> Self {
        Self { debounce_ms: 5_000 }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.proxy_config().debounce, Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.logging.filter, "breezehubd=info,breezehub=info");
        assert_eq!(config.virtual_store.latency_ms, 200);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.proxy.debounce_ms, 5_000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [logging]
            filter = 'debug'

            [proxy]
            debounce_ms = 1500

            [polling]
            interval_secs = 60

            [virtual]
            latency_ms = 50
            min_update_interval_secs = 3
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.proxy_config().debounce, Duration::from_millis(1500));
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.virtual_store.latency_ms, 50);
        assert_eq!(config.virtual_store.min_update_interval_secs, 3);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.polling.interval_secs, 30);
    }

    #[test]
    fn should_reject_zero_debounce() {
        let mut config = Config::default();
        config.proxy.debounce_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let mut config = Config::default();
        config.polling.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [proxy]
            debounce_ms = 250
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.proxy.debounce_ms, 250);
        assert_eq!(config.polling.interval_secs, 30);
        assert_eq!(config.virtual_store.min_update_interval_secs, 10);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
