//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `minivalve.toml` in the working directory, or at the path given
//! by `MINIVALVE_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use serde::Deserialize;

use minivalve_domain::id::EndpointId;
use minivalve_domain::valve::OnTime;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Valve endpoint settings.
    pub valve: ValveConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Valve endpoint configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ValveConfig {
    /// Endpoint number on the network (`1..=240`).
    pub endpoint: u8,
    /// Default auto-off duration, in tenths of a second. `0` disables it.
    pub on_time: u16,
    /// Open the valve right after start-up.
    pub initial_state: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("MINIVALVE_CONFIG").unwrap_or_else(|_| "minivalve.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
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

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("MINIVALVE_ENDPOINT").and_then(|v| v.parse().ok()) {
            self.valve.endpoint = endpoint;
        }
        if let Some(on_time) = lookup("MINIVALVE_ON_TIME").and_then(|v| v.parse().ok()) {
            self.valve.on_time = on_time;
        }
        if let Some(val) = lookup("MINIVALVE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.valve.endpoint().is_application() {
            return Err(ConfigError::Validation(format!(
                "endpoint {} is outside 1..=240",
                self.valve.endpoint
            )));
        }
        Ok(())
    }
}

impl ValveConfig {
    #[must_use]
    pub fn endpoint(&self) -> EndpointId {
        EndpointId::new(self.endpoint)
    }

    #[must_use]
    pub fn on_time(&self) -> OnTime {
        OnTime::from_tenths(self.on_time)
    }
}

impl Default for ValveConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointId::DEFAULT.get(),
            on_time: OnTime::DEFAULT.tenths(),
            initial_state: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "minivalved=info,minivalve=info".to_string(),
        }
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
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.valve.endpoint(), EndpointId::DEFAULT);
        assert_eq!(config.valve.on_time(), OnTime::DEFAULT);
        assert!(!config.valve.initial_state);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.valve.on_time, 3600);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [valve]
            endpoint = 12
            on_time = 50
            initial_state = true

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.valve.endpoint(), EndpointId::new(12));
        assert_eq!(config.valve.on_time(), OnTime::from_tenths(50));
        assert!(config.valve.initial_state);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [valve]
            on_time = 0
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.valve.on_time(), OnTime::DISABLED);
        assert_eq!(config.valve.endpoint(), EndpointId::DEFAULT);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.valve.on_time, 3600);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_on_time_out_of_range() {
        let result: Result<Config, _> = toml::from_str("[valve]\non_time = 70000");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("MINIVALVE_ENDPOINT", "20"),
            ("MINIVALVE_ON_TIME", "15"),
            ("MINIVALVE_LOG", "trace"),
        ]));
        assert_eq!(config.valve.endpoint(), EndpointId::new(20));
        assert_eq!(config.valve.on_time(), OnTime::from_tenths(15));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_prefer_rust_log_over_minivalve_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("MINIVALVE_LOG", "trace"), ("RUST_LOG", "warn")]));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_ignore_unparsable_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("MINIVALVE_ON_TIME", "forever")]));
        assert_eq!(config.valve.on_time(), OnTime::DEFAULT);
    }

    #[test]
    fn should_reject_reserved_endpoint() {
        let mut config = Config::default();
        config.valve.endpoint = 0;
        assert!(config.validate().is_err());
        config.valve.endpoint = 241;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_default_endpoint() {
        assert!(Config::default().validate().is_ok());
    }
}
