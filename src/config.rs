//! Engine configuration: tape size, pacing and the step limit of unpaced runs.

use crate::types::{BASE_INTERVAL_MS, DEFAULT_TAPE_LENGTH, MAX_EXECUTION_STEPS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building or loading an `EngineConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("speed must be between 1 and 100 percent, got {0}")]
    InvalidSpeed(u8),
    #[error("tape length must be at least 1")]
    EmptyTape,
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

/// Run speed as a percentage of the base pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Speed(u8);

impl Speed {
    pub const FULL: Speed = Speed(100);

    pub fn new(percent: u8) -> Result<Self, ConfigError> {
        if percent == 0 || percent > 100 {
            return Err(ConfigError::InvalidSpeed(percent));
        }
        Ok(Speed(percent))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// The next speed preset: 100 → 80 → 60 → 40 → 20 → 100.
    pub fn cycle(self) -> Self {
        if self.0 <= 20 {
            Speed::FULL
        } else {
            Speed(self.0 - 20)
        }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed::FULL
    }
}

impl TryFrom<u8> for Speed {
    type Error = ConfigError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Speed::new(percent)
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

/// The delay inserted after every step of a paced run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub base_interval: Duration,
    pub speed: Speed,
}

impl Pacing {
    /// Runs without waiting between steps.
    pub const IMMEDIATE: Pacing = Pacing {
        base_interval: Duration::ZERO,
        speed: Speed::FULL,
    };

    /// `base_interval / (speed / 100)`: the base interval at 100%, longer at lower speeds.
    pub fn delay(&self) -> Duration {
        self.base_interval * 100 / u32::from(self.speed.percent())
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(BASE_INTERVAL_MS),
            speed: Speed::FULL,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cells on a fresh tape.
    pub tape_length: usize,
    /// Delay between two steps at full speed, in milliseconds.
    pub base_interval_ms: u64,
    /// Run speed in percent.
    pub speed: Speed,
    /// Step limit of unpaced runs.
    pub max_steps: usize,
    /// Snapshots kept in a machine's trace; unset keeps all of them.
    pub trace_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tape_length: DEFAULT_TAPE_LENGTH,
            base_interval_ms: BASE_INTERVAL_MS,
            speed: Speed::FULL,
            max_steps: MAX_EXECUTION_STEPS,
            trace_limit: None,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_toml_str(&content)
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_tape_length(mut self, tape_length: usize) -> Self {
        self.tape_length = tape_length;
        self
    }

    pub fn with_base_interval(mut self, interval: Duration) -> Self {
        self.base_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_trace_limit(mut self, limit: Option<usize>) -> Self {
        self.trace_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tape_length == 0 {
            return Err(ConfigError::EmptyTape);
        }
        Ok(())
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            base_interval: Duration::from_millis(self.base_interval_ms),
            speed: self.speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.tape_length, 50);
        assert_eq!(config.pacing().delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_delay_grows_as_speed_drops() {
        let pacing = |percent| Pacing {
            base_interval: Duration::from_millis(500),
            speed: Speed::new(percent).unwrap(),
        };

        assert_eq!(pacing(100).delay(), Duration::from_millis(500));
        assert_eq!(pacing(50).delay(), Duration::from_millis(1000));
        assert_eq!(pacing(20).delay(), Duration::from_millis(2500));
        assert_eq!(Pacing::IMMEDIATE.delay(), Duration::ZERO);
    }

    #[test]
    fn test_speed_bounds_and_cycle() {
        assert!(Speed::new(0).is_err());
        assert!(Speed::new(101).is_err());

        let mut speed = Speed::FULL;
        let mut seen = Vec::new();
        for _ in 0..5 {
            speed = speed.cycle();
            seen.push(speed.percent());
        }
        assert_eq!(seen, vec![80, 60, 40, 20, 100]);
    }

    #[test]
    fn test_from_toml() {
        let config = EngineConfig::from_toml_str("speed = 40\ntape_length = 12\n").unwrap();

        assert_eq!(config.speed.percent(), 40);
        assert_eq!(config.tape_length, 12);
        assert_eq!(config.base_interval_ms, BASE_INTERVAL_MS);
    }

    #[test]
    fn test_base_interval_saturates() {
        let config = EngineConfig::default().with_base_interval(Duration::MAX);
        assert_eq!(config.base_interval_ms, u64::MAX);

        let config = EngineConfig::default().with_base_interval(Duration::from_secs(2));
        assert_eq!(config.base_interval_ms, 2000);
    }

    #[test]
    fn test_trace_limit_from_toml() {
        assert_eq!(EngineConfig::default().trace_limit, None);

        let config = EngineConfig::from_toml_str("trace_limit = 100").unwrap();
        assert_eq!(config.trace_limit, Some(100));
        assert_eq!(config.with_trace_limit(None).trace_limit, None);
    }

    #[test]
    fn test_invalid_toml_values() {
        assert!(EngineConfig::from_toml_str("speed = 0").is_err());
        assert!(matches!(
            EngineConfig::from_toml_str("tape_length = 0"),
            Err(ConfigError::EmptyTape)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "base_interval_ms = 100\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.pacing().delay(), Duration::from_millis(100));

        assert!(matches!(
            EngineConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
