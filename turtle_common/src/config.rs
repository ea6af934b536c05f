//! Configuration loading traits and types.
//!
//! Every turtle binary reads one TOML file. All sections are optional and
//! fall back to the defaults in [`crate::consts`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use turtle_common::config::{ConfigError, ConfigLoader, TurtleConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = TurtleConfig::load(Path::new("turtle.toml"))?;
//!     config.validate()?;
//!     println!("Device: {}", config.device.serial);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::consts::{
    DEFAULT_COMMAND_DELAY_US, DEFAULT_DRIVER, DEFAULT_LOOP_DELAY_MS, DEFAULT_SERIAL,
    DEFAULT_SERVICE_NAME, MAX_COMMAND_DELAY_US,
};

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, raw port writes included.
    Trace,
    /// Per-cycle decisions.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Cleanup problems.
    Warn,
    /// Fatal loop errors.
    Error,
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "turtle-bench"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which device to open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Serial number of the bit-bang adapter.
    #[serde(default = "default_serial")]
    pub serial: String,

    /// Registered driver name.
    #[serde(default = "default_driver")]
    pub driver: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            serial: default_serial(),
            driver: default_driver(),
        }
    }
}

/// Loop and maneuver timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Pulse hold inside every maneuver [µs].
    #[serde(default = "default_command_delay_us")]
    pub command_delay_us: u64,

    /// Delay between loop cycles [ms].
    #[serde(default = "default_loop_delay_ms")]
    pub loop_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            command_delay_us: DEFAULT_COMMAND_DELAY_US,
            loop_delay_ms: DEFAULT_LOOP_DELAY_MS,
        }
    }
}

impl TimingConfig {
    /// Maneuver pulse hold.
    pub fn command_delay(&self) -> Duration {
        Duration::from_micros(self.command_delay_us)
    }

    /// Inter-cycle delay.
    pub fn loop_delay(&self) -> Duration {
        Duration::from_millis(self.loop_delay_ms)
    }

    /// Validate the timing contract.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `command_delay_us` is 0 or above `MAX_COMMAND_DELAY_US`
    /// - `loop_delay_ms` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_delay_us == 0 || self.command_delay_us > MAX_COMMAND_DELAY_US {
            return Err(ConfigError::ValidationError(format!(
                "command_delay_us must be in 1..={MAX_COMMAND_DELAY_US}, got {}",
                self.command_delay_us
            )));
        }
        if self.loop_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "loop_delay_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the simulation driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Input byte sequence replayed on successive port reads (bits 6-7 used).
    /// Empty means both sensors read high.
    #[serde(default)]
    pub input_pattern: Vec<u8>,
}

/// Top-level configuration file.
///
/// # TOML Example
///
/// ```toml
/// [device]
/// serial = "A105BPBO"
/// driver = "simulation"
///
/// [timing]
/// command_delay_us = 5000
/// loop_delay_ms = 100
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurtleConfig {
    /// Logging and identity.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Device selection.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Timing constants.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Simulation driver settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl TurtleConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` on the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.device.serial.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "device.serial cannot be empty".to_string(),
            ));
        }
        if self.device.driver.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "device.driver cannot be empty".to_string(),
            ));
        }
        self.timing.validate()
    }
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_serial() -> String {
    DEFAULT_SERIAL.to_string()
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_command_delay_us() -> u64 {
    DEFAULT_COMMAND_DELAY_US
}

fn default_loop_delay_ms() -> u64 {
    DEFAULT_LOOP_DELAY_MS
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_log_level_deserialization() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct TestWrapper {
            level: LogLevel,
        }

        assert_eq!(
            toml::from_str::<TestWrapper>("level = \"trace\"")
                .unwrap()
                .level,
            LogLevel::Trace
        );
        assert_eq!(
            toml::from_str::<TestWrapper>("level = \"warn\"")
                .unwrap()
                .level,
            LogLevel::Warn
        );
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = TurtleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.device.serial, "A105BPBO");
        assert_eq!(config.timing.command_delay(), Duration::from_millis(5));
        assert_eq!(config.timing.loop_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_shared_config_validation_empty_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_timing_bounds() {
        let mut timing = TimingConfig::default();
        timing.command_delay_us = 0;
        assert!(timing.validate().is_err());

        timing.command_delay_us = MAX_COMMAND_DELAY_US + 1;
        assert!(timing.validate().is_err());

        timing.command_delay_us = 2_500;
        assert!(timing.validate().is_ok());

        timing.loop_delay_ms = 0;
        assert!(timing.validate().is_err());
    }

    #[test]
    fn test_empty_serial_rejected() {
        let mut config = TurtleConfig::default();
        config.device.serial = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_loader_file_not_found() {
        let result = TurtleConfig::load(Path::new("/nonexistent/path/turtle.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_config_loader_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = TurtleConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_loader_success() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[shared]
log_level = "debug"

[device]
serial = "FT00TEST"

[timing]
command_delay_us = 2500

[simulation]
input_pattern = [0xC0, 0x80]
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = TurtleConfig::load(file.path()).unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Debug);
        assert_eq!(config.shared.service_name, "turtle");
        assert_eq!(config.device.serial, "FT00TEST");
        assert_eq!(config.device.driver, "simulation");
        assert_eq!(config.timing.command_delay_us, 2500);
        assert_eq!(config.timing.loop_delay_ms, 100);
        assert_eq!(config.simulation.input_pattern, vec![0xC0, 0x80]);
    }

    #[test]
    fn test_unknown_timing_field_rejected() {
        let result = toml::from_str::<TurtleConfig>("[timing]\ncommand_delay = 5\n");
        assert!(result.is_err());
    }
}
