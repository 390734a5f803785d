//! # Node configuration
//!
//! Loaded from a TOML file. Every key is optional and falls back to the
//! values the node was commissioned with.
//!
//! ```toml
//! log_level = "debug"
//!
//! [controller]
//! enclosure_on = 27.0
//! enclosure_off = 26.0
//! cpu_on = 70.0
//! cpu_off = 60.0
//! pulse_secs = 15.0
//!
//! [gpio]
//! fan_pin = 18
//! actuator_pin = 22
//!
//! [telemetry]
//! url = "http://127.0.0.1:5000/"
//! ```

use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::controls::{
    hysteresis::{HysteresisBand, HysteresisBandError},
    ControllerSettings,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid {band} band: {source}")]
    Band {
        band: &'static str,
        #[source]
        source: HysteresisBandError,
    },
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub gpio: GpioConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            controller: ControllerConfig::default(),
            gpio: GpioConfig::default(),
            acquisition: AcquisitionConfig::default(),
            export: ExportConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Thresholds in degC and the actuator pulse length.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    #[serde(default = "default_enclosure_on")]
    pub enclosure_on: f32,
    #[serde(default = "default_enclosure_off")]
    pub enclosure_off: f32,
    #[serde(default = "default_cpu_on")]
    pub cpu_on: f32,
    #[serde(default = "default_cpu_off")]
    pub cpu_off: f32,
    #[serde(default = "default_pulse_secs")]
    pub pulse_secs: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            enclosure_on: default_enclosure_on(),
            enclosure_off: default_enclosure_off(),
            cpu_on: default_cpu_on(),
            cpu_off: default_cpu_off(),
            pulse_secs: default_pulse_secs(),
        }
    }
}

/// BCM pin numbers and the sysfs mount. `simulate` skips the hardware entirely.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GpioConfig {
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
    #[serde(default = "default_fan_pin")]
    pub fan_pin: u32,
    #[serde(default = "default_actuator_pin")]
    pub actuator_pin: u32,
    #[serde(default)]
    pub simulate: bool,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            fan_pin: default_fan_pin(),
            actuator_pin: default_actuator_pin(),
            simulate: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcquisitionConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_telemetry_url")]
    pub url: String,
    #[serde(default = "default_telemetry_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_telemetry_url(),
            timeout_secs: default_telemetry_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controller_settings()?;
        self.log_filter()?;
        if self.acquisition.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "acquisition.interval_secs",
                reason: "must be at least one second".to_string(),
            });
        }
        if self.telemetry.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "telemetry.timeout_secs",
                reason: "must be at least one second".to_string(),
            });
        }
        if self.gpio.fan_pin == self.gpio.actuator_pin {
            return Err(ConfigError::Invalid {
                key: "gpio.actuator_pin",
                reason: format!("shares pin {} with the fan", self.gpio.fan_pin),
            });
        }
        Ok(())
    }

    pub fn controller_settings(&self) -> Result<ControllerSettings, ConfigError> {
        let c = &self.controller;
        let enclosure = HysteresisBand::new(c.enclosure_on, c.enclosure_off)
            .map_err(|source| ConfigError::Band {
                band: "enclosure",
                source,
            })?;
        let cpu = HysteresisBand::new(c.cpu_on, c.cpu_off)
            .map_err(|source| ConfigError::Band { band: "cpu", source })?;
        let pulse_duration =
            Duration::try_from_secs_f64(c.pulse_secs).map_err(|e| ConfigError::Invalid {
                key: "controller.pulse_secs",
                reason: e.to_string(),
            })?;

        Ok(ControllerSettings {
            enclosure,
            cpu,
            pulse_duration,
        })
    }

    pub fn log_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level).map_err(|e| ConfigError::Invalid {
            key: "log_level",
            reason: e.to_string(),
        })
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.acquisition.interval_secs)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_enclosure_on() -> f32 {
    27.0
}
fn default_enclosure_off() -> f32 {
    26.0
}
fn default_cpu_on() -> f32 {
    70.0
}
fn default_cpu_off() -> f32 {
    60.0
}
fn default_pulse_secs() -> f64 {
    15.0
}
fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/sys/class/gpio")
}
fn default_fan_pin() -> u32 {
    18
}
fn default_actuator_pin() -> u32 {
    22
}
fn default_interval_secs() -> u64 {
    30
}
fn default_csv_path() -> PathBuf {
    PathBuf::from("datos_muestreo.csv")
}
fn default_true() -> bool {
    true
}
fn default_telemetry_url() -> String {
    "http://127.0.0.1:5000/".to_string()
}
fn default_telemetry_timeout_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").expect("Failed to parse empty config");
        let settings = config.controller_settings().unwrap();

        assert_eq!(settings.enclosure.on(), 27.0);
        assert_eq!(settings.enclosure.off(), 26.0);
        assert_eq!(settings.cpu.on(), 70.0);
        assert_eq!(settings.pulse_duration, Duration::from_secs(15));
        assert_eq!(config.gpio.fan_pin, 18);
        assert_eq!(config.gpio.actuator_pin, 22);
        assert_eq!(config.sample_interval(), Duration::from_secs(30));
        assert_eq!(config.log_filter().unwrap(), LevelFilter::INFO);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            log_level = "debug"

            [controller]
            enclosure_on = 30.5
            pulse_secs = 2.5

            [gpio]
            simulate = true
            "#,
        )
        .unwrap();

        let settings = config.controller_settings().unwrap();
        assert_eq!(settings.enclosure.on(), 30.5);
        assert_eq!(settings.enclosure.off(), 26.0);
        assert_eq!(settings.pulse_duration, Duration::from_millis(2500));
        assert!(config.gpio.simulate);
        assert_eq!(config.log_filter().unwrap(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_rejects_inverted_band() {
        let result = Config::from_toml(
            r#"
            [controller]
            cpu_on = 50.0
            cpu_off = 60.0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Band { band: "cpu", .. })));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml("log_level = \"loud\""),
            Err(ConfigError::Invalid { key: "log_level", .. })
        ));
        assert!(matches!(
            Config::from_toml("[controller]\npulse_secs = -1.0"),
            Err(ConfigError::Invalid { key: "controller.pulse_secs", .. })
        ));
        assert!(matches!(
            Config::from_toml("[gpio]\nfan_pin = 22"),
            Err(ConfigError::Invalid { key: "gpio.actuator_pin", .. })
        ));
        assert!(matches!(
            Config::from_toml("[acquisition]\ninterval_secs = 0"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            Config::from_toml("[telemetry]\ntimeout_secs = 0"),
            Err(ConfigError::Invalid { key: "telemetry.timeout_secs", .. })
        ));
        assert!(matches!(
            Config::from_toml("[controller]\nenclosure_on = \"hot\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "[export]\ncsv_path = \"/tmp/samples.csv\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.export.csv_path, PathBuf::from("/tmp/samples.csv"));

        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
