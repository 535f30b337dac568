//! Configuration management for Lamicoid
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats, chosen by file extension.
//!
//! Configuration is organized into sections:
//! - Laser target (model, address, firmware, engine library, timeout)
//! - Engrave process preset
//! - Cut process preset
//! - Canvas defaults for new labels

pub use lamicoid_core::units::MeasurementSystem;
use lamicoid_core::DeviceModel;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Laser target settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserSettings {
    /// Device model, as a catalogue key (`fusionpro32`) or model name
    pub device_model: String,
    /// Engraver IP address
    pub ip_address: String,
    /// Firmware version written into the settings document
    pub firmware_version: String,
    /// Explicit engine library path; searched for when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_library: Option<PathBuf>,
    /// Wall-clock limit for print file generation in milliseconds
    pub job_timeout_ms: u64,
}

impl Default for LaserSettings {
    fn default() -> Self {
        Self {
            device_model: DeviceModel::Pro32.catalogue_key().to_string(),
            ip_address: "192.168.1.100".to_string(),
            firmware_version: "1.0.9.0".to_string(),
            engine_library: None,
            job_timeout_ms: 120_000,
        }
    }
}

impl LaserSettings {
    /// The configured device model
    pub fn model(&self) -> ConfigResult<DeviceModel> {
        self.device_model
            .parse()
            .map_err(|reason| ConfigError::InvalidValue {
                key: "laser.device_model".to_string(),
                reason,
            })
    }

    /// The configured engraver address
    pub fn ip(&self) -> ConfigResult<IpAddr> {
        self.ip_address
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "laser.ip_address".to_string(),
                reason: format!("'{}' is not an IP address", self.ip_address),
            })
    }
}

/// Engrave process preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngraveSettings {
    /// Include an engrave process for the label text
    pub enabled: bool,
    pub speed: f64,
    pub power: f64,
    /// Raster resolution in DPI
    pub resolution: u32,
    pub cycles: u32,
}

impl Default for EngraveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 70.0,
            power: 50.0,
            resolution: 300,
            cycles: 1,
        }
    }
}

/// Cut process preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutSettings {
    pub speed: f64,
    pub power: f64,
    pub frequency: f64,
    pub cycles: u32,
}

impl Default for CutSettings {
    fn default() -> Self {
        Self {
            speed: 10.0,
            power: 90.0,
            frequency: 50.0,
            cycles: 1,
        }
    }
}

/// Defaults for new label canvases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasDefaults {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_mm: f64,
    pub corner_radius_mm: f64,
    pub grid_spacing_mm: f64,
    /// Units for lengths shown to the user
    #[serde(default)]
    pub measurement_system: MeasurementSystem,
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            width_mm: 100.0,
            height_mm: 50.0,
            margin_mm: 2.0,
            corner_radius_mm: 3.0,
            grid_spacing_mm: 1.0,
            measurement_system: MeasurementSystem::default(),
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Laser target
    #[serde(default)]
    pub laser: LaserSettings,
    /// Engrave preset
    #[serde(default)]
    pub engrave: EngraveSettings,
    /// Cut preset
    #[serde(default)]
    pub cut: CutSettings,
    /// Canvas defaults
    #[serde(default)]
    pub canvas: CanvasDefaults,
}

enum Format {
    Json,
    Toml,
}

fn format_for(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat {
            extension: other.unwrap_or("<none>").to_string(),
        }),
    }
}

fn check_range(key: &str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

fn check_positive(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location: `<config dir>/lamicoid/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or(SettingsError::NoConfigDirectory)?;
        path.push("lamicoid");
        path.push("config.toml");
        Ok(path)
    }

    /// Load from the default location, falling back to defaults when the file
    /// does not exist yet.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_for(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_for(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content)
            .map_err(|source| SettingsError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        self.laser.model()?;
        self.laser.ip()?;
        if self.laser.job_timeout_ms == 0 {
            return Err(ConfigError::OutOfRange {
                key: "laser.job_timeout_ms".to_string(),
                value: "0".to_string(),
            });
        }
        if self.laser.firmware_version.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "laser.firmware_version".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        check_range("engrave.speed", self.engrave.speed, 0.0, 100.0)?;
        check_range("engrave.power", self.engrave.power, 0.0, 100.0)?;
        check_range("engrave.cycles", f64::from(self.engrave.cycles), 1.0, 100.0)?;
        if self.engrave.resolution == 0 {
            return Err(ConfigError::OutOfRange {
                key: "engrave.resolution".to_string(),
                value: "0".to_string(),
            });
        }

        check_range("cut.speed", self.cut.speed, 0.0, 100.0)?;
        check_range("cut.power", self.cut.power, 0.0, 100.0)?;
        check_range("cut.frequency", self.cut.frequency, 1.0, 100.0)?;
        check_range("cut.cycles", f64::from(self.cut.cycles), 1.0, 100.0)?;

        check_positive("canvas.width_mm", self.canvas.width_mm)?;
        check_positive("canvas.height_mm", self.canvas.height_mm)?;
        check_positive("canvas.grid_spacing_mm", self.canvas.grid_spacing_mm)?;
        // Margin and radius may be zero; the canvas reduces oversized values.
        check_range("canvas.margin_mm", self.canvas.margin_mm, 0.0, f64::MAX)?;
        check_range(
            "canvas.corner_radius_mm",
            self.canvas.corner_radius_mm,
            0.0,
            f64::MAX,
        )?;

        Ok(())
    }
}
