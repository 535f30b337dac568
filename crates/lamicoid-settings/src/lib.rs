//! Lamicoid Settings Crate
//!
//! Handles application configuration: the laser target, the engrave and cut
//! process presets, and the defaults for new label canvases.

pub mod config;
pub mod error;

pub use config::{CanvasDefaults, Config, CutSettings, EngraveSettings, LaserSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
