//! # Lamicoid
//!
//! Turns lamicoid label designs into Epilog laser jobs:
//! - Label geometry with grid snapping and margin containment
//! - SVG drawing and JSON settings generation, text converted to outlines
//! - Print file generation through the native Epilog engine
//! - Delivery of the print file to a networked engraver
//!
//! ## Architecture
//!
//! Lamicoid is organized as a workspace with multiple crates:
//!
//! 1. **lamicoid-core** - Error types, unit conversions, device models
//! 2. **lamicoid-designer** - Canvas, elements, templates, serializers
//! 3. **lamicoid-communication** - Engine bindings, job driver, dispatcher
//! 4. **lamicoid-settings** - Application configuration
//! 5. **lamicoid** - The pipeline and command-line binary

pub mod pipeline;

pub use lamicoid_communication as communication;
pub use lamicoid_designer as designer;
pub use lamicoid_settings as settings;

pub use lamicoid_core::{
    DeviceModel, DispatchError, EngineError, EngineStatus, Error, MeasurementSystem, Result,
    SerializeError,
};
pub use pipeline::{default_canvas, job_settings, stacked_label, LabelRow, Pipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Environment variable selecting the log format (`json` or `pretty`)
pub const LOG_FORMAT_ENV: &str = "LAMICOID_LOG_FORMAT";

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - RUST_LOG environment variable support, `info` by default
/// - Pretty console output, or JSON lines when `LAMICOID_LOG_FORMAT=json`
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_line_number(true)
            .pretty();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
