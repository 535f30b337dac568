//! # Lamicoid Core
//!
//! Core types shared by every Lamicoid crate:
//! - Layered error types for the serializer, the native engine and the dispatcher
//! - Unit conversions between millimetres, editing pixels and typographic points
//! - The engraving device model catalogue and engine status codes

pub mod device;
pub mod error;
pub mod status;
pub mod units;

pub use device::DeviceModel;
pub use error::{DispatchError, EngineError, Error, Result, SerializeError};
pub use status::EngineStatus;
pub use units::{MeasurementSystem, DEFAULT_DPI, MM_PER_INCH, POINTS_PER_INCH};
