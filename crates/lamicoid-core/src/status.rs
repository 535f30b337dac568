//! Engine status codes
//!
//! The discriminants match the print API's status enumeration, so a code can
//! be reported or compared across the C boundary as a plain integer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::os::raw::c_int;

/// Outcome class of an engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum EngineStatus {
    Success = 0,
    NullArgument = 1,
    /// The drawing could not be parsed
    InvalidDrawingData = 2,
    InitializationFailure = 3,
    RunFailure = 4,
    NotInitialized = 5,
    AlreadyCompleted = 6,
    NetworkSendFailure = 7,
    DeviceCommunicationFailure = 8,
    FileOpenFailure = 9,
    /// The settings document could not be parsed
    InvalidSettingsData = 10,
    BufferTooSmall = 11,
    Unknown = 12,
}

impl EngineStatus {
    pub const ALL: [EngineStatus; 13] = [
        Self::Success,
        Self::NullArgument,
        Self::InvalidDrawingData,
        Self::InitializationFailure,
        Self::RunFailure,
        Self::NotInitialized,
        Self::AlreadyCompleted,
        Self::NetworkSendFailure,
        Self::DeviceCommunicationFailure,
        Self::FileOpenFailure,
        Self::InvalidSettingsData,
        Self::BufferTooSmall,
        Self::Unknown,
    ];

    pub fn as_raw(self) -> c_int {
        self as c_int
    }

    /// Codes outside the enumeration read as [`EngineStatus::Unknown`].
    pub fn from_raw(raw: c_int) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_raw() == raw)
            .unwrap_or(Self::Unknown)
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NullArgument => "null argument",
            Self::InvalidDrawingData => "invalid drawing data",
            Self::InitializationFailure => "initialization failure",
            Self::RunFailure => "run failure",
            Self::NotInitialized => "not initialized",
            Self::AlreadyCompleted => "already completed",
            Self::NetworkSendFailure => "network send failure",
            Self::DeviceCommunicationFailure => "device communication failure",
            Self::FileOpenFailure => "file open failure",
            Self::InvalidSettingsData => "invalid settings data",
            Self::BufferTooSmall => "buffer too small",
            Self::Unknown => "unknown error",
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
