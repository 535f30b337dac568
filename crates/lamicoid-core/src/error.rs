//! Error handling for Lamicoid
//!
//! Provides error types for every stage of the label pipeline:
//! - Serialize errors (drawing and settings generation)
//! - Engine errors (native print file generation)
//! - Dispatch errors (transfer to the engraver)
//!
//! Placement in the geometry model never fails, so there is no geometry error kind.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::status::EngineStatus;

/// Serializer error type
///
/// Raised while turning a label design into its drawing or settings document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializeError {
    /// No usable font face could be resolved
    #[error("Font unavailable: {family}")]
    FontUnavailable {
        /// The requested font family.
        family: String,
    },

    /// The job name is empty
    #[error("Job name must not be empty")]
    EmptyJobName,

    /// The process list is empty
    #[error("Process list is empty")]
    NoProcesses,

    /// The process list has no process cutting the outline
    #[error("Process list has no cut process")]
    MissingCutProcess,

    /// A process parameter is out of range
    #[error("Process '{process}': {parameter} = {value} is out of range {min}..={max}")]
    ParameterOutOfRange {
        /// The process name.
        process: String,
        /// The parameter name.
        parameter: &'static str,
        /// The offending value.
        value: f64,
        /// Smallest accepted value.
        min: f64,
        /// Largest accepted value.
        max: f64,
    },

    /// A process filter selects nothing
    #[error("Process '{process}' has an empty color filter")]
    EmptyFilter {
        /// The process name.
        process: String,
    },

    /// Encoding the settings document failed
    #[error("Failed to encode settings: {reason}")]
    Encoding {
        /// The encoder message.
        reason: String,
    },
}

/// Native engine error type
///
/// Represents failures of the print file generation engine and of the
/// driver's own lifecycle checks around the job handle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The shared library could not be loaded
    #[error("Failed to load engine library {path}: {reason}")]
    LibraryLoad {
        /// The library path or name tried.
        path: String,
        /// The loader message.
        reason: String,
    },

    /// A required symbol is missing from the library
    #[error("Engine symbol '{symbol}' not found: {reason}")]
    MissingSymbol {
        /// The symbol name.
        symbol: String,
        /// The loader message.
        reason: String,
    },

    /// An argument contained an interior NUL byte
    #[error("Invalid argument '{argument}': contains a NUL byte")]
    InvalidArgument {
        /// The argument name.
        argument: &'static str,
    },

    /// The engine refused to create a job
    #[error("Job creation failed: {message}")]
    Creation {
        /// The engine's error string, or a description when none was given.
        message: String,
    },

    /// The engine rejected supplementary font data
    #[error("Font data rejected: {message}")]
    FontData {
        /// The engine's error string.
        message: String,
    },

    /// The engine reported an error while generating the print file
    #[error("{message}")]
    Generation {
        /// The engine's error string, verbatim.
        message: String,
    },

    /// The job was aborted before completion
    #[error("Job was aborted")]
    Aborted,

    /// The job did not finish within the allowed time
    #[error("Job timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The result was requested before the job completed
    #[error("Job result requested before completion")]
    NotComplete,

    /// The job already reached a terminal state
    #[error("Job already finished in state {state}")]
    AlreadyFinished {
        /// The terminal state name.
        state: String,
    },

    /// Chunked and blocking execution were mixed on one handle
    #[error("Cannot {requested}: job is already executing in {current} mode")]
    MixedExecution {
        /// The execution mode already in use.
        current: &'static str,
        /// The operation that was refused.
        requested: &'static str,
    },
}

impl EngineError {
    /// Status code the print API reports for this failure
    pub fn status(&self) -> EngineStatus {
        match self {
            EngineError::LibraryLoad { .. } => EngineStatus::FileOpenFailure,
            EngineError::MissingSymbol { .. } | EngineError::Creation { .. } => {
                EngineStatus::InitializationFailure
            }
            EngineError::InvalidArgument { .. } => EngineStatus::NullArgument,
            EngineError::FontData { .. }
            | EngineError::Generation { .. }
            | EngineError::Aborted
            | EngineError::Timeout { .. }
            | EngineError::MixedExecution { .. } => EngineStatus::RunFailure,
            EngineError::NotComplete => EngineStatus::NotInitialized,
            EngineError::AlreadyFinished { .. } => EngineStatus::AlreadyCompleted,
        }
    }
}

/// Dispatch error type
///
/// Represents failures sending a finished print file to an engraver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The address is not a valid IP address
    #[error("Invalid IP address: {address}")]
    InvalidAddress {
        /// The rejected address.
        address: String,
    },

    /// There is nothing to send
    #[error("Print file is empty")]
    EmptyPayload,

    /// The engine reported the transfer as failed
    #[error("Transfer to {model} at {address} failed")]
    TransferFailed {
        /// The device model name.
        model: String,
        /// The device address.
        address: String,
    },
}

impl DispatchError {
    pub fn status(&self) -> EngineStatus {
        match self {
            DispatchError::InvalidAddress { .. } => EngineStatus::DeviceCommunicationFailure,
            DispatchError::EmptyPayload => EngineStatus::NullArgument,
            DispatchError::TransferFailed { .. } => EngineStatus::NetworkSendFailure,
        }
    }
}

/// Main error type for Lamicoid
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Serializer error
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Dispatch error
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Engine(EngineError::Timeout { .. }))
    }

    /// Check if the job was aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Engine(EngineError::Aborted))
    }

    /// Check if this is an engine error
    pub fn is_engine_error(&self) -> bool {
        matches!(self, Error::Engine(_))
    }

    /// Check if this is a dispatch error
    pub fn is_dispatch_error(&self) -> bool {
        matches!(self, Error::Dispatch(_))
    }

    /// Engine status code for this error; serializer failures map to the
    /// document they were producing.
    pub fn status(&self) -> EngineStatus {
        match self {
            Error::Serialize(SerializeError::FontUnavailable { .. }) => {
                EngineStatus::InvalidDrawingData
            }
            Error::Serialize(_) => EngineStatus::InvalidSettingsData,
            Error::Engine(err) => err.status(),
            Error::Dispatch(err) => err.status(),
            Error::Io(_) => EngineStatus::FileOpenFailure,
            Error::Other(_) => EngineStatus::Unknown,
        }
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
