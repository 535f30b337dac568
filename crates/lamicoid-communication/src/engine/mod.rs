//! Native print engine
//!
//! The engine turns a drawing and a settings document into a device print
//! file. [`PrintEngine`] is the raw call surface; [`JobDriver`] and
//! [`PrintJob`] sequence a job handle through its lifecycle and guarantee each
//! engine allocation is released exactly once.

pub mod driver;
pub mod ffi;
pub mod library;
pub mod progress;

pub use driver::{JobDriver, JobResult, JobState, PrintJob};
pub use library::{EpilogEngine, EpilogHandle, EpilogOutput};
pub use progress::{ProgressSnapshot, ProgressType};

use lamicoid_core::DeviceModel;
use std::ffi::CStr;

/// Raw engine operations.
///
/// `Handle` and `Output` are move-only tokens for engine allocations: the only
/// way to obtain one is from the engine, and releasing one consumes it, so a
/// released allocation cannot be reached again from safe code.
pub trait PrintEngine {
    /// A live job handle.
    type Handle;
    /// A result block returned by a run or result query.
    type Output;

    /// Allocate a job; `None` when the engine returned a null handle.
    fn new_job(&self, svg: &CStr, settings: &CStr, model: DeviceModel) -> Option<Self::Handle>;

    /// Release a job handle.
    fn free_job(&self, handle: Self::Handle) -> bool;

    /// Supply font bytes; `Err` carries the engine's message.
    fn add_font_data(&self, handle: &Self::Handle, data: &[u8]) -> Result<(), String>;

    /// Do one bounded unit of work; `true` while more work remains.
    fn run_chunk(&self, handle: &Self::Handle) -> bool;

    /// Do all remaining work.
    fn run_until_complete(&self, handle: &Self::Handle) -> Self::Output;

    fn request_abort(&self, handle: &Self::Handle) -> bool;

    fn progress(&self, handle: &Self::Handle) -> ProgressSnapshot;

    /// Result of a completed job.
    fn result(&self, handle: &Self::Handle) -> Self::Output;

    fn is_complete(&self, handle: &Self::Handle) -> bool;

    fn has_error(&self, handle: &Self::Handle) -> bool;

    fn was_aborted(&self, handle: &Self::Handle) -> bool;

    /// The job's current error message, `None` when empty.
    fn error_string(&self, handle: &Self::Handle) -> Option<String>;

    /// Copy of the print file bytes held by an output block.
    fn output_bytes(&self, output: &Self::Output) -> Vec<u8>;

    /// The output block's error message, `None` when empty.
    fn output_error(&self, output: &Self::Output) -> Option<String>;

    fn free_output(&self, output: Self::Output) -> bool;

    /// Transfer a print file to an engraver.
    fn send_file(&self, model: DeviceModel, data: &[u8], ip_address: &CStr) -> bool;

    fn api_version(&self) -> Option<String>;
}
