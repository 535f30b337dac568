//! # Lamicoid Communication
//!
//! Bindings for the Epilog print engine, the job driver that sequences an
//! engine handle from creation to release, and the network dispatcher that
//! delivers finished print files to an engraver.

pub mod communication;
pub mod engine;

pub use communication::NetworkDispatcher;
pub use engine::{
    EpilogEngine, JobDriver, JobResult, JobState, PrintEngine, PrintJob, ProgressSnapshot,
    ProgressType,
};
