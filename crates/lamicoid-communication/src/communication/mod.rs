//! Transfer of finished print files to engravers.

pub mod dispatcher;

pub use dispatcher::NetworkDispatcher;
