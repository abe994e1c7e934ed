//! Shared types for the ticket dispatcher
//!
//! Holds the ticket snapshot model, the shared error type and the logging
//! plumbing (tracing setup and rotating log files) used by the dispatcher
//! library and binary.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
