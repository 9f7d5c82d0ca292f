//! Tagsmith library surface.
//!
//! The command modules are exposed so that integration tests can drive
//! them with injected output sinks instead of capturing the process
//! streams.

pub mod cli;
