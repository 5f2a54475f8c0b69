//! Logging utilities.
//!
//! The engine only talks to the `log` facade; this module wires up
//! `env_logger` for binaries that do not bring their own backend.

mod init;

pub use init::{init_logging, LoggingConfig};
