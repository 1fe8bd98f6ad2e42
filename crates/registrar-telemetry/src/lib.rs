//! Logging setup for Registrar services.
//!
//! Registrar logs through `tracing`. This crate installs the subscriber,
//! names the standard fields, and provides macros for the request lifecycle
//! events every service emits:
//!
//! | Macro | Level | When |
//! |-------|-------|------|
//! | [`log_request_start!`] | info | route resolved |
//! | [`log_request_complete!`] | info | handler succeeded |
//! | [`log_request_rejected!`] | warn | validation failure or domain rejection |
//! | [`log_request_error!`] | error | internal error |
//!
//! # Example
//!
//! ```rust,ignore
//! use registrar_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
