//! Typed configuration for Registrar services.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (fails on unknown fields)
//! - Layered loading (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use registrar_config::ConfigLoader;
//!
//! # fn main() -> Result<(), registrar_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("registrar.toml")?
//!     .with_env_prefix("REGISTRAR")
//!     .load()?;
//!
//! println!("max body size: {}", config.limits.max_body_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [service]
//! name = "persons"
//! environment = "production"
//!
//! [limits]
//! max_body_size = 1048576
//! max_file_size = 10485760
//! max_multipart_size = 52428800
//! max_multipart_fields = 100
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `REGISTRAR__SERVICE__NAME=persons`
//! - `REGISTRAR__LIMITS__MAX_FILE_SIZE=2097152`
//! - `REGISTRAR__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::RegistrarConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LimitsConfig, LogFormat, LoggingConfig, ServiceConfig};
