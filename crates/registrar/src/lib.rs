//! # Registrar
//!
//! Schema-driven request binding, validation and response projection.
//!
//! A service declares a [`Contract`](core::Contract): one operation per route,
//! each with an input schema naming where every field comes from (path, query,
//! header, cookie, JSON body, form or file upload) and an optional output
//! schema that filters what leaves the service. Handlers only ever see input
//! that passed validation.
//!
//! ## Quick Start
//!
//! ```rust
//! use registrar::prelude::*;
//! use http::{Method, Request};
//! use bytes::Bytes;
//!
//! # tokio_test::block_on(async {
//! let contract = Contract::builder("greeter")
//!     .operation(
//!         Operation::builder("greet")
//!             .method(Method::GET)
//!             .path("/greet/{name}")
//!             .input(
//!                 Schema::new("Greet")
//!                     .field(FieldConstraint::string("name").source(Source::Path).max_length(20)),
//!             )
//!             .build(),
//!     )
//!     .build();
//!
//! let service = Service::builder(contract)
//!     .handler("greet", |_ctx, input: Entity| async move {
//!         let name = input.get_str("name").unwrap_or_default().to_string();
//!         Ok(Value::from(format!("Hello, {name}!")))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let response = service
//!     .handle(Request::get("/greet/Ana").body(Bytes::new()).unwrap())
//!     .await;
//! assert_eq!(response.body().as_ref(), b"\"Hello, Ana!\"");
//! # });
//! ```
//!
//! ## Architecture
//!
//! Every request runs the same fixed pipeline:
//!
//! ```text
//! Request → RequestId → Resolve → Bind → Validate → Handler → Project → Response
//! ```
//!
//! Failures at any stage become a JSON error envelope carrying the request ID.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use registrar_config as config;
pub use registrar_core as core;
pub use registrar_extract as extract;
pub use registrar_telemetry as telemetry;

pub mod handler;
pub mod persons;
mod service;

pub use handler::{HandlerRegistry, RequestContext};
pub use service::{BuildError, Service, ServiceBuilder, REQUEST_ID_HEADER};

/// Installs the logging subscriber described by `config`.
///
/// # Errors
///
/// Returns [`TelemetryError`](telemetry::TelemetryError) if the level filter
/// is invalid or a global subscriber is already installed.
pub fn init_telemetry(config: &config::RegistrarConfig) -> telemetry::TelemetryResult<()> {
    telemetry::init_logging(&telemetry::LogConfig::from(&config.logging))
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use registrar::prelude::*;
/// ```
pub mod prelude {
    pub use crate::handler::RequestContext;
    pub use crate::service::{BuildError, Service};

    pub use registrar_core::{
        ApiError, Contract, Entity, EnumSet, FieldConstraint, FieldType, Operation, RequestId,
        Schema, Source, Value,
    };

    pub use registrar_extract::Limits;
}
