//! # Registrar Core
//!
//! Schema-based request validation and binding.
//!
//! - [`Schema`] and [`FieldConstraint`] declare what each field must look like
//! - [`BoundValues`] hold the raw values a binder located for a request
//! - [`validate`] turns bound values into a typed [`Entity`] or a list of [`Violation`]s
//! - [`project`] filters an entity through an outbound schema
//! - [`compose`] and [`flatten`] merge entities into one flat mapping
//! - [`Contract`] and [`Operation`] tie schemas to method and path
//! - [`ApiError`] is the error every request pipeline reports

#![doc(html_root_url = "https://docs.rs/registrar-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bound;
mod composer;
pub mod contract;
mod error;
mod failure;
mod path;
mod projector;
mod request_id;
mod schema;
mod validator;
mod value;

pub use bound::{BoundValue, BoundValues, RawValue};
pub use composer::{compose, flatten};
pub use contract::{Contract, Operation};
pub use error::{ApiError, ApiResult, ErrorCategory, ErrorDetail, ErrorEnvelope};
pub use failure::{ValidationErrors, Violation, ViolationKind};
pub use path::{Params, PathTemplate};
pub use projector::project;
pub use request_id::RequestId;
pub use schema::{Bound, EnumSet, FieldConstraint, FieldType, Requirement, Schema, SchemaError, Source};
pub use validator::{validate, validate_entity};
pub use value::{Entity, FileHandle, FileInfo, Value};
