//! # Registrar Extract
//!
//! Reads raw field values out of an HTTP request.
//!
//! Each request source has its own extractor:
//!
//! | Extractor | Source | Description |
//! |-----------|--------|-------------|
//! | [`QueryParams`] | Query string | Decoded, possibly repeated pairs |
//! | [`JsonBody`] | Request body | Members of a JSON object |
//! | [`FormFields`] | Request body | URL-encoded form fields |
//! | [`Multipart`] | Request body | Text parts and uploaded files |
//! | [`Cookies`] | `Cookie` headers | Name/value pairs |
//!
//! Headers and path parameters are read straight from the
//! [`ExtractionContext`].
//!
//! [`bind`] drives all of them from a [`Schema`](registrar_core::Schema):
//! every field gets a [`BoundValue`](registrar_core::BoundValue) that is
//! either the raw value from its declared source or absent.
//!
//! ## Example
//!
//! ```rust
//! use registrar_core::{FieldConstraint, Schema, Source};
//! use registrar_extract::{bind, ExtractionContextBuilder};
//! use http::Method;
//!
//! # tokio_test::block_on(async {
//! let schema = Schema::new("Login")
//!     .field(FieldConstraint::string("username").source(Source::Form).max_length(20))
//!     .field(FieldConstraint::string("password").source(Source::Form));
//!
//! let ctx = ExtractionContextBuilder::new()
//!     .method(Method::POST)
//!     .header("content-type", "application/x-www-form-urlencoded")
//!     .body("username=alice&password=s3cret")
//!     .build();
//!
//! let bound = bind(&schema, &ctx).await.unwrap();
//! assert_eq!(bound.len(), 2);
//! # });
//! ```
//!
//! ## Error Handling
//!
//! A source that cannot be read at all produces an [`ExtractionError`]. The
//! binder turns it into a single structural violation, so malformed bodies
//! are reported once instead of once per field.

#![doc(html_root_url = "https://docs.rs/registrar-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod context;
mod cookie;
mod error;
mod extractor;
mod form;
mod json;
mod limits;
mod multipart;
mod query;

pub use binder::bind;
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use cookie::Cookies;
pub use error::ExtractionError;
pub use extractor::FromRequest;
pub use form::FormFields;
pub use json::JsonBody;
pub use limits::{
    Limits, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_MULTIPART_FIELDS,
    DEFAULT_MAX_MULTIPART_SIZE,
};
pub use multipart::{Field, Multipart, MultipartForm};
pub use query::QueryParams;
