//! Extraction error types.
//!
//! An [`ExtractionError`] means a transport payload could not be read at
//! all: the JSON body does not parse, the multipart boundary is missing, a
//! size limit was exceeded. These are structural failures; they abort
//! binding before any field is validated.

use http::StatusCode;
use registrar_core::{Source, Violation, ViolationKind};
use std::fmt;

/// Error that occurs during extraction.
///
/// # Example
///
/// ```rust
/// use registrar_extract::ExtractionError;
/// use registrar_core::Source;
/// use http::StatusCode;
///
/// let err = ExtractionError::deserialization_failed(Source::Body, "expected value at line 1");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.source(), Source::Body);
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    source: Source,
    kind: ExtractionErrorKind,
    field: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// A value the route guarantees was not there
    Missing,
    /// Payload has the wrong shape
    InvalidType,
    /// Payload could not be parsed
    DeserializationFailed,
    /// Payload exceeds a size limit
    PayloadTooLarge,
    /// Too many multipart parts
    TooManyFields,
    /// Content-Type is missing or unusable
    UnsupportedMediaType,
}

impl ExtractionError {
    /// A value that should always be present was not.
    #[must_use]
    pub fn missing(source: Source, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            source,
            kind: ExtractionErrorKind::Missing,
            message: format!("missing required {source} parameter: {field}"),
            field: Some(field),
        }
    }

    /// The payload parsed but has the wrong shape.
    #[must_use]
    pub fn invalid_type(source: Source, details: impl Into<String>) -> Self {
        Self {
            source,
            kind: ExtractionErrorKind::InvalidType,
            message: details.into(),
            field: None,
        }
    }

    /// The payload could not be parsed.
    #[must_use]
    pub fn deserialization_failed(source: Source, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            source,
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("failed to parse {source}: {error}"),
            field: None,
        }
    }

    /// The payload, or one part of it, is larger than allowed.
    #[must_use]
    pub fn payload_too_large(source: Source, max_size: usize, actual_size: usize) -> Self {
        Self {
            source,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
            field: None,
        }
    }

    /// A multipart body has more parts than allowed.
    #[must_use]
    pub fn too_many_fields(source: Source, max_fields: usize) -> Self {
        Self {
            source,
            kind: ExtractionErrorKind::TooManyFields,
            message: format!("too many multipart fields (max {max_fields})"),
            field: None,
        }
    }

    /// The Content-Type header is missing or cannot be used.
    #[must_use]
    pub fn unsupported_media_type(source: Source, expected: &str, actual: Option<&str>) -> Self {
        let actual = actual.unwrap_or("none");
        Self {
            source,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!("unsupported content type: expected '{expected}', got '{actual}'"),
            field: None,
        }
    }

    /// Returns where extraction failed.
    #[must_use]
    pub fn source(&self) -> Source {
        self.source
    }

    /// Returns the field name if applicable.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status this error would carry on its own.
    ///
    /// Inside a request pipeline every extraction error is folded into the
    /// validation envelope; this status is for callers using extractors
    /// directly.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Missing
            | ExtractionErrorKind::InvalidType
            | ExtractionErrorKind::DeserializationFailed
            | ExtractionErrorKind::TooManyFields => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Missing => "MISSING_PARAMETER",
            ExtractionErrorKind::InvalidType => "INVALID_PAYLOAD",
            ExtractionErrorKind::DeserializationFailed => "DESERIALIZATION_FAILED",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::TooManyFields => "TOO_MANY_FIELDS",
            ExtractionErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<ExtractionError> for Violation {
    fn from(err: ExtractionError) -> Self {
        let path = match &err.field {
            Some(field) => format!("{}.{field}", err.source),
            None => err.source.to_string(),
        };
        let code = err.error_code().to_ascii_lowercase();
        Violation::new(path, ViolationKind::Malformed, err.source, err.message).with_constraint(code)
    }
}
