//! Error types for Registrar.
//!
//! [`ApiError`] is what a request pipeline returns instead of a payload. Each
//! variant belongs to an [`ErrorCategory`], maps to one HTTP status, and
//! renders as an [`ErrorEnvelope`].

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::failure::ValidationErrors;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request did not satisfy its operation's schema.
    Validation,
    /// No such route, or the business action rejected the addressed entity.
    NotFound,
    /// The route exists but not for this method.
    MethodNotAllowed,
    /// Anything else.
    Internal,
}

impl ErrorCategory {
    /// Returns the HTTP status code for this category.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Registrar.
///
/// # Example
///
/// ```
/// use registrar_core::{ApiError, ErrorCategory};
///
/// let error = ApiError::not_found("¡This person doesn't exist!");
/// assert_eq!(error.category(), ErrorCategory::NotFound);
/// assert_eq!(error.status_code().as_u16(), 404);
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// One or more fields failed validation.
    #[error("request validation failed: {errors}")]
    Validation {
        /// Every violation found.
        #[source]
        errors: ValidationErrors,
    },

    /// Unknown route, or a domain rejection by the business action.
    #[error("{message}")]
    NotFound {
        /// Human-readable message, returned to the client as is.
        message: String,
    },

    /// The path matched but the method did not.
    #[error("method {method} not allowed")]
    MethodNotAllowed {
        /// The requested method.
        method: Method,
        /// Methods the path does accept.
        allowed: Vec<Method>,
    },

    /// Internal error.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApiError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation { errors }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a method-not-allowed error.
    #[must_use]
    pub fn method_not_allowed(method: Method, allowed: Vec<Method>) -> Self {
        Self::MethodNotAllowed { method, allowed }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }

    /// The violations, for a validation error.
    #[must_use]
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let message = match self {
            Self::Internal { message, .. } => message.clone(),
            Self::Validation { errors } => format!(
                "request validation failed with {} violation{}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ),
            other => other.to_string(),
        };
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
                category: self.category(),
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation { errors } => serde_json::to_value(errors).ok(),
            Self::MethodNotAllowed { allowed, .. } => Some(serde_json::json!({
                "allowed": allowed.iter().map(Method::as_str).collect::<Vec<_>>()
            })),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Per-field violations, or other structured context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Violation;
    use crate::schema::Source;

    #[test]
    fn test_validation_envelope() {
        let mut errors = ValidationErrors::new();
        errors.push(Violation::missing("age", Source::Query));
        let error = ApiError::from(errors);

        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let envelope = error.to_envelope(Some("req-123"));
        assert_eq!(envelope.error.code, "VALIDATION_ERROR");
        assert_eq!(envelope.error.message, "request validation failed with 1 violation");

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["error"]["category"], "validation");
        assert_eq!(json["error"]["details"][0]["path"], "age");
        assert_eq!(json["error"]["details"][0]["kind"], "missing");
        assert_eq!(json["request_id"], "req-123");
    }

    #[test]
    fn test_not_found_message_is_verbatim() {
        let envelope = ApiError::not_found("¡This person doesn't exist!").to_envelope(None);
        assert_eq!(envelope.error.message, "¡This person doesn't exist!");
        assert!(envelope.error.details.is_none());

        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(!json.contains("request_id"));
    }

    #[test]
    fn test_method_not_allowed() {
        let error = ApiError::method_not_allowed(Method::DELETE, vec![Method::GET, Method::PUT]);
        assert_eq!(error.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        let details = error.to_envelope(None).error.details.unwrap();
        assert_eq!(details["allowed"], serde_json::json!(["GET", "PUT"]));
    }

    #[test]
    fn test_internal_hides_source() {
        let error = ApiError::internal_with_source("handler failed", anyhow::anyhow!("db down"));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.message, "handler failed");
        assert!(!serde_json::to_string(&envelope).unwrap().contains("db down"));
    }

    #[test]
    fn test_all_categories_map_to_error_statuses() {
        for category in [
            ErrorCategory::Validation,
            ErrorCategory::NotFound,
            ErrorCategory::MethodNotAllowed,
            ErrorCategory::Internal,
        ] {
            let status = category.status_code();
            assert!(status.is_client_error() || status.is_server_error());
        }
    }
}
