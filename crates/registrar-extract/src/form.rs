//! URL-encoded form extractor.

use crate::{ExtractionContext, ExtractionError, FromRequest};
use registrar_core::Source;

/// Fields of an `application/x-www-form-urlencoded` body.
///
/// An empty body yields no fields.
///
/// # Example
///
/// ```rust
/// use registrar_extract::{FormFields, FromRequest, ExtractionContextBuilder};
///
/// let ctx = ExtractionContextBuilder::new()
///     .header("content-type", "application/x-www-form-urlencoded")
///     .body("username=alice&password=hello+world")
///     .build();
///
/// let form = FormFields::from_request(&ctx).unwrap();
/// assert_eq!(form.get("username"), Some("alice"));
/// assert_eq!(form.get("password"), Some("hello world"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    /// Creates form fields from already decoded pairs.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Returns the last value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of fields, counting repeats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if the form had no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromRequest for FormFields {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let body = ctx.body();
        let limit = ctx.limits().max_body_size;

        if body.len() > limit {
            return Err(ExtractionError::payload_too_large(Source::Form, limit, body.len()));
        }
        if body.is_empty() {
            return Ok(Self::default());
        }

        let body_str = std::str::from_utf8(body).map_err(|e| {
            ExtractionError::deserialization_failed(Source::Form, format!("invalid UTF-8: {e}"))
        })?;

        serde_urlencoded::from_str::<Vec<(String, String)>>(body_str)
            .map(Self::from_pairs)
            .map_err(|e| ExtractionError::deserialization_failed(Source::Form, e.to_string()))
    }
}
