//! JSON body extractor.

use crate::{ExtractionContext, ExtractionError, FromRequest};
use registrar_core::Source;

/// Members of a JSON object body.
///
/// The body is parsed once. An empty body has no members, so every body
/// field reads as absent. A body that is not JSON, or is JSON but not an
/// object, is rejected as a whole.
///
/// # Example
///
/// ```rust
/// use registrar_extract::{JsonBody, FromRequest, ExtractionContextBuilder};
///
/// let ctx = ExtractionContextBuilder::new()
///     .header("content-type", "application/json")
///     .body(r#"{"first_name": "Miguel", "age": 25}"#)
///     .build();
///
/// let mut body = JsonBody::from_request(&ctx).unwrap();
/// assert_eq!(body.take("age"), Some(serde_json::json!(25)));
/// assert_eq!(body.take("age"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonBody {
    members: serde_json::Map<String, serde_json::Value>,
}

impl JsonBody {
    /// Removes and returns a member.
    pub fn take(&mut self, name: &str) -> Option<serde_json::Value> {
        self.members.remove(name)
    }

    /// Returns true if the body had no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromRequest for JsonBody {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let body = ctx.body();
        let limit = ctx.limits().max_body_size;

        if body.len() > limit {
            return Err(ExtractionError::payload_too_large(Source::Body, limit, body.len()));
        }
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(members)) => Ok(Self { members }),
            Ok(other) => Err(ExtractionError::invalid_type(
                Source::Body,
                format!("request body must be a JSON object, got {}", json_type_name(&other)),
            )),
            Err(e) => Err(ExtractionError::deserialization_failed(Source::Body, e.to_string())),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
