//! Validation failure records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::Source;

/// Classification of a single violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The payload could not be parsed at all.
    Malformed,
    /// A required field was not supplied.
    Missing,
    /// The value could not be coerced to the declared type.
    TypeMismatch,
    /// A numeric value fell outside its bounds.
    OutOfRange,
    /// A string was shorter or longer than allowed.
    LengthViolation,
    /// A string did not match its declared format.
    InvalidFormat,
    /// A string was not one of the enumerated literals.
    InvalidEnumeration,
}

impl ViolationKind {
    /// Machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Missing => "missing",
            Self::TypeMismatch => "type_mismatch",
            Self::OutOfRange => "out_of_range",
            Self::LengthViolation => "length_violation",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidEnumeration => "invalid_enumeration",
        }
    }

    /// Returns true for failures that abort binding of every other field.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::Malformed)
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted field path, e.g. `person.age` or `images[1]`.
    pub path: String,
    /// What went wrong.
    pub kind: ViolationKind,
    /// The violated constraint, e.g. `gt=0` or `min_length=20`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// The offending raw value; withheld for secret fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Where the field was read from.
    pub source: Source,
}

impl Violation {
    /// Creates a violation without constraint or value.
    pub fn new(
        path: impl Into<String>,
        kind: ViolationKind,
        source: Source,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            constraint: None,
            message: message.into(),
            value: None,
            source,
        }
    }

    /// A required field is absent.
    pub fn missing(path: impl Into<String>, source: Source) -> Self {
        Self::new(path, ViolationKind::Missing, source, "field required")
    }

    /// The whole payload of a source is unusable.
    pub fn malformed(source: Source, message: impl Into<String>) -> Self {
        Self::new(source.to_string(), ViolationKind::Malformed, source, message)
    }

    /// Attaches the violated constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Attaches the offending raw value.
    #[must_use]
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.source, self.message)
    }
}

/// An ordered collection of violations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.as_slice() {
            [] => write!(f, "no violations"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding exactly one structural violation.
    #[must_use]
    pub fn structural(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// Appends a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Appends every violation of another collection.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if no violation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Iterates violations in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Looks up the violation recorded for a field path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.path == path)
    }

    /// Consumes the collection, returning `Err(self)` if it is non-empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl From<Violation> for ValidationErrors {
    fn from(violation: Violation) -> Self {
        Self::structural(violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_serialization() {
        let v = Violation::new("age", ViolationKind::OutOfRange, Source::Body, "must be > 0")
            .with_constraint("gt=0")
            .with_value(serde_json::json!(0));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["path"], "age");
        assert_eq!(json["kind"], "out_of_range");
        assert_eq!(json["constraint"], "gt=0");
        assert_eq!(json["value"], 0);
        assert_eq!(json["source"], "body");
    }

    #[test]
    fn test_missing_omits_optional_keys() {
        let json = serde_json::to_value(Violation::missing("age", Source::Query)).unwrap();
        assert!(json.get("constraint").is_none());
        assert!(json.get("value").is_none());
        assert_eq!(json["message"], "field required");
    }

    #[test]
    fn test_collection_display_and_lookup() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.push(Violation::missing("first_name", Source::Body));
        errors.push(Violation::missing("age", Source::Body));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.find("age").unwrap().kind, ViolationKind::Missing);
        assert!(errors.to_string().contains("and 1 more"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_structural() {
        let errors = ValidationErrors::structural(Violation::malformed(
            Source::Body,
            "body is not valid JSON",
        ));
        let only = errors.iter().next().unwrap();
        assert!(only.kind.is_structural());
        assert_eq!(only.path, "body");
    }
}
