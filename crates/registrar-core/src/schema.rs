//! Schema and field constraint declarations.
//!
//! A [`Schema`] is an ordered set of [`FieldConstraint`]s. Each constraint
//! names one field, its declared [`FieldType`], where the raw value comes from
//! ([`Source`]), whether it is required, and the bounds it must satisfy.
//!
//! # Example
//!
//! ```
//! use registrar_core::{EnumSet, FieldConstraint, Schema};
//!
//! let hair_color = EnumSet::new("HairColor", ["white", "brown", "black", "blonde", "red"]);
//!
//! let person = Schema::new("PersonBase")
//!     .field(FieldConstraint::string("first_name").min_length(1).max_length(50))
//!     .field(FieldConstraint::integer("age").gt(0).le(115))
//!     .field(FieldConstraint::enumeration("hair_color", hair_color).optional());
//!
//! let with_password = Schema::extend("Person", &person)
//!     .field(FieldConstraint::string("password").min_length(8).secret());
//!
//! assert_eq!(person.len(), 3);
//! assert_eq!(with_password.len(), 4);
//! assert!(person.check_projection_of(&with_password).is_ok());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::value::Value;

/// Transport location a field's raw value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Named segment of the path template.
    Path,
    /// URL query string.
    Query,
    /// JSON request body.
    Body,
    /// URL-encoded or multipart form field.
    Form,
    /// Request header.
    Header,
    /// Cookie from the `Cookie` header.
    Cookie,
    /// Uploaded file part of a multipart body.
    File,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
            Self::Form => write!(f, "form"),
            Self::Header => write!(f, "header"),
            Self::Cookie => write!(f, "cookie"),
            Self::File => write!(f, "file"),
        }
    }
}

/// A closed, named set of permissible string literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSet {
    name: String,
    variants: Vec<String>,
}

impl EnumSet {
    /// Creates an enumerated type.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// The type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The permitted literals in declaration order.
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Exact, case-sensitive membership.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.variants.iter().any(|v| v == value)
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Any string.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Boolean.
    Boolean,
    /// String holding an email address.
    Email,
    /// One literal out of an enumerated set.
    Enum(EnumSet),
    /// Nested object validated against its own schema.
    Object(Schema),
    /// List of items of the inner type.
    List(Box<FieldType>),
    /// Uploaded file.
    File,
}

impl FieldType {
    /// Human-readable type name used in failure messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Email => "email".to_string(),
            Self::Enum(set) => set.name().to_string(),
            Self::Object(schema) => schema.name().to_string(),
            Self::List(item) => format!("list[{}]", item.type_name()),
            Self::File => "file".to_string(),
        }
    }

    /// Returns true for string-like types that carry length bounds.
    #[must_use]
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::Email | Self::Enum(_))
    }
}

/// Whether a field must be supplied, and what it takes when it is not.
///
/// A required field has no default; an optional field always has one.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    /// The field must be supplied.
    Required,
    /// The field may be omitted; `default` is used in its place.
    Optional {
        /// Value substituted when the source omits the field.
        default: Value,
    },
}

/// One side of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The bound value itself is allowed.
    Inclusive(i64),
    /// The bound value itself is rejected.
    Exclusive(i64),
}

impl Bound {
    pub(crate) fn admits_lower(self, n: i64) -> bool {
        match self {
            Self::Inclusive(b) => n >= b,
            Self::Exclusive(b) => n > b,
        }
    }

    pub(crate) fn admits_upper(self, n: i64) -> bool {
        match self {
            Self::Inclusive(b) => n <= b,
            Self::Exclusive(b) => n < b,
        }
    }

    pub(crate) fn lower_label(self) -> String {
        match self {
            Self::Inclusive(b) => format!("ge={b}"),
            Self::Exclusive(b) => format!("gt={b}"),
        }
    }

    pub(crate) fn upper_label(self) -> String {
        match self {
            Self::Inclusive(b) => format!("le={b}"),
            Self::Exclusive(b) => format!("lt={b}"),
        }
    }
}

/// The validation rule set for one named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConstraint {
    name: String,
    field_type: FieldType,
    source: Source,
    requirement: Requirement,
    lower: Option<Bound>,
    upper: Option<Bound>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    alias: Option<String>,
    title: Option<String>,
    description: Option<String>,
    example: Option<serde_json::Value>,
    secret: bool,
}

impl FieldConstraint {
    /// Creates a required field of the given type, read from the body.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            source: Source::Body,
            requirement: Requirement::Required,
            lower: None,
            upper: None,
            min_length: None,
            max_length: None,
            alias: None,
            title: None,
            description: None,
            example: None,
            secret: false,
        }
    }

    /// Creates a required string field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Creates a required integer field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    /// Creates a required boolean field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Creates a required email field.
    pub fn email(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Email)
    }

    /// Creates a required enumerated field.
    pub fn enumeration(name: impl Into<String>, set: EnumSet) -> Self {
        Self::new(name, FieldType::Enum(set))
    }

    /// Creates a required nested object field.
    pub fn object(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, FieldType::Object(schema))
    }

    /// Creates a required list field.
    pub fn list(name: impl Into<String>, item: FieldType) -> Self {
        Self::new(name, FieldType::List(Box::new(item)))
    }

    /// Creates a required single-file field.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::File).source(Source::File)
    }

    /// Creates a required list-of-files field. Zero files is a valid list.
    pub fn files(name: impl Into<String>) -> Self {
        Self::list(name, FieldType::File).source(Source::File)
    }

    /// Sets the transport source.
    #[must_use]
    pub fn source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    /// Makes the field optional with a null default.
    #[must_use]
    pub fn optional(self) -> Self {
        self.default(Value::Null)
    }

    /// Makes the field optional with the given default.
    #[must_use]
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.requirement = Requirement::Optional {
            default: default.into(),
        };
        self
    }

    /// Makes the field required, dropping any default.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Required;
        self
    }

    /// Exclusive lower bound.
    #[must_use]
    pub fn gt(mut self, bound: i64) -> Self {
        self.lower = Some(Bound::Exclusive(bound));
        self
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn ge(mut self, bound: i64) -> Self {
        self.lower = Some(Bound::Inclusive(bound));
        self
    }

    /// Exclusive upper bound.
    #[must_use]
    pub fn lt(mut self, bound: i64) -> Self {
        self.upper = Some(Bound::Exclusive(bound));
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn le(mut self, bound: i64) -> Self {
        self.upper = Some(Bound::Inclusive(bound));
        self
    }

    /// Minimum length in characters, inclusive.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Maximum length in characters, inclusive.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Sets the external name used to look the value up in its source.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Documentation title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Documentation description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Documentation example. Never consulted by the validator.
    #[must_use]
    pub fn example(mut self, example: impl Into<serde_json::Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Marks the value as secret: failures never echo it back.
    #[must_use]
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Where the raw value is read from.
    #[must_use]
    pub fn location(&self) -> Source {
        self.source
    }

    /// Required or optional-with-default.
    #[must_use]
    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Returns true if the field must be supplied.
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self.requirement, Requirement::Required)
    }

    /// The default, if the field is optional.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        match &self.requirement {
            Requirement::Required => None,
            Requirement::Optional { default } => Some(default),
        }
    }

    /// Lower numeric bound.
    #[must_use]
    pub fn lower_bound(&self) -> Option<Bound> {
        self.lower
    }

    /// Upper numeric bound.
    #[must_use]
    pub fn upper_bound(&self) -> Option<Bound> {
        self.upper
    }

    /// Minimum length, if declared.
    #[must_use]
    pub fn min_len(&self) -> Option<usize> {
        self.min_length
    }

    /// Maximum length, if declared.
    #[must_use]
    pub fn max_len(&self) -> Option<usize> {
        self.max_length
    }

    /// Returns true if the field is marked secret.
    #[must_use]
    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// The documentation example, if any.
    #[must_use]
    pub fn example_value(&self) -> Option<&serde_json::Value> {
        self.example.as_ref()
    }

    /// The name the value carries in its transport source.
    ///
    /// Headers default to the field name with underscores turned into hyphens,
    /// so `user_agent` is read from `user-agent`.
    #[must_use]
    pub fn external_name(&self) -> String {
        match (&self.alias, self.source) {
            (Some(alias), _) => alias.clone(),
            (None, Source::Header) => self.name.replace('_', "-"),
            (None, _) => self.name.clone(),
        }
    }

    /// Documentation for this field as a JSON Schema fragment.
    #[must_use]
    pub fn describe(&self) -> serde_json::Value {
        let mut doc = match &self.field_type {
            FieldType::String => serde_json::json!({"type": "string"}),
            FieldType::Integer => serde_json::json!({"type": "integer"}),
            FieldType::Boolean => serde_json::json!({"type": "boolean"}),
            FieldType::Email => serde_json::json!({"type": "string", "format": "email"}),
            FieldType::Enum(set) => {
                serde_json::json!({"title": set.name(), "enum": set.variants()})
            }
            FieldType::Object(schema) => schema.describe(),
            FieldType::List(item) => {
                let items = Self::new("item", (**item).clone()).describe();
                serde_json::json!({"type": "array", "items": items})
            }
            FieldType::File => serde_json::json!({"type": "string", "format": "binary"}),
        };

        if let Some(obj) = doc.as_object_mut() {
            let mut set = |key: &str, value: Option<serde_json::Value>| {
                if let Some(value) = value {
                    obj.insert(key.to_string(), value);
                }
            };
            set("title", self.title.clone().map(Into::into));
            set("description", self.description.clone().map(Into::into));
            set("minLength", self.min_length.map(Into::into));
            set("maxLength", self.max_length.map(Into::into));
            match self.lower {
                Some(Bound::Inclusive(b)) => set("minimum", Some(b.into())),
                Some(Bound::Exclusive(b)) => set("exclusiveMinimum", Some(b.into())),
                None => {}
            }
            match self.upper {
                Some(Bound::Inclusive(b)) => set("maximum", Some(b.into())),
                Some(Bound::Exclusive(b)) => set("exclusiveMaximum", Some(b.into())),
                None => {}
            }
            if let Requirement::Optional { default } = &self.requirement {
                set("default", Some(default.to_json()));
            }
            set("example", self.example.clone());
        }
        doc
    }
}

/// Errors raised when schemas are declared inconsistently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The outbound schema names a field the inbound schema lacks.
    #[error("schema '{outbound}' declares field '{field}' absent from '{inbound}'")]
    NotASubset {
        /// Outbound schema name.
        outbound: String,
        /// Inbound schema name.
        inbound: String,
        /// Offending field.
        field: String,
    },

    /// The outbound schema exposes a field marked secret on the inbound schema.
    #[error("schema '{outbound}' exposes secret field '{field}'")]
    SecretExposed {
        /// Outbound schema name.
        outbound: String,
        /// Offending field.
        field: String,
    },
}

/// An ordered declaration of named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    name: String,
    fields: IndexMap<String, FieldConstraint>,
    example: Option<serde_json::Value>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            example: None,
        }
    }

    /// Creates a schema inheriting every field of `base`.
    ///
    /// Fields added afterwards are appended; a field re-declared under an
    /// inherited name replaces it in place.
    pub fn extend(name: impl Into<String>, base: &Schema) -> Self {
        Self {
            name: name.into(),
            fields: base.fields.clone(),
            example: None,
        }
    }

    /// Adds or replaces a field.
    #[must_use]
    pub fn field(mut self, field: FieldConstraint) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Sets a schema-level documentation example.
    #[must_use]
    pub fn example(mut self, example: serde_json::Value) -> Self {
        self.example = Some(example);
        self
    }

    /// Retags every field with the given source.
    #[must_use]
    pub fn from_source(mut self, source: Source) -> Self {
        for field in self.fields.values_mut() {
            field.source = source;
        }
        self
    }

    /// The schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks a field up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldConstraint> {
        self.fields.get(name)
    }

    /// Iterates fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldConstraint> {
        self.fields.values()
    }

    /// Iterates field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns true if the schema declares this field.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if any field is read from the given source.
    #[must_use]
    pub fn reads_from(&self, source: Source) -> bool {
        self.fields.values().any(|f| f.source == source)
    }

    /// Checks that this schema can serve as the outbound projection of `inbound`.
    ///
    /// Every field must exist on `inbound`, and no field marked secret there
    /// may be exposed.
    pub fn check_projection_of(&self, inbound: &Schema) -> Result<(), SchemaError> {
        for name in self.fields.keys() {
            match inbound.get(name) {
                None => {
                    return Err(SchemaError::NotASubset {
                        outbound: self.name.clone(),
                        inbound: inbound.name.clone(),
                        field: name.clone(),
                    })
                }
                Some(field) if field.secret => {
                    return Err(SchemaError::SecretExposed {
                        outbound: self.name.clone(),
                        field: name.clone(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Documentation for this schema as a JSON Schema object.
    #[must_use]
    pub fn describe(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), field.describe()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .values()
            .filter(|f| f.is_required())
            .map(|f| f.name.as_str())
            .collect();

        let mut doc = serde_json::json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
        });
        if let (Some(example), Some(obj)) = (&self.example, doc.as_object_mut()) {
            obj.insert("example".to_string(), example.clone());
        }
        doc
    }
}
