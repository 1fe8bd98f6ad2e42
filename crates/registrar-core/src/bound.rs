//! Raw values located by the binder, keyed by schema field.

use indexmap::IndexMap;

use crate::schema::Source;
use crate::value::FileHandle;

/// A raw, not yet validated value.
#[derive(Debug)]
pub enum RawValue {
    /// Text from the path, query string, a header, a cookie or a form field.
    Text(String),
    /// A member of the JSON request body.
    Json(serde_json::Value),
    /// One uploaded file.
    File(FileHandle),
    /// Every uploaded file under one part name, possibly none.
    Files(Vec<FileHandle>),
}

impl RawValue {
    /// Short description of the raw value for failure reports.
    ///
    /// File contents are never echoed.
    #[must_use]
    pub fn echo(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Json(v) => v.clone(),
            Self::File(f) => serde_json::json!({ "filename": f.file_name() }),
            Self::Files(files) => serde_json::Value::Array(
                files
                    .iter()
                    .map(|f| serde_json::json!({ "filename": f.file_name() }))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

/// A raw value paired with the field and source it was located for.
#[derive(Debug)]
pub struct BoundValue {
    /// Schema field name.
    pub name: String,
    /// Where the value was read from.
    pub source: Source,
    /// The raw value, or `None` when the source did not supply one.
    pub raw: Option<RawValue>,
}

impl BoundValue {
    /// Creates a bound value.
    pub fn new(name: impl Into<String>, source: Source, raw: Option<RawValue>) -> Self {
        Self {
            name: name.into(),
            source,
            raw,
        }
    }

    /// Creates a bound value for a field the source omitted.
    pub fn absent(name: impl Into<String>, source: Source) -> Self {
        Self::new(name, source, None)
    }
}

/// Bound values for one request, keyed by field name.
#[derive(Debug, Default)]
pub struct BoundValues {
    values: IndexMap<String, BoundValue>,
}

impl BoundValues {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bound value, replacing any earlier one for the same field.
    pub fn push(&mut self, value: BoundValue) {
        self.values.insert(value.name.clone(), value);
    }

    /// Builder form of [`push`](Self::push) taking a raw value.
    #[must_use]
    pub fn with(mut self, name: &str, source: Source, raw: impl Into<RawValue>) -> Self {
        self.push(BoundValue::new(name, source, Some(raw.into())));
        self
    }

    /// Removes and returns the bound value for a field.
    pub fn take(&mut self, name: &str) -> Option<BoundValue> {
        self.values.shift_remove(name)
    }

    /// Borrows the bound value for a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    /// Number of bound fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
