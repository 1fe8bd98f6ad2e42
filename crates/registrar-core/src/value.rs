//! Typed values and validated entities.
//!
//! A [`Value`] is what the validator produces once a raw transport value has
//! been coerced into its declared type. An [`Entity`] is the ordered mapping
//! of field name to [`Value`] that the validator hands to business logic and
//! that the projector filters on the way out.

use bytes::Bytes;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::io::{self, Read};

/// A typed value accepted by a field constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent optional value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value (produced by business actions, never by coercion).
    Float(f64),
    /// String value. Enumeration and email fields are stored as strings too.
    String(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested entity.
    Object(Entity),
    /// Fully read uploaded file.
    File(FileInfo),
}

impl Value {
    /// Returns true if this is [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string slice if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer value.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the nested entity if this is an object value.
    #[must_use]
    pub fn as_object(&self) -> Option<&Entity> {
        match self {
            Self::Object(entity) => Some(entity),
            _ => None,
        }
    }

    /// Returns the list items if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the file if this is a file value.
    #[must_use]
    pub fn as_file(&self) -> Option<&FileInfo> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Converts this value into a JSON value.
    ///
    /// Files are rendered as their metadata, never their content.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(n) => serde_json::Value::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Self::Object(entity) => entity.to_json(),
            Self::File(file) => file.to_json(),
        }
    }

    /// Builds a value from a JSON value.
    ///
    /// Numbers that fit an `i64` become integers, other numbers become floats.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            serde_json::Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
            Self::Object(entity) => entity.serialize(serializer),
            Self::File(file) => file.serialize(serializer),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Self::Object(entity)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An ordered mapping of field name to typed value.
///
/// Produced by the validator when every field of a schema passes, and by the
/// projector when filtering through an output schema. Field order is the
/// declaration order of the schema that produced it.
///
/// # Example
///
/// ```
/// use registrar_core::{Entity, Value};
///
/// let entity = Entity::new()
///     .with("first_name", "Miguel")
///     .with("age", 25);
///
/// assert_eq!(entity.get_str("first_name"), Some("Miguel"));
/// assert_eq!(entity.get_i64("age"), Some(25));
/// assert_eq!(entity.keys().collect::<Vec<_>>(), vec!["first_name", "age"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    fields: IndexMap<String, Value>,
}

impl Entity {
    /// Creates an empty entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, returning the entity.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns a field value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a string field by name.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Returns an integer field by name.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Returns a nested entity field by name.
    #[must_use]
    pub fn get_object(&self, name: &str) -> Option<&Entity> {
        self.get(name).and_then(Value::as_object)
    }

    /// Returns true if the entity has a field with this name.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts the entity into a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl FromIterator<(String, Value)> for Entity {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Entity {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// An uploaded file whose stream has been read to the end.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl FileInfo {
    /// Creates file info from already-read content.
    #[must_use]
    pub fn new(file_name: Option<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            file_name,
            content_type,
            data,
        }
    }

    /// The file name declared by the client.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The content type declared by the client.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The file content.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Size in kibibytes, rounded to two decimals.
    #[must_use]
    pub fn size_kb(&self) -> f64 {
        let kb = self.data.len() as f64 / 1024.0;
        (kb * 100.0).round() / 100.0
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "filename": self.file_name,
            "content_type": self.content_type,
            "size": self.data.len(),
        })
    }
}

impl Serialize for FileInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("filename", &self.file_name)?;
        map.serialize_entry("content_type", &self.content_type)?;
        map.serialize_entry("size", &self.data.len())?;
        map.end()
    }
}

/// A stream-like handle over an uploaded file.
///
/// The handle owns its reader. [`FileHandle::read_all`] consumes the handle,
/// so the stream is read exactly once and released when the handle goes out
/// of scope on any path.
pub struct FileHandle {
    file_name: Option<String>,
    content_type: Option<String>,
    reader: Box<dyn Read + Send>,
}

impl FileHandle {
    /// Creates a handle over an arbitrary reader.
    pub fn new(
        file_name: Option<String>,
        content_type: Option<String>,
        reader: impl Read + Send + 'static,
    ) -> Self {
        Self {
            file_name,
            content_type,
            reader: Box::new(reader),
        }
    }

    /// Creates a handle over bytes already received with the request.
    #[must_use]
    pub fn from_bytes(file_name: Option<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self::new(file_name, content_type, io::Cursor::new(data))
    }

    /// The file name declared by the client.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The content type declared by the client.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Reads the whole stream into memory.
    ///
    /// The entire payload is buffered to compute its size; large uploads are
    /// held in memory for the lifetime of the returned [`FileInfo`].
    pub fn read_all(mut self) -> io::Result<FileInfo> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(FileInfo {
            file_name: self.file_name,
            content_type: self.content_type,
            data: Bytes::from(buf),
        })
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
