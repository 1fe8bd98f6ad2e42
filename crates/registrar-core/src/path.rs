//! Path templates and the parameters they capture.

use smallvec::SmallVec;
use std::fmt;

/// Templates rarely declare more than this many parameters.
const INLINE_PARAMS: usize = 4;

/// Named segments captured from a request path.
///
/// # Example
///
/// ```
/// use registrar_core::Params;
///
/// let mut params = Params::new();
/// params.push("person_id", "3");
///
/// assert_eq!(params.get("person_id"), Some("3"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value captured under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of captured parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Parameter(String),
}

/// A path such as `/person/detail/{person_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses a template. Segments wrapped in braces are parameters.
    pub fn parse(template: impl Into<String>) -> Self {
        let raw = template.into();
        let segments = split(&raw)
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Parameter(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self { raw, segments }
    }

    /// The template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of the parameters, in order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Parameter(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a request path, capturing parameters.
    ///
    /// Literal segments are compared exactly; empty segments are ignored, so
    /// a trailing slash does not prevent a match.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        let actual: Vec<&str> = split(path).collect();
        if actual.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (pattern, actual) in self.segments.iter().zip(actual) {
            match pattern {
                Segment::Literal(lit) if lit != actual => return None,
                Segment::Literal(_) => {}
                Segment::Parameter(name) => params.push(name.clone(), actual),
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
