//! Query string extractor.

use crate::{ExtractionContext, ExtractionError, FromRequest};
use registrar_core::Source;

/// Decoded `name=value` pairs of the query string, in order.
///
/// A name may repeat. [`get`](Self::get) returns the last occurrence,
/// [`get_all`](Self::get_all) every one.
///
/// # Example
///
/// ```rust
/// use registrar_extract::{QueryParams, FromRequest, ExtractionContextBuilder};
/// use http::Uri;
///
/// let ctx = ExtractionContextBuilder::new()
///     .uri(Uri::from_static("/person/detail?name=Ana+Mar%C3%ADa&age=25"))
///     .build();
///
/// let query = QueryParams::from_request(&ctx).unwrap();
/// assert_eq!(query.get("name"), Some("Ana María"));
/// assert_eq!(query.get("age"), Some("25"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses a raw query string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid url-encoding.
    pub fn parse(raw: &str) -> Result<Self, ExtractionError> {
        serde_urlencoded::from_str::<Vec<(String, String)>>(raw)
            .map(|pairs| Self { pairs })
            .map_err(|e| ExtractionError::deserialization_failed(Source::Query, e.to_string()))
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

    /// Returns every value for `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if no parameters were sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromRequest for QueryParams {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        ctx.query_string().map_or_else(|| Ok(Self::default()), Self::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionContextBuilder;
    use http::Uri;

    fn make_ctx(uri: &'static str) -> ExtractionContext {
        ExtractionContextBuilder::new().uri(Uri::from_static(uri)).build()
    }

    #[test]
    fn test_no_query() {
        let query = QueryParams::from_request(&make_ctx("/person/detail")).unwrap();
        assert!(query.is_empty());
        assert_eq!(query.get("name"), None);
    }

    #[test]
    fn test_repeated_names() {
        let query = QueryParams::from_request(&make_ctx("/?tag=a&tag=b&x=1")).unwrap();
        assert_eq!(query.get("tag"), Some("b"));
        assert_eq!(query.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_value_is_present() {
        let query = QueryParams::from_request(&make_ctx("/?name=&age=3")).unwrap();
        assert_eq!(query.get("name"), Some(""));
    }

    #[test]
    fn test_special_characters() {
        let query = QueryParams::parse("q=a%26b%3Dc&space=a%20b").unwrap();
        assert_eq!(query.get("q"), Some("a&b=c"));
        assert_eq!(query.get("space"), Some("a b"));
    }
}
