//! Cookie extractor.

use crate::{ExtractionContext, ExtractionError, FromRequest};
use http::header;
use indexmap::IndexMap;
use registrar_core::Source;

/// Cookies sent in the request's `Cookie` headers.
///
/// # Example
///
/// ```rust
/// use registrar_extract::{Cookies, FromRequest, ExtractionContextBuilder};
///
/// let ctx = ExtractionContextBuilder::new()
///     .header("cookie", "ads=yes; theme=\"dark\"")
///     .build();
///
/// let cookies = Cookies::from_request(&ctx).unwrap();
/// assert_eq!(cookies.get("ads"), Some("yes"));
/// assert_eq!(cookies.get("theme"), Some("dark"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies {
    cookies: IndexMap<String, String>,
}

impl Cookies {
    /// Parses one `Cookie` header value, adding to what is already known.
    ///
    /// Pairs without `=` are ignored. Surrounding quotes are stripped.
    fn parse_into(&mut self, header_value: &str) {
        for pair in header_value.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                let value = value.trim().trim_matches('"');
                self.cookies.insert(name.trim().to_string(), value.to_string());
            }
        }
    }

    /// Returns a cookie value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns true if no cookie was sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl FromRequest for Cookies {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let mut cookies = Self::default();
        for value in ctx.headers().get_all(header::COOKIE) {
            let value = value.to_str().map_err(|_| {
                ExtractionError::deserialization_failed(Source::Cookie, "invalid UTF-8 in Cookie header")
            })?;
            cookies.parse_into(value);
        }
        Ok(cookies)
    }
}
