//! Core extractor trait.
//!
//! The [`FromRequest`] trait is implemented by every synchronous,
//! per-source extractor. Multipart bodies are read asynchronously through
//! [`Multipart`](crate::Multipart) instead.

use crate::{ExtractionContext, ExtractionError};

/// Trait for types that can be extracted from an HTTP request.
///
/// # Implementing `FromRequest`
///
/// ```rust
/// use registrar_extract::{FromRequest, ExtractionContext, ExtractionError};
/// use registrar_core::Source;
///
/// struct UserAgent(String);
///
/// impl FromRequest for UserAgent {
///     fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
///         ctx.header("user-agent")
///             .map(|v| UserAgent(v.to_string()))
///             .ok_or_else(|| ExtractionError::missing(Source::Header, "user-agent"))
///     }
/// }
/// ```
pub trait FromRequest: Sized {
    /// Extracts this type from the request context.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if the payload cannot be read.
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError>;
}

impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx).ok())
    }
}

macro_rules! impl_from_request_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: FromRequest),*> FromRequest for ($($T,)*) {
            fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
                Ok(($($T::from_request(ctx)?,)*))
            }
        }
    };
}

impl_from_request_for_tuple!(T1, T2);
impl_from_request_for_tuple!(T1, T2, T3);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExtractionContextBuilder;
    use crate::{Cookies, QueryParams};
    use http::Uri;
    use registrar_core::Source;

    struct Failing;

    impl FromRequest for Failing {
        fn from_request(_ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
            Err(ExtractionError::missing(Source::Path, "required_field"))
        }
    }

    #[test]
    fn test_option_swallows_failure() {
        let ctx = ExtractionContextBuilder::new().build();
        assert!(Option::<Failing>::from_request(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_tuple_extraction() {
        let ctx = ExtractionContextBuilder::new()
            .uri(Uri::from_static("/person/detail?name=Ana"))
            .header("cookie", "ads=yes")
            .build();

        let (query, cookies) = <(QueryParams, Cookies)>::from_request(&ctx).unwrap();
        assert_eq!(query.get("name"), Some("Ana"));
        assert_eq!(cookies.get("ads"), Some("yes"));

        assert!(<(QueryParams, Failing)>::from_request(&ctx).is_err());
    }
}
