//! Multipart form data reader for file uploads.
//!
//! [`Multipart`] walks the parts of a `multipart/form-data` body one at a
//! time. [`Multipart::read_form`] collects them into a [`MultipartForm`]:
//! parts without a filename become text fields, parts with one become
//! [`FileHandle`]s.
//!
//! # Example
//!
//! ```rust
//! use registrar_extract::{ExtractionContextBuilder, Multipart};
//!
//! # tokio_test::block_on(async {
//! let body = "--X\r\n\
//!     Content-Disposition: form-data; name=\"image\"; filename=\"cat.png\"\r\n\
//!     Content-Type: image/png\r\n\r\n\
//!     PNGDATA\r\n\
//!     --X--\r\n";
//! let ctx = ExtractionContextBuilder::new()
//!     .header("content-type", "multipart/form-data; boundary=X")
//!     .body(body)
//!     .build();
//!
//! let mut form = Multipart::from_context(&ctx)?.read_form().await?;
//! let files = form.take_files("image");
//! assert_eq!(files.len(), 1);
//! assert_eq!(files[0].file_name(), Some("cat.png"));
//! # Ok::<_, registrar_extract::ExtractionError>(())
//! # }).unwrap();
//! ```

use bytes::Bytes;
use registrar_core::{FileHandle, Source};
use std::io;

use crate::form::FormFields;
use crate::limits::Limits;
use crate::{ExtractionContext, ExtractionError};

/// Streaming reader over a multipart body.
pub struct Multipart {
    inner: multer::Multipart<'static>,
    limits: Limits,
    field_count: usize,
}

impl Multipart {
    /// Creates a reader for the request body.
    ///
    /// # Errors
    ///
    /// Returns an error if the Content-Type is not multipart with a boundary,
    /// or the body exceeds the multipart size limit.
    pub fn from_context(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let content_type = ctx.content_type();
        let boundary = content_type
            .and_then(|ct| multer::parse_boundary(ct).ok())
            .ok_or_else(|| {
                ExtractionError::unsupported_media_type(
                    Source::Form,
                    "multipart/form-data; boundary=...",
                    content_type,
                )
            })?;

        let limits = *ctx.limits();
        let body = ctx.body().clone();
        if body.len() > limits.max_multipart_size {
            return Err(ExtractionError::payload_too_large(
                Source::Form,
                limits.max_multipart_size,
                body.len(),
            ));
        }

        let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });

        Ok(Self {
            inner: multer::Multipart::new(stream, boundary),
            limits,
            field_count: 0,
        })
    }

    /// Returns the next part, or `None` after the last one.
    ///
    /// # Errors
    ///
    /// Returns an error if the part count limit is exceeded or the body is
    /// malformed.
    pub async fn next_field(&mut self) -> Result<Option<Field>, ExtractionError> {
        match self.inner.next_field().await {
            Ok(Some(field)) => {
                self.field_count += 1;
                if self.field_count > self.limits.max_multipart_fields {
                    return Err(ExtractionError::too_many_fields(
                        Source::Form,
                        self.limits.max_multipart_fields,
                    ));
                }
                Ok(Some(Field {
                    inner: field,
                    max_size: self.limits.max_file_size,
                }))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(ExtractionError::deserialization_failed(
                Source::Form,
                format!("multipart parse error: {e}"),
            )),
        }
    }

    /// Reads every part into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or a part exceeds the size limit.
    pub async fn read_form(mut self) -> Result<MultipartForm, ExtractionError> {
        let mut fields = Vec::new();
        let mut files = Vec::new();

        while let Some(field) = self.next_field().await? {
            let Some(name) = field.name().map(String::from) else {
                continue;
            };
            if field.file_name().is_some() {
                files.push((name, field.into_file().await?));
            } else {
                fields.push((name, field.text().await?));
            }
        }

        Ok(MultipartForm {
            fields: FormFields::from_pairs(fields),
            files,
        })
    }
}

impl std::fmt::Debug for Multipart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multipart")
            .field("limits", &self.limits)
            .field("field_count", &self.field_count)
            .finish_non_exhaustive()
    }
}

/// One part of a multipart body.
pub struct Field {
    inner: multer::Field<'static>,
    max_size: usize,
}

impl Field {
    /// The part's form name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    /// The client's file name; `Some` only for file parts.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.inner.file_name()
    }

    /// The part's declared Content-Type.
    #[must_use]
    pub fn content_type(&self) -> Option<&mime::Mime> {
        self.inner.content_type()
    }

    /// Reads the whole part.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the part exceeds the size limit.
    pub async fn bytes(self) -> Result<Bytes, ExtractionError> {
        let bytes = self.inner.bytes().await.map_err(|e| {
            ExtractionError::deserialization_failed(Source::Form, format!("failed to read part: {e}"))
        })?;

        if bytes.len() > self.max_size {
            return Err(ExtractionError::payload_too_large(
                Source::File,
                self.max_size,
                bytes.len(),
            ));
        }

        Ok(bytes)
    }

    /// Reads the part as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the content is not UTF-8.
    pub async fn text(self) -> Result<String, ExtractionError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            ExtractionError::deserialization_failed(
                Source::Form,
                format!("part is not valid UTF-8: {e}"),
            )
        })
    }

    /// Reads the part into a file handle.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the part exceeds the size limit.
    pub async fn into_file(self) -> Result<FileHandle, ExtractionError> {
        let file_name = self.file_name().map(String::from);
        let content_type = self.content_type().map(ToString::to_string);
        let data = self.bytes().await?;
        Ok(FileHandle::from_bytes(file_name, content_type, data))
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.inner.name())
            .field("file_name", &self.inner.file_name())
            .field("content_type", &self.inner.content_type())
            .field("max_size", &self.max_size)
            .finish()
    }
}

/// A fully read multipart body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: FormFields,
    files: Vec<(String, FileHandle)>,
}

impl MultipartForm {
    /// The text parts.
    #[must_use]
    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// Removes and returns every file sent under `name`, in order.
    pub fn take_files(&mut self, name: &str) -> Vec<FileHandle> {
        let (taken, kept) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(n, _)| n == name);
        self.files = kept;
        taken.into_iter().map(|(_, file)| file).collect()
    }

    /// Number of file parts not yet taken.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionContextBuilder;

    fn part(name: &str, file_name: Option<&str>, body: &str) -> String {
        let disposition = match file_name {
            Some(f) => format!("form-data; name=\"{name}\"; filename=\"{f}\""),
            None => format!("form-data; name=\"{name}\""),
        };
        let content_type = if file_name.is_some() {
            "Content-Type: image/jpeg\r\n"
        } else {
            ""
        };
        format!("--BOUNDARY\r\nContent-Disposition: {disposition}\r\n{content_type}\r\n{body}\r\n")
    }

    fn ctx(parts: &[String], limits: Limits) -> ExtractionContext {
        let body = format!("{}--BOUNDARY--\r\n", parts.concat());
        ExtractionContextBuilder::new()
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(body)
            .limits(limits)
            .build()
    }

    #[tokio::test]
    async fn test_text_and_file_parts() {
        let ctx = ctx(
            &[
                part("username", None, "alice"),
                part("images", Some("a.jpg"), "AAAA"),
                part("images", Some("b.jpg"), "BB"),
            ],
            Limits::default(),
        );

        let mut form = Multipart::from_context(&ctx).unwrap().read_form().await.unwrap();
        assert_eq!(form.fields().get("username"), Some("alice"));
        assert_eq!(form.file_count(), 2);

        let files = form.take_files("images");
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name(), Some("a.jpg"));
        assert_eq!(files[1].content_type(), Some("image/jpeg"));
        assert_eq!(form.file_count(), 0);
        assert!(form.take_files("images").is_empty());
    }

    #[tokio::test]
    async fn test_file_contents_are_readable() {
        let ctx = ctx(&[part("image", Some("x.jpg"), "hello")], Limits::default());
        let mut form = Multipart::from_context(&ctx).unwrap().read_form().await.unwrap();
        let file = form.take_files("image").pop().unwrap();
        assert_eq!(file.read_all().unwrap().size(), 5);
    }

    #[tokio::test]
    async fn test_too_many_fields() {
        let parts: Vec<String> = (0..3).map(|i| part(&format!("f{i}"), None, "v")).collect();
        let ctx = ctx(&parts, Limits::new().max_multipart_fields(2));
        let err = Multipart::from_context(&ctx).unwrap().read_form().await.unwrap_err();
        assert_eq!(err.error_code(), "TOO_MANY_FIELDS");
    }

    #[tokio::test]
    async fn test_part_too_large() {
        let ctx = ctx(
            &[part("image", Some("big.jpg"), &"x".repeat(64))],
            Limits::new().max_file_size(16),
        );
        let err = Multipart::from_context(&ctx).unwrap().read_form().await.unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.source(), Source::File);
    }

    #[test]
    fn test_body_too_large() {
        let ctx = ctx(&[part("a", None, "0123456789")], Limits::new().max_multipart_size(8));
        assert!(Multipart::from_context(&ctx).is_err());
    }

    #[test]
    fn test_missing_boundary() {
        let ctx = ExtractionContextBuilder::new()
            .header("content-type", "multipart/form-data")
            .body("irrelevant")
            .build();
        let err = Multipart::from_context(&ctx).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_MEDIA_TYPE");
    }
}
