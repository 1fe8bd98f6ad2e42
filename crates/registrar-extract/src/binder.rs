//! Locates the raw value of every schema field in the request.
//!
//! Each source is parsed at most once, and only if the schema reads from it.
//! A source that cannot be parsed at all (invalid JSON, a malformed form, an
//! oversized body) ends binding with a single structural violation; fields
//! that are simply not present are bound as absent and left to the
//! validator.

use registrar_core::{
    BoundValue, BoundValues, FieldConstraint, FieldType, RawValue, Schema, Source,
    ValidationErrors,
};
use tracing::{debug, trace};

use crate::cookie::Cookies;
use crate::form::FormFields;
use crate::json::JsonBody;
use crate::multipart::{Multipart, MultipartForm};
use crate::query::QueryParams;
use crate::{ExtractionContext, ExtractionError, FromRequest};

/// Binds every field of `schema` to its raw value in the request.
///
/// # Errors
///
/// Returns a single structural violation if a source the schema reads from
/// is malformed, too large, or if a path parameter is missing.
///
/// # Example
///
/// ```rust
/// use registrar_core::{FieldConstraint, Schema, Source};
/// use registrar_extract::{bind, ExtractionContextBuilder};
/// use http::Uri;
///
/// # tokio_test::block_on(async {
/// let schema = Schema::new("ShowPerson")
///     .field(FieldConstraint::string("name").source(Source::Query).optional())
///     .field(FieldConstraint::string("age").source(Source::Query));
///
/// let ctx = ExtractionContextBuilder::new()
///     .uri(Uri::from_static("/person/detail?age=25"))
///     .build();
///
/// let bound = bind(&schema, &ctx).await.unwrap();
/// assert!(bound.get("name").unwrap().raw.is_none());
/// assert!(bound.get("age").unwrap().raw.is_some());
/// # });
/// ```
pub async fn bind(schema: &Schema, ctx: &ExtractionContext) -> Result<BoundValues, ValidationErrors> {
    let mut sources = Sources::read(schema, ctx).await.map_err(structural)?;
    let mut bound = BoundValues::new();

    for field in schema.fields() {
        let raw = sources.locate(field, ctx)?;
        trace!(
            field = field.name(),
            source = %field.location(),
            present = raw.is_some(),
            "bound field"
        );
        bound.push(BoundValue::new(field.name(), field.location(), raw));
    }

    Ok(bound)
}

fn structural(err: ExtractionError) -> ValidationErrors {
    debug!(source = %err.source(), code = err.error_code(), "request rejected while binding");
    ValidationErrors::structural(err.into())
}

/// The parsed request sources a schema needs.
#[derive(Debug, Default)]
struct Sources {
    query: QueryParams,
    cookies: Cookies,
    json: JsonBody,
    form: FormFields,
    multipart: Option<MultipartForm>,
}

impl Sources {
    async fn read(schema: &Schema, ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let mut sources = Self::default();

        if schema.reads_from(Source::Query) {
            sources.query = QueryParams::from_request(ctx)?;
        }
        if schema.reads_from(Source::Cookie) {
            sources.cookies = Cookies::from_request(ctx)?;
        }
        if schema.reads_from(Source::Body) {
            sources.json = JsonBody::from_request(ctx)?;
        }
        if schema.reads_from(Source::Form) || schema.reads_from(Source::File) {
            if is_multipart(ctx) {
                let form = Multipart::from_context(ctx)?.read_form().await?;
                sources.form = form.fields().clone();
                sources.multipart = Some(form);
            } else if schema.reads_from(Source::Form) {
                sources.form = FormFields::from_request(ctx)?;
            }
        }

        Ok(sources)
    }

    fn locate(
        &mut self,
        field: &FieldConstraint,
        ctx: &ExtractionContext,
    ) -> Result<Option<RawValue>, ValidationErrors> {
        let name = field.external_name();
        let raw = match field.location() {
            Source::Path => match ctx.path_params().get(&name) {
                Some(value) => Some(RawValue::from(value)),
                None => return Err(structural(ExtractionError::missing(Source::Path, name))),
            },
            Source::Query => {
                if matches!(field.field_type(), FieldType::List(_)) {
                    let items: Vec<serde_json::Value> = self
                        .query
                        .get_all(&name)
                        .map(|v| serde_json::Value::String(v.to_string()))
                        .collect();
                    (!items.is_empty()).then(|| RawValue::Json(serde_json::Value::Array(items)))
                } else {
                    self.query.get(&name).map(RawValue::from)
                }
            }
            Source::Header => ctx.header(&name).map(RawValue::from),
            Source::Cookie => self.cookies.get(&name).map(RawValue::from),
            Source::Body => self.json.take(&name).map(RawValue::Json),
            Source::Form => self.form.get(&name).map(RawValue::from),
            Source::File => self.multipart.as_mut().and_then(|form| {
                let mut files = form.take_files(&name);
                if files.is_empty() {
                    None
                } else if matches!(field.field_type(), FieldType::List(_)) {
                    Some(RawValue::Files(files))
                } else {
                    Some(RawValue::File(files.remove(0)))
                }
            }),
        };
        Ok(raw)
    }
}

fn is_multipart(ctx: &ExtractionContext) -> bool {
    ctx.mime()
        .is_some_and(|m| m.type_() == mime::MULTIPART && m.subtype() == mime::FORM_DATA)
}
