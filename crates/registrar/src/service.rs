//! The request pipeline.
//!
//! ```text
//! Request → RequestId → Resolve → Bind → Validate → Handler → Project → Response
//!                          ↓        ↓        ↓          ↓
//!                          └────────┴────────┴──────────┴──→ ErrorEnvelope
//! ```
//!
//! A [`Service`] owns a [`Contract`] and one handler per operation. It is
//! immutable once built and can be shared across tasks behind an `Arc`.

use bytes::Bytes;
use http::{header, HeaderValue, Request, Response, StatusCode};
use registrar_core::{
    project, validate, validate_entity, ApiError, Contract, Entity, Operation, RequestId, Value,
};
use registrar_extract::{bind, ExtractionContext, Limits};
use registrar_telemetry::{log_request_complete, log_request_error, log_request_rejected, log_request_start};
use thiserror::Error;
use tracing::{debug, info_span, warn, Instrument};

use crate::handler::{HandlerRegistry, RequestContext};

/// Header carrying the request ID in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors detected while assembling a [`Service`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// An operation of the contract has no handler.
    #[error("no handler registered for operation '{0}'")]
    MissingHandler(String),

    /// A handler was registered for an operation the contract lacks.
    #[error("handler registered for unknown operation '{0}'")]
    UnknownOperation(String),
}

/// A contract bound to its handlers.
///
/// # Example
///
/// ```rust
/// use registrar::{Service, core::{Contract, Operation, Value}};
/// use http::{Method, Request};
/// use bytes::Bytes;
///
/// # tokio_test::block_on(async {
/// let contract = Contract::builder("hello")
///     .operation(Operation::builder("home").method(Method::GET).path("/").build())
///     .build();
///
/// let service = Service::builder(contract)
///     .handler("home", |_ctx, _input| async { Ok(Value::from("hi")) })
///     .build()
///     .unwrap();
///
/// let response = service
///     .handle(Request::get("/").body(Bytes::new()).unwrap())
///     .await;
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body().as_ref(), b"\"hi\"");
/// # });
/// ```
#[derive(Debug)]
pub struct Service {
    contract: Contract,
    handlers: HandlerRegistry,
    limits: Limits,
}

impl Service {
    /// Starts building a service for `contract`.
    #[must_use]
    pub fn builder(contract: Contract) -> ServiceBuilder {
        ServiceBuilder {
            contract,
            handlers: HandlerRegistry::new(),
            limits: Limits::default(),
        }
    }

    /// The served contract.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// The payload limits applied to every request.
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Runs one request through the pipeline.
    ///
    /// Never fails: every error becomes a JSON error envelope with the
    /// matching status.
    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let request_id = RequestId::from_header(
            request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        );
        let span = info_span!(
            "request",
            request_id = %request_id,
            http.method = %request.method(),
            http.path = %request.uri().path(),
            operation_id = tracing::field::Empty,
        );

        async move {
            let result = self.dispatch(request_id, request).await;
            match result {
                Ok((status, body)) => json_response(status, &body, request_id),
                Err(err) => error_response(&err, request_id),
            }
        }
        .instrument(span)
        .await
    }

    async fn dispatch(
        &self,
        request_id: RequestId,
        request: Request<Bytes>,
    ) -> Result<(StatusCode, serde_json::Value), ApiError> {
        let (parts, body) = request.into_parts();

        let (operation, params) = self.contract.resolve(&parts.method, parts.uri.path())?;
        tracing::Span::current().record("operation_id", operation.operation_id());
        log_request_start!(request_id, parts.method, parts.uri.path(), operation.operation_id());

        let handler = self
            .handlers
            .get(operation.operation_id())
            .ok_or_else(|| ApiError::internal(format!("no handler for {}", operation.operation_id())))?;

        let ctx = ExtractionContext::new(parts.method, parts.uri, parts.headers, body, params)
            .with_limits(self.limits);
        let bound = bind(operation.input(), &ctx).await?;
        let input = validate(operation.input(), bound)?;
        debug!(fields = input.len(), "request validated");

        let request_ctx = RequestContext::new(request_id, operation.operation_id());
        let output = handler(request_ctx.clone(), input).await?;

        let body = render(operation, &output)?;
        let status = operation.status();
        let elapsed_ms = u64::try_from(request_ctx.elapsed().as_millis()).unwrap_or(u64::MAX);
        log_request_complete!(request_id, status.as_u16(), elapsed_ms);

        Ok((status, body))
    }
}

/// Projects handler output through the operation's output schema, if any,
/// and checks the result against that schema's constraints.
fn render(operation: &Operation, output: &Value) -> Result<serde_json::Value, ApiError> {
    let Some(schema) = operation.output() else {
        return Ok(output.to_json());
    };
    let conform = |entity: &Entity| -> Result<serde_json::Value, ApiError> {
        let projected = project(entity, schema);
        validate_entity(schema, &projected).map_err(|errors| {
            warn!(schema = schema.name(), %errors, "handler output violates output schema");
            ApiError::internal_with_source(
                format!("response does not match output schema '{}'", schema.name()),
                errors,
            )
        })?;
        Ok(projected.to_json())
    };
    match output {
        Value::Object(entity) => conform(entity),
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(entity) => conform(entity),
                other => Ok(other.to_json()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),
        other => Ok(other.to_json()),
    }
}

fn json_response(status: StatusCode, body: &serde_json::Value, request_id: RequestId) -> Response<Bytes> {
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    let mut response = Response::new(Bytes::from(bytes));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn error_response(err: &ApiError, request_id: RequestId) -> Response<Bytes> {
    let status = err.status_code();
    if status.is_server_error() {
        log_request_error!(request_id, err);
    } else {
        log_request_rejected!(request_id, status.as_u16(), err);
    }

    let id = request_id.to_string();
    let envelope = err.to_envelope(Some(&id));
    let body = serde_json::to_value(&envelope).unwrap_or_default();
    json_response(status, &body, request_id)
}

/// Builder for [`Service`].
#[derive(Debug)]
pub struct ServiceBuilder {
    contract: Contract,
    handlers: HandlerRegistry,
    limits: Limits,
}

impl ServiceBuilder {
    /// Registers the handler for `operation_id`.
    #[must_use]
    pub fn handler<F, Fut>(mut self, operation_id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(RequestContext, Entity) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        self.handlers.register(operation_id, handler);
        self
    }

    /// Sets the payload limits.
    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Builds the service.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] unless handlers and operations match one to one.
    pub fn build(self) -> Result<Service, BuildError> {
        if let Some(op) = self
            .contract
            .operations()
            .iter()
            .find(|op| !self.handlers.contains(op.operation_id()))
        {
            return Err(BuildError::MissingHandler(op.operation_id().to_string()));
        }
        if let Some(id) = self
            .handlers
            .operation_ids()
            .find(|id| self.contract.get_operation(id).is_none())
        {
            return Err(BuildError::UnknownOperation(id.to_string()));
        }

        Ok(Service {
            contract: self.contract,
            handlers: self.handlers,
            limits: self.limits,
        })
    }
}
