//! Handler registration and dispatch.
//!
//! Each operation of a [`Contract`](registrar_core::Contract) is served by one
//! handler. A handler receives the [`RequestContext`] and the validated input
//! [`Entity`], and returns a [`Value`] that the service projects through the
//! operation's output schema.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use registrar_core::{ApiError, Entity, RequestId, Value};

/// Boxed handler result.
pub type BoxedHandlerResult = Pin<Box<dyn Future<Output = Result<Value, ApiError>> + Send>>;

/// A type-erased handler function.
pub type ErasedHandler = Arc<dyn Fn(RequestContext, Entity) -> BoxedHandlerResult + Send + Sync>;

/// Per-request data passed to handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    operation_id: String,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for one request to `operation_id`.
    #[must_use]
    pub fn new(request_id: RequestId, operation_id: impl Into<String>) -> Self {
        Self {
            request_id,
            operation_id: operation_id.into(),
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the operation being served.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Time since the request was resolved.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Maps operation IDs to handlers.
///
/// # Example
///
/// ```rust
/// use registrar::handler::HandlerRegistry;
/// use registrar::core::Value;
///
/// let mut registry = HandlerRegistry::new();
/// registry.register("home", |_ctx, _input| async {
///     Ok(Value::from("hello"))
/// });
/// assert!(registry.contains("home"));
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, ErasedHandler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any earlier one for the same operation.
    pub fn register<F, Fut>(&mut self, operation_id: impl Into<String>, handler: F)
    where
        F: Fn(RequestContext, Entity) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |ctx: RequestContext, input: Entity| {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler(ctx, input).await }) as BoxedHandlerResult
        });

        self.handlers.insert(operation_id.into(), erased);
    }

    /// Looks up a handler by operation ID.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<&ErasedHandler> {
        self.handlers.get(operation_id)
    }

    /// Checks if a handler is registered for an operation.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Returns the registered operation IDs.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
