//! Event fan-out registry
//!
//! A session publishes eight kinds of event. Each kind has its own
//! append-only [`HandlerList`]:
//!
//! | list               | payload            | raised when                          |
//! |--------------------|--------------------|--------------------------------------|
//! | `open`             | `()`               | transport opened                     |
//! | `any_message`      | raw frame text     | any inbound text frame               |
//! | `error`            | error description  | transport error                      |
//! | `close`            | [`CloseInfo`]      | transport closed                     |
//! | `notification`     | [`Notification`]   | classified inbound notification      |
//! | `request`          | [`Request`]        | classified inbound request           |
//! | `success_response` | [`SuccessResponse`]| classified inbound success response  |
//! | `error_response`   | [`ErrorResponse`]  | classified inbound error response    |
//!
//! Handlers are async and run one after another in registration order,
//! each awaited before the next starts. A handler that panics is logged and
//! skipped; the remaining handlers still run.
//!
//! A session runs its handlers on a fan-out task separate from frame
//! dispatch, so a handler may await a `call` on that same session.

use crate::transport::CloseInfo;
use futures::future::BoxFuture;
use futures::FutureExt;
use sockrpc_core::{Envelope, ErrorResponse, Notification, Request, SuccessResponse};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Type-erased async handler
pub type HandlerFn<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

/// Ordered, append-only list of handlers for one event kind
pub struct HandlerList<T> {
    name: &'static str,
    handlers: Arc<RwLock<Vec<HandlerFn<T>>>>,
}

impl<T> Clone for HandlerList<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            handlers: Arc::clone(&self.handlers),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> HandlerList<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handlers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append a handler
    pub async fn push<F, Fut>(&self, handler: F)
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: HandlerFn<T> = Arc::new(move |value| Box::pin(handler(value)));
        self.handlers.write().await.push(handler);
    }

    /// Run every handler with a clone of `value`
    ///
    /// Returns how many handlers panicked.
    pub async fn emit(&self, value: T) -> usize {
        // snapshot so handlers may register more handlers without deadlocking
        let handlers: Vec<HandlerFn<T>> = self.handlers.read().await.clone();
        let mut failures = 0;

        for (index, handler) in handlers.iter().enumerate() {
            let invocation = AssertUnwindSafe(async { handler(value.clone()).await });
            if let Err(panic) = invocation.catch_unwind().await {
                failures += 1;
                tracing::error!(
                    event = self.name,
                    handler = index,
                    panic = %panic_message(panic.as_ref()),
                    "Event handler panicked"
                );
            }
        }

        failures
    }

    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// The eight handler lists of a session
#[derive(Clone)]
pub struct EventRegistry {
    pub open: HandlerList<()>,
    pub any_message: HandlerList<String>,
    pub error: HandlerList<String>,
    pub close: HandlerList<CloseInfo>,
    pub notification: HandlerList<Notification>,
    pub request: HandlerList<Request>,
    pub success_response: HandlerList<SuccessResponse>,
    pub error_response: HandlerList<ErrorResponse>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            open: HandlerList::new("open"),
            any_message: HandlerList::new("any_message"),
            error: HandlerList::new("error"),
            close: HandlerList::new("close"),
            notification: HandlerList::new("notification"),
            request: HandlerList::new("request"),
            success_response: HandlerList::new("success_response"),
            error_response: HandlerList::new("error_response"),
        }
    }

    /// Route a classified envelope to its category's handlers
    pub async fn emit_envelope(&self, envelope: Envelope) -> usize {
        match envelope {
            Envelope::Notification(n) => self.notification.emit(n).await,
            Envelope::Request(r) => self.request.emit(r).await,
            Envelope::Success(r) => self.success_response.emit(r).await,
            Envelope::Error(r) => self.error_response.emit(r).await,
        }
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
