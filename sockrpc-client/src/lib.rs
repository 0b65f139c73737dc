//! JSON-RPC 2.0 client session over WebSocket
//!
//! This crate wraps a message transport in an [`RpcSession`] that sends
//! requests and notifications, matches responses to outstanding calls, and
//! fans every inbound event out to registered async handlers.
//!
//! # Core Features
//!
//! - **Request-Response**: `call` resolves with the result or rejects with
//!   the remote error object; an optional response timeout guards each call
//! - **Notifications**: fire-and-forget `notify`
//! - **Event Fan-out**: handlers for open, close, transport errors, every
//!   raw frame, and each of the four envelope categories
//! - **Pluggable Transport**: a WebSocket adapter from `connect`, or any
//!   [`SocketAdapter`] installed with `change_socket`
//! - **Bare Mode**: envelopes without the `jsonrpc` tag for peers that
//!   reject it
//! - **Observability**: tracing spans and OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sockrpc_client::RpcSession;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = RpcSession::new();
//!
//!     session.on_notification(|n| async move {
//!         println!("{}: {:?}", n.method, n.params);
//!     }).await;
//!
//!     session.connect("ws://localhost:8080", &[]).await?;
//!
//!     let sum = session.call("sum", Some(json!([1, 2]))).await?;
//!     println!("Result: {}", sum);
//!
//!     session.notify("ping", None).await?;
//!     Ok(())
//! }
//! ```
//!
//! # With a Timeout
//!
//! ```rust,no_run
//! use sockrpc_client::SessionBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> sockrpc_core::Result<()> {
//! let session = SessionBuilder::new()
//!     .response_timeout(Duration::from_secs(2))
//!     .connect("ws://localhost:8080", &[])
//!     .await?;
//!
//! match session.call("slow", None).await {
//!     Err(sockrpc_core::Error::Timeout { method, id }) => {
//!         println!("{} ({}) timed out", method, id);
//!     }
//!     other => println!("{:?}", other),
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod connection_state;
mod events;
mod metrics;
mod pending;
mod session;
mod session_builder;
pub mod transport;

pub use config::{SessionConfig, RESPONSE_TIMEOUT_ENV};
pub use connection_state::{ConnectionTracker, SessionState};
pub use events::{EventRegistry, HandlerFn, HandlerList};
pub use metrics::SessionMetrics;
pub use pending::{CallOutcome, PendingCalls};
pub use session::RpcSession;
pub use session_builder::SessionBuilder;
pub use transport::{CloseInfo, Frame, FrameSink, MessageHook, SocketAdapter, TransportEvent};
