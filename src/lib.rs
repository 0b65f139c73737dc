//! sockrpc - JSON-RPC 2.0 client sessions over WebSocket
//!
//! This is the convenience crate that re-exports the sockrpc sub-crates.
//!
//! # Architecture
//!
//! - **sockrpc-core**: envelope types, classifier, builder, codec, errors,
//!   observability
//! - **sockrpc-client**: the RPC session, pending-call table, event fan-out
//!   and transport adapters
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sockrpc::RpcSession;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = RpcSession::new();
//!
//!     session.on_close(|info| async move {
//!         println!("closed with {}", info.code);
//!     }).await;
//!
//!     session.connect("ws://localhost:8080", &[]).await?;
//!
//!     let sum = session.call("sum", Some(json!([1, 2]))).await?;
//!     println!("Result: {}", sum);
//!
//!     Ok(())
//! }
//! ```

pub use sockrpc_client as client;
pub use sockrpc_core as core;

pub use sockrpc_client::{RpcSession, SessionBuilder};
