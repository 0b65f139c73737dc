//! Core JSON-RPC 2.0 protocol layer for sockrpc
//!
//! Everything here is transport-agnostic:
//!
//! - **Types**: identifiers and the four envelope shapes
//! - **Classifier**: turns a decoded JSON value into exactly one envelope
//!   shape, or nothing
//! - **Builder**: constructs outgoing envelopes, with or without the
//!   `jsonrpc` version tag
//! - **Codec**: JSON text encoding and decoding
//! - **Identifiers**: pluggable request id generation
//! - **Errors** and **Observability**
//!
//! The `sockrpc-client` crate puts these behind a WebSocket session.
//!
//! # Example
//!
//! ```rust
//! use sockrpc_core::{codec, EnvelopeBuilder, Envelope, IdGenerator};
//! use serde_json::json;
//!
//! let ids = IdGenerator::sequential();
//! let request = EnvelopeBuilder::default().request(ids.next_id(), "sum", Some(json!([1, 2])));
//! let text = codec::encode(&request).unwrap();
//!
//! match codec::decode_envelope(&text).unwrap() {
//!     Some(Envelope::Request(req)) => assert_eq!(req.method, "sum"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub mod builder;
pub mod classify;
pub mod codec;
pub mod error;
pub mod id;
pub mod observability;
pub mod types;

pub use builder::{EnvelopeBuilder, ProtocolMode};
pub use classify::classify;
pub use error::{Error, ErrorObject, Result};
pub use id::IdGenerator;
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{
    Envelope, ErrorResponse, Id, Notification, Request, SuccessResponse, JSONRPC_VERSION,
};
