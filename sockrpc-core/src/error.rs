//! Error types for sockrpc
//!
//! Two kinds of error live here:
//!
//! - **Error**: everything a session operation can fail with (uses thiserror)
//! - **ErrorObject**: the `{code, message, data?}` object carried by an
//!   error response on the wire
//!
//! A remote error response reaches the caller of `call` as
//! `Error::JsonRpc(ErrorObject)`, with the object exactly as the peer sent it.
//!
//! # Standard Error Codes
//!
//! - `-32700`: Parse error (invalid JSON)
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! # Examples
//!
//! ```rust
//! use sockrpc_core::{Error, ErrorObject};
//!
//! let remote = ErrorObject::method_not_found("frobnicate");
//! assert_eq!(remote.code, -32601);
//!
//! let error: Error = remote.into();
//! assert!(error.to_string().contains("-32601"));
//! ```

use crate::types::Id;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("JSON-RPC error: {0}")]
    JsonRpc(#[from] ErrorObject),

    #[error("Request timeout: no response to `{method}` (id {id})")]
    Timeout { method: String, id: Id },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("No transport attached to the session")]
    NotConnected,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short, stable label used for metric attributes and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Error::JsonRpc(_) => "remote",
            Error::Timeout { .. } => "timeout",
            Error::Parse(_) => "parse",
            Error::Serialization(_) => "serialization",
            Error::WebSocket(_) => "websocket",
            Error::ConnectionClosed => "connection_closed",
            Error::NotConnected => "not_connected",
            Error::Internal(_) => "internal",
        }
    }
}

/// The error member of a JSON-RPC error response
///
/// Only `code` is required inbound. Peers that leave out `message` still
/// produce an error object, with an empty message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ErrorObject {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i64, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn parse_error() -> Self {
        Self::new(-32700, "Parse error")
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(-32600, msg)
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(-32601, format!("Method not found: {}", method.into()))
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(-32602, msg)
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(-32603, msg)
    }
}

impl std::fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorObject {}
