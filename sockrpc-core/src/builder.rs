//! Outbound envelope construction
//!
//! [`EnvelopeBuilder`] is a small value that knows one thing: whether the
//! session writes the `jsonrpc: "2.0"` tag. Everything else about an
//! envelope comes from the arguments.
//!
//! `params` is left out of the envelope when `None` is passed; it is never
//! serialized as `null`.
//!
//! # Examples
//!
//! ```rust
//! use sockrpc_core::{codec, EnvelopeBuilder, Id, ProtocolMode};
//! use serde_json::json;
//!
//! let versioned = EnvelopeBuilder::default();
//! let req = versioned.request(Id::Number(1), "sum", Some(json!([1, 2])));
//! assert_eq!(codec::encode(&req).unwrap(), r#"{"jsonrpc":"2.0","id":1,"method":"sum","params":[1,2]}"#);
//!
//! let bare = EnvelopeBuilder::new(ProtocolMode::Bare);
//! let notif = bare.notification("ping", None);
//! assert_eq!(codec::encode(&notif).unwrap(), r#"{"method":"ping"}"#);
//! ```

use crate::error::ErrorObject;
use crate::types::{
    ErrorResponse, Id, Notification, Request, SuccessResponse, JSONRPC_VERSION,
};
use serde::{Deserialize, Serialize};

/// Whether outgoing envelopes carry the protocol version tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolMode {
    /// `"jsonrpc": "2.0"` on every envelope
    #[default]
    Versioned,
    /// Reduced-overhead mode, no version tag
    Bare,
}

/// Builds outgoing envelopes for one protocol mode
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeBuilder {
    mode: ProtocolMode,
}

impl EnvelopeBuilder {
    pub fn new(mode: ProtocolMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ProtocolMode {
        self.mode
    }

    pub fn request(
        &self,
        id: Id,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Request {
        Request {
            jsonrpc: self.tag(),
            id,
            method: method.into(),
            params,
        }
    }

    pub fn notification(
        &self,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Notification {
        Notification {
            jsonrpc: self.tag(),
            method: method.into(),
            params,
        }
    }

    pub fn success(&self, id: Id, result: serde_json::Value) -> SuccessResponse {
        SuccessResponse {
            jsonrpc: self.tag(),
            id,
            result,
        }
    }

    pub fn error(&self, id: Id, error: ErrorObject) -> ErrorResponse {
        ErrorResponse {
            jsonrpc: self.tag(),
            id,
            error,
        }
    }

    fn tag(&self) -> Option<String> {
        match self.mode {
            ProtocolMode::Versioned => Some(JSONRPC_VERSION.to_string()),
            ProtocolMode::Bare => None,
        }
    }
}
