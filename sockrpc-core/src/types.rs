//! JSON-RPC 2.0 envelope types
//!
//! The protocol has four envelope shapes, told apart by which members are
//! present rather than by an explicit discriminant:
//!
//! 1. **Notification**: `{method, params?}`, no identifier
//! 2. **Request**: `{id, method, params?}`
//! 3. **SuccessResponse**: `{id, result}`
//! 4. **ErrorResponse**: `{id, error: {code, message?, data?}}`
//!
//! Each carries an optional `jsonrpc` tag. Envelopes built in versioned mode
//! set it to `"2.0"`; bare mode leaves it out of the serialized JSON
//! entirely. Inbound envelopes record whatever tag the peer sent.
//!
//! [`Envelope`] is the sum of the four shapes. Untrusted input only becomes
//! an `Envelope` through [`crate::classify`].

use crate::error::ErrorObject;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version tag carried by versioned envelopes
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request identifier
///
/// Identifiers correlate a request with its response and must be unique
/// among the calls currently outstanding on one session.
///
/// `Null` only shows up inbound: peers answer requests they could not parse
/// with a null id, and such a response never matches a pending call.
///
/// # Examples
///
/// ```rust
/// use sockrpc_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier, the default generator produces UUIDs
    String(String),
    /// Numeric identifier
    Number(i64),
    /// Null identifier
    Null,
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

impl TryFrom<u64> for Id {
    type Error = std::num::TryFromIntError;

    /// Fails for values above `i64::MAX`.
    fn try_from(n: u64) -> std::result::Result<Self, Self::Error> {
        i64::try_from(n).map(Id::Number)
    }
}

/// A call that expects no response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// A call whose response is correlated through `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub id: Id,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// A response carrying the method's result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub id: Id,
    pub result: serde_json::Value,
}

/// A response carrying an error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub id: Id,
    pub error: ErrorObject,
}

/// Any single JSON-RPC message
///
/// Serializes as the inner envelope with no extra tag, so an `Envelope`
/// can be handed straight to the codec.
///
/// ```rust
/// use sockrpc_core::{classify, Envelope};
/// use serde_json::json;
///
/// let message = classify(&json!({"jsonrpc": "2.0", "id": 1, "result": 3})).unwrap();
/// match message {
///     Envelope::Success(resp) => assert_eq!(resp.result, json!(3)),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Notification(Notification),
    Request(Request),
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl Envelope {
    /// Identifier of the envelope, `None` for notifications
    pub fn id(&self) -> Option<&Id> {
        match self {
            Envelope::Notification(_) => None,
            Envelope::Request(req) => Some(&req.id),
            Envelope::Success(resp) => Some(&resp.id),
            Envelope::Error(resp) => Some(&resp.id),
        }
    }

    /// Name used for this envelope's category in logs and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Envelope::Notification(_) => "notification",
            Envelope::Request(_) => "request",
            Envelope::Success(_) => "success_response",
            Envelope::Error(_) => "error_response",
        }
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Envelope::Success(_) | Envelope::Error(_))
    }
}

impl From<Notification> for Envelope {
    fn from(n: Notification) -> Self {
        Envelope::Notification(n)
    }
}

impl From<Request> for Envelope {
    fn from(r: Request) -> Self {
        Envelope::Request(r)
    }
}

impl From<SuccessResponse> for Envelope {
    fn from(r: SuccessResponse) -> Self {
        Envelope::Success(r)
    }
}

impl From<ErrorResponse> for Envelope {
    fn from(r: ErrorResponse) -> Self {
        Envelope::Error(r)
    }
}
