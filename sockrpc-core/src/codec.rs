//! JSON text codec for envelopes
//!
//! Thin layer over `serde_json` that maps its errors onto the crate's
//! [`Error`] variants:
//!
//! - text that is not JSON → `Error::Parse`
//! - values that cannot be serialized → `Error::Serialization`
//!
//! Decoding is split in two steps. [`decode`] only parses; classification
//! is a separate, infallible step ([`crate::classify`]), so a frame that
//! parses but has no recognizable shape is `Ok(None)` from
//! [`decode_envelope`] rather than an error.
//!
//! # Examples
//!
//! ```rust
//! use sockrpc_core::{codec, Envelope};
//!
//! let env = codec::decode_envelope(r#"{"jsonrpc":"2.0","id":"a","result":3}"#).unwrap();
//! assert!(matches!(env, Some(Envelope::Success(_))));
//!
//! assert!(codec::decode_envelope("{not json").is_err());
//! assert!(codec::decode_envelope(r#"{"unrelated":true}"#).unwrap().is_none());
//! ```

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::types::Envelope;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode any serializable message to a JSON string
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Parse JSON text into a value without interpreting its shape
pub fn decode(data: &str) -> Result<serde_json::Value> {
    serde_json::from_str(data).map_err(|e| Error::Parse(e.to_string()))
}

/// Parse JSON text and classify it
///
/// `Ok(None)` means the text was valid JSON but not a JSON-RPC envelope.
pub fn decode_envelope(data: &str) -> Result<Option<Envelope>> {
    Ok(classify(&decode(data)?))
}

/// Convert caller parameters into a JSON value
pub fn to_value<T: Serialize>(value: T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| Error::Serialization(e.to_string()))
}

/// Convert a JSON result into a caller type
pub fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::Serialization(e.to_string()))
}
