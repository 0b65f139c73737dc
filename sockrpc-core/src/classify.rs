//! Message classification
//!
//! Decides which of the four envelope shapes an inbound JSON value is. The
//! checks run in a fixed priority order:
//!
//! 1. no `id` member: **Notification** (requires a string `method`)
//! 2. `method` present: **Request**
//! 3. `result` present: **SuccessResponse**
//! 4. `error` present: **ErrorResponse** (the error needs an integer `code`;
//!    `message` defaults to empty)
//!
//! Anything else is unclassifiable and yields `None`. The dispatcher treats
//! `None` as a silent drop, not as an error. Members outside the ones a
//! shape needs are ignored, so `{"id":1,"result":2,"extra":true}` is still a
//! success response.

use crate::types::{Envelope, ErrorResponse, Notification, Request, SuccessResponse};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Classify a decoded JSON value
///
/// # Examples
///
/// ```rust
/// use sockrpc_core::{classify, Envelope};
/// use serde_json::json;
///
/// let env = classify(&json!({"id": 1, "method": "sum", "params": [1, 2]})).unwrap();
/// assert!(matches!(env, Envelope::Request(_)));
///
/// assert!(classify(&json!({"hello": "world"})).is_none());
/// ```
pub fn classify(value: &Value) -> Option<Envelope> {
    let object = value.as_object()?;

    if !object.contains_key("id") {
        return if object.get("method").map_or(false, Value::is_string) {
            shape::<Notification>(object).map(Envelope::Notification)
        } else {
            None
        };
    }

    if object.contains_key("method") {
        shape::<Request>(object).map(Envelope::Request)
    } else if object.contains_key("result") {
        shape::<SuccessResponse>(object).map(Envelope::Success)
    } else if object.contains_key("error") {
        shape::<ErrorResponse>(object).map(Envelope::Error)
    } else {
        None
    }
}

pub fn is_notification(value: &Value) -> bool {
    matches!(classify(value), Some(Envelope::Notification(_)))
}

pub fn is_request(value: &Value) -> bool {
    matches!(classify(value), Some(Envelope::Request(_)))
}

pub fn is_success_response(value: &Value) -> bool {
    matches!(classify(value), Some(Envelope::Success(_)))
}

pub fn is_error_response(value: &Value) -> bool {
    matches!(classify(value), Some(Envelope::Error(_)))
}

fn shape<T: DeserializeOwned>(object: &Map<String, Value>) -> Option<T> {
    match serde_json::from_value(Value::Object(object.clone())) {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            tracing::debug!(error = %e, "Frame members do not fit the detected shape");
            None
        }
    }
}
