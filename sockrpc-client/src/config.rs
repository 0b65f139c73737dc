//! Session configuration
//!
//! [`SessionConfig`] can be replaced at any time with
//! `RpcSession::configure`. A new response timeout applies to calls made
//! after the change; calls already in flight keep the timer they were
//! given.
//!
//! ```rust
//! use sockrpc_client::SessionConfig;
//! use std::time::Duration;
//!
//! let config = SessionConfig::default().with_response_timeout(Duration::from_secs(5));
//! assert_eq!(config.effective_timeout(), Some(Duration::from_secs(5)));
//!
//! // zero turns the guard off
//! let config = config.with_response_timeout(Duration::ZERO);
//! assert_eq!(config.effective_timeout(), None);
//! ```

use serde::{Deserialize, Serialize};
use sockrpc_core::{Error, Result};
use std::time::Duration;

/// Environment variable read by [`SessionConfig::from_env`]
pub const RESPONSE_TIMEOUT_ENV: &str = "SOCKRPC_RESPONSE_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a call waits for its response; `None` or zero waits forever
    pub response_timeout: Option<Duration>,

    /// Fail every outstanding call with `ConnectionClosed` when the
    /// transport closes, instead of leaving each to its own timeout
    pub fail_pending_on_close: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            response_timeout: None,
            fail_pending_on_close: true,
        }
    }
}

impl SessionConfig {
    /// Defaults, with the response timeout taken from
    /// `SOCKRPC_RESPONSE_TIMEOUT_MS` when it is set
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(RESPONSE_TIMEOUT_ENV) {
            config.response_timeout = Some(parse_millis(&raw)?);
        }
        Ok(config)
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    pub fn without_response_timeout(mut self) -> Self {
        self.response_timeout = None;
        self
    }

    pub fn with_fail_pending_on_close(mut self, enable: bool) -> Self {
        self.fail_pending_on_close = enable;
        self
    }

    /// The timeout to arm for a new call, if any
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.response_timeout.filter(|t| !t.is_zero())
    }
}

fn parse_millis(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| Error::Internal(format!("Invalid {}={:?}: {}", RESPONSE_TIMEOUT_ENV, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.response_timeout, None);
        assert_eq!(config.effective_timeout(), None);
        assert!(config.fail_pending_on_close);
    }

    #[test]
    fn test_builder_methods() {
        let config = SessionConfig::default()
            .with_response_timeout(Duration::from_millis(50))
            .with_fail_pending_on_close(false);

        assert_eq!(config.effective_timeout(), Some(Duration::from_millis(50)));
        assert!(!config.fail_pending_on_close);

        let config = config.without_response_timeout();
        assert_eq!(config.effective_timeout(), None);
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(parse_millis("250").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_millis(" 0 ").unwrap(), Duration::ZERO);
        assert!(parse_millis("soon").is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"response_timeout":{"secs":2,"nanos":0}}"#).unwrap();
        assert_eq!(config.response_timeout, Some(Duration::from_secs(2)));
        assert!(config.fail_pending_on_close);
    }
}
