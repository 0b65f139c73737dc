//! Session builder for configuring timeouts, ids and observability
//!
//! The `SessionBuilder` provides a fluent API for everything that is
//! decided before the first call:
//! - Response timeout and close behavior
//! - Request id generation
//! - Bare envelopes without the `jsonrpc` tag
//! - Observability (OpenTelemetry) and the service name it reports
//!
//! # Examples
//!
//! ```rust,no_run
//! use sockrpc_client::SessionBuilder;
//! use sockrpc_core::IdGenerator;
//! use std::time::Duration;
//!
//! # async fn example() -> sockrpc_core::Result<()> {
//! let session = SessionBuilder::new()
//!     .response_timeout(Duration::from_secs(5))
//!     .id_generator(IdGenerator::sequential())
//!     .connect("ws://localhost:8080", &[])
//!     .await?;
//!
//! // With observability
//! let traced = SessionBuilder::new()
//!     .with_default_observability()
//!     .service_name("ticker-client")
//!     .connect("ws://localhost:8080", &["jsonrpc"])
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::SessionConfig;
use crate::metrics::SessionMetrics;
use crate::RpcSession;
use sockrpc_core::{Error, IdGenerator, ObservabilityConfig, ProtocolMode, Result};
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring and creating an [`RpcSession`]
pub struct SessionBuilder {
    config: SessionConfig,
    id_generator: IdGenerator,
    mode: ProtocolMode,
    observability_config: Option<ObservabilityConfig>,
    service_name: Option<String>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            id_generator: IdGenerator::default(),
            mode: ProtocolMode::Versioned,
            observability_config: None,
            service_name: None,
        }
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Fail calls that get no response within `timeout` (zero disables)
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_response_timeout(timeout);
        self
    }

    pub fn fail_pending_on_close(mut self, enable: bool) -> Self {
        self.config = self.config.with_fail_pending_on_close(enable);
        self
    }

    pub fn id_generator(mut self, generator: IdGenerator) -> Self {
        self.id_generator = generator;
        self
    }

    /// Omit the `jsonrpc` member from outgoing envelopes
    pub fn no_rpc(mut self) -> Self {
        self.mode = ProtocolMode::Bare;
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build an unconnected session
    ///
    /// With observability configured this installs the global subscriber
    /// and providers, which fails if another one is already installed.
    pub fn build(self) -> Result<RpcSession> {
        let metrics = match self.observability_config {
            Some(mut config) => {
                if let Some(name) = self.service_name {
                    config.service_name = name;
                }

                sockrpc_core::init_observability(config.clone()).map_err(|e| {
                    Error::Internal(format!("Failed to initialize observability: {}", e))
                })?;

                Some(Arc::new(SessionMetrics::new(config.service_name)))
            }
            None => None,
        };

        Ok(RpcSession::from_parts(
            self.config,
            self.id_generator,
            self.mode,
            metrics,
        ))
    }

    /// Build the session and connect it to `url`
    pub async fn connect(self, url: &str, protocols: &[&str]) -> Result<RpcSession> {
        let session = self.build()?;
        session.connect(url, protocols).await?;
        Ok(session)
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
