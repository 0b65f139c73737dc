//! Session lifecycle state
//!
//! ```text
//! Unconnected ──connect()──▶ Connecting ──Opened──▶ Open ──Closed──▶ Closed
//!                                 └──────────────Closed──────────────▲
//! ```
//!
//! The state is advisory. `change_socket` swaps the transport without
//! passing through these transitions, and a second `connect` while `Open`
//! simply starts over at `Connecting`. Nothing refuses an operation because
//! of the current state; a closed transport reports its own failure when
//! written to.

use std::sync::Arc;
use tokio::sync::RwLock;

/// Where the session is in its transport lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connect attempted yet
    Unconnected,
    /// Waiting for the transport to open
    Connecting,
    /// Transport reported opened
    Open,
    /// Transport reported closed
    Closed,
}

impl SessionState {
    /// Numeric encoding used by the state gauge
    pub fn as_metric(self) -> i64 {
        match self {
            SessionState::Unconnected => 0,
            SessionState::Connecting => 1,
            SessionState::Open => 2,
            SessionState::Closed => 3,
        }
    }
}

/// Shared holder of the current [`SessionState`]
#[derive(Clone)]
pub struct ConnectionTracker {
    state: Arc<RwLock<SessionState>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::Unconnected)),
        }
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Replace the state, returning the previous one
    pub async fn set_state(&self, new_state: SessionState) -> SessionState {
        let mut state = self.state.write().await;
        let previous = *state;
        *state = new_state;
        if previous != new_state {
            tracing::debug!(from = ?previous, to = ?new_state, "Session state changed");
        }
        previous
    }

    pub async fn connecting(&self) {
        self.set_state(SessionState::Connecting).await;
    }

    pub async fn opened(&self) {
        self.set_state(SessionState::Open).await;
    }

    pub async fn closed(&self) {
        self.set_state(SessionState::Closed).await;
    }

    pub async fn is_open(&self) -> bool {
        self.state().await == SessionState::Open
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}
