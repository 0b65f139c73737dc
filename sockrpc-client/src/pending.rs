//! Pending-call table
//!
//! Tracks every `call` that has been sent but not yet answered.
//!
//! # Call Lifecycle
//!
//! 1. **Register**: the session generates an id and registers a waiter
//!    (a oneshot sender) under it, before anything is sent
//! 2. **Arm**: with a non-zero response timeout, a timer task is spawned
//!    for the same id
//! 3. **Send**: the request goes out on the transport
//! 4. **Settle**: whichever comes first wins
//!    - a response with that id: the record is removed, the timer aborted,
//!      and the waiter gets the result or the remote error
//!    - the timer: the record is removed and the waiter gets
//!      `Error::Timeout` naming the method and id
//!
//! Both paths remove the record under the table lock before completing the
//! waiter, so whichever runs second finds nothing and does nothing. A call
//! is settled at most once.
//!
//! Registering an id that is already outstanding replaces the older
//! record. The older caller's waiter is dropped and its timer aborted, so
//! it observes a closed channel instead of a response.

use sockrpc_core::{Error, Id, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

/// What a waiter eventually receives
pub type CallOutcome = Result<serde_json::Value>;

struct PendingCall {
    method: String,
    tx: oneshot::Sender<CallOutcome>,
    timer: Option<JoinHandle<()>>,
}

impl PendingCall {
    fn settle(self, outcome: CallOutcome) {
        if let Some(timer) = self.timer {
            timer.abort();
        }
        let _ = self.tx.send(outcome);
    }
}

/// Table of outstanding calls keyed by request id
#[derive(Clone)]
pub struct PendingCalls {
    pending: Arc<Mutex<HashMap<Id, PendingCall>>>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a waiter for `id`
    ///
    /// `timeout` of `None` or zero means the call waits until a response
    /// arrives or the record is failed some other way.
    pub async fn register(
        &self,
        id: Id,
        method: impl Into<String>,
        timeout: Option<Duration>,
    ) -> oneshot::Receiver<CallOutcome> {
        let (tx, rx) = oneshot::channel();
        let method = method.into();

        let mut pending = self.pending.lock().await;
        let timer = timeout
            .filter(|after| !after.is_zero())
            .map(|after| self.arm_timer(id.clone(), after));

        let call = PendingCall { method, tx, timer };
        if let Some(previous) = pending.insert(id.clone(), call) {
            tracing::warn!(
                id = %id,
                method = %previous.method,
                "Request id reused while outstanding, earlier call orphaned"
            );
            if let Some(timer) = previous.timer {
                timer.abort();
            }
        }

        rx
    }

    /// Settle the call registered under `id`
    ///
    /// Returns false if no call was waiting, which is the normal case for
    /// a response that arrives after its call timed out.
    pub async fn resolve(&self, id: &Id, outcome: CallOutcome) -> bool {
        let call = self.pending.lock().await.remove(id);
        match call {
            Some(call) => {
                tracing::debug!(id = %id, method = %call.method, "Pending call settled");
                call.settle(outcome);
                true
            }
            None => false,
        }
    }

    /// Drop the call registered under `id` without settling it
    pub async fn evict(&self, id: &Id) -> bool {
        match self.pending.lock().await.remove(id) {
            Some(call) => {
                if let Some(timer) = call.timer {
                    timer.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Fail every outstanding call with `error`
    pub async fn fail_all(&self, error: Error) -> usize {
        let drained: Vec<PendingCall> = self.pending.lock().await.drain().map(|(_, c)| c).collect();
        let count = drained.len();
        for call in drained {
            call.settle(Err(error.clone()));
        }
        count
    }

    pub async fn contains(&self, id: &Id) -> bool {
        self.pending.lock().await.contains_key(id)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    fn arm_timer(&self, id: Id, after: Duration) -> JoinHandle<()> {
        let table = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            table.expire(id).await;
        })
    }

    async fn expire(&self, id: Id) {
        let call = self.pending.lock().await.remove(&id);
        if let Some(call) = call {
            tracing::warn!(id = %id, method = %call.method, "Call timed out");
            let _ = call.tx.send(Err(Error::Timeout {
                method: call.method,
                id,
            }));
        }
    }
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self::new()
    }
}
