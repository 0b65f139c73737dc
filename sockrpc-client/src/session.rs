//! The RPC session
//!
//! [`RpcSession`] ties the pieces together: it builds envelopes, keeps the
//! pending-call table, owns the transport adapter, and fans inbound events
//! out to registered handlers.
//!
//! # Outbound
//!
//! `call` → generate id → build request → register waiter (and timer) →
//! send text frame → await settlement.
//!
//! `notify` → build notification → send text frame.
//!
//! # Inbound
//!
//! Each listened adapter gets two tasks. The dispatch task reads events
//! strictly in delivery order, runs the adapter's message hook, parses and
//! classifies frames and settles pending calls. Handler work is queued to a
//! fan-out task that runs it in the same order:
//!
//! - **Opened**: `open` handlers, then the session becomes `Open`, then a
//!   waiting `connect` returns
//! - **Message**: `any_message` handlers, then the envelope's category
//!   handlers; a response settles its pending call on the dispatch task
//!   without waiting for those handlers
//! - **Error**: `error` handlers; state is unchanged
//! - **Closed**: `close` handlers, then the session becomes `Closed` and a
//!   waiting `connect` fails. With `fail_pending_on_close`, the dispatch
//!   task fails every outstanding call with `ConnectionClosed` as soon as
//!   the close arrives.
//!
//! Handlers may await `call` on their own session: the response is settled
//! by the dispatch task while the handler waits.
//!
//! A frame that is not JSON is logged and counted as an error; a JSON frame
//! that is no envelope is dropped.
//!
//! # Cloning
//!
//! `RpcSession` is cheaply cloneable; clones share one session. The
//! dispatch and fan-out tasks only hold weak references, so dropping the last clone
//! ends dispatch and closes the outbound side of the transport.

use crate::config::SessionConfig;
use crate::connection_state::{ConnectionTracker, SessionState};
use crate::events::EventRegistry;
use crate::metrics::SessionMetrics;
use crate::pending::PendingCalls;
use crate::session_builder::SessionBuilder;
use crate::transport::{self, CloseInfo, Frame, FrameSink, MessageHook, SocketAdapter, TransportEvent};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sockrpc_core::{
    classify, codec, Envelope, EnvelopeBuilder, Error, ErrorResponse, IdGenerator, Notification,
    ProtocolMode, Request, Result, SuccessResponse,
};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;

/// JSON-RPC 2.0 client session over a message transport
#[derive(Clone)]
pub struct RpcSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    /// Outbound half of the current adapter
    sink: RwLock<Option<Arc<dyn FrameSink>>>,
    /// Adapter installed by `change_socket` but not yet listened to
    unbound: Mutex<Option<SocketAdapter>>,
    dispatch: Mutex<Option<JoinHandle<()>>>,
    /// Bumped by every `change_socket`; events from older adapters are stale
    generation: AtomicU64,
    pending: PendingCalls,
    events: EventRegistry,
    builder: RwLock<EnvelopeBuilder>,
    ids: RwLock<IdGenerator>,
    config: RwLock<SessionConfig>,
    state: ConnectionTracker,
    /// Completes the `connect` waiting for the adapter of that generation
    open_waiter: Mutex<Option<(u64, oneshot::Sender<Result<()>>)>>,
    metrics: Option<Arc<SessionMetrics>>,
}

impl RpcSession {
    /// Session with default configuration, UUID ids and versioned envelopes
    pub fn new() -> Self {
        Self::from_parts(
            SessionConfig::default(),
            IdGenerator::default(),
            ProtocolMode::Versioned,
            None,
        )
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub(crate) fn from_parts(
        config: SessionConfig,
        ids: IdGenerator,
        mode: ProtocolMode,
        metrics: Option<Arc<SessionMetrics>>,
    ) -> Self {
        let inner = SessionInner {
            sink: RwLock::new(None),
            unbound: Mutex::new(None),
            dispatch: Mutex::new(None),
            generation: AtomicU64::new(0),
            pending: PendingCalls::new(),
            events: EventRegistry::new(),
            builder: RwLock::new(EnvelopeBuilder::new(mode)),
            ids: RwLock::new(ids),
            config: RwLock::new(config),
            state: ConnectionTracker::new(),
            open_waiter: Mutex::new(None),
            metrics,
        };
        if let Some(ref m) = inner.metrics {
            m.update_state(SessionState::Unconnected);
        }
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Open a WebSocket connection and wait until it is open
    ///
    /// Replaces any adapter the session already had. Calls still pending
    /// on the old adapter are left to their timeouts.
    #[tracing::instrument(skip(self, url, protocols), fields(url = %url))]
    pub async fn connect(&self, url: &str, protocols: &[&str]) -> Result<()> {
        self.set_state(SessionState::Connecting).await;

        let adapter = match transport::ws::connect(url, protocols) {
            Ok(adapter) => adapter,
            Err(e) => {
                self.set_state(SessionState::Closed).await;
                return Err(e);
            }
        };

        let generation = self.install_socket(adapter).await;

        // installed before listening, so the Opened event cannot be missed
        let (tx, rx) = oneshot::channel();
        if let Some((_, abandoned)) = self.inner.open_waiter.lock().await.replace((generation, tx)) {
            let _ = abandoned.send(Err(Error::ConnectionClosed));
        }
        self.listen_messages().await?;

        rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Install a transport adapter without going through `connect`
    ///
    /// The adapter's events are not observed until [`listen_messages`]
    /// is called. The previous adapter, if any, stops being dispatched.
    ///
    /// [`listen_messages`]: RpcSession::listen_messages
    pub async fn change_socket(&self, adapter: SocketAdapter) {
        self.install_socket(adapter).await;
    }

    async fn install_socket(&self, adapter: SocketAdapter) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(task) = self.inner.dispatch.lock().await.take() {
            task.abort();
        }
        *self.inner.sink.write().await = Some(Arc::clone(&adapter.sink));
        *self.inner.unbound.lock().await = Some(adapter);
        tracing::debug!(generation, "Transport adapter replaced");
        generation
    }

    /// Start dispatching events from the installed adapter
    ///
    /// Calling it again for an adapter that is already dispatched does
    /// nothing.
    pub async fn listen_messages(&self) -> Result<()> {
        let adapter = match self.inner.unbound.lock().await.take() {
            Some(adapter) => adapter,
            None if self.inner.sink.read().await.is_some() => return Ok(()),
            None => return Err(Error::NotConnected),
        };

        let SocketAdapter {
            events,
            message_hook,
            ..
        } = adapter;

        let generation = self.inner.generation.load(Ordering::SeqCst);
        let (fan_out, jobs) = mpsc::unbounded_channel();
        tokio::spawn(fan_out_loop(Arc::downgrade(&self.inner), generation, jobs));
        let task = tokio::spawn(dispatch_loop(
            Arc::downgrade(&self.inner),
            generation,
            events,
            message_hook,
            fan_out,
        ));
        if let Some(previous) = self.inner.dispatch.lock().await.replace(task) {
            previous.abort();
        }
        Ok(())
    }

    /// Send a request and wait for its result
    ///
    /// Fails with the remote error object for an error response, with
    /// `Error::Timeout` when the configured response timeout passes first,
    /// or with `Error::ConnectionClosed` if the transport closes while
    /// waiting (and `fail_pending_on_close` is on).
    #[tracing::instrument(skip(self, method, params), fields(method = %method.as_ref()))]
    pub async fn call(
        &self,
        method: impl Into<String> + AsRef<str>,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let start = Instant::now();
        let method = method.into();
        let sink = self.sink().await?;

        let id = self.inner.ids.read().await.next_id();
        let request = self
            .inner
            .builder
            .read()
            .await
            .request(id.clone(), method.clone(), params);
        let text = codec::encode(&request)?;

        // the waiter exists before the frame leaves
        let timeout = self.inner.config.read().await.effective_timeout();
        let rx = self.inner.pending.register(id.clone(), method.clone(), timeout).await;

        if let Err(e) = sink.send(Frame::Text(text)) {
            self.inner.pending.evict(&id).await;
            self.record_call(&method, e.kind(), start);
            return Err(e);
        }
        tracing::debug!(id = %id, "Request sent, waiting for response");

        let outcome = match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Internal(
                "Pending call dropped before it settled".to_string(),
            )),
        };

        match &outcome {
            Ok(_) => {
                self.record_call(&method, "success", start);
                tracing::debug!(id = %id, "Call completed successfully");
            }
            Err(e) => {
                self.record_call(&method, e.kind(), start);
                tracing::debug!(id = %id, error = %e, "Call failed");
            }
        }
        outcome
    }

    /// Typed form of [`call`](RpcSession::call)
    ///
    /// Parameters that serialize to `null` (such as `()` or `None`) are
    /// sent without a `params` member.
    pub async fn request<P, R>(&self, method: impl Into<String> + AsRef<str>, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let params = codec::to_value(params)?;
        let params = if params.is_null() { None } else { Some(params) };
        let result = self.call(method, params).await?;
        codec::from_value(result)
    }

    /// Send a notification; no response is expected
    #[tracing::instrument(skip(self, method, params), fields(method = %method.as_ref()))]
    pub async fn notify(
        &self,
        method: impl Into<String> + AsRef<str>,
        params: Option<serde_json::Value>,
    ) -> Result<()> {
        let method = method.into();
        let sink = self.sink().await?;

        let notification = self
            .inner
            .builder
            .read()
            .await
            .notification(method.clone(), params);
        sink.send(Frame::Text(codec::encode(&notification)?))?;

        if let Some(ref m) = self.inner.metrics {
            m.record_notification(&method);
        }
        Ok(())
    }

    /// Ask the transport to close the connection
    pub async fn disconnect(&self) -> Result<()> {
        self.sink().await?.send(Frame::Close)
    }

    pub async fn on_open<F, Fut>(&self, handler: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.events.open.push(move |()| handler()).await;
    }

    /// Every inbound text frame, before classification
    pub async fn on_any_message<F, Fut>(&self, handler: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.events.any_message.push(handler).await;
    }

    pub async fn on_error<F, Fut>(&self, handler: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.events.error.push(handler).await;
    }

    pub async fn on_close<F, Fut>(&self, handler: F)
    where
        F: Fn(CloseInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.events.close.push(handler).await;
    }

    pub async fn on_notification<F, Fut>(&self, handler: F)
    where
        F: Fn(Notification) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.events.notification.push(handler).await;
    }

    /// Inbound requests; the session never answers them itself
    pub async fn on_request<F, Fut>(&self, handler: F)
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.events.request.push(handler).await;
    }

    /// Every success response, whether or not it matches a pending call
    pub async fn on_success_response<F, Fut>(&self, handler: F)
    where
        F: Fn(SuccessResponse) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.events.success_response.push(handler).await;
    }

    /// Every error response, whether or not it matches a pending call
    pub async fn on_error_response<F, Fut>(&self, handler: F)
    where
        F: Fn(ErrorResponse) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.events.error_response.push(handler).await;
    }

    /// Use `generator` for the ids of subsequent calls
    pub async fn custom_id(&self, generator: IdGenerator) {
        *self.inner.ids.write().await = generator;
    }

    /// Stop writing the `jsonrpc` version tag on outgoing envelopes
    pub async fn no_rpc(&self) {
        *self.inner.builder.write().await = EnvelopeBuilder::new(ProtocolMode::Bare);
    }

    pub async fn protocol_mode(&self) -> ProtocolMode {
        self.inner.builder.read().await.mode()
    }

    pub async fn configure(&self, config: SessionConfig) {
        tracing::debug!(?config, "Session reconfigured");
        *self.inner.config.write().await = config;
    }

    pub async fn config(&self) -> SessionConfig {
        self.inner.config.read().await.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.inner.state.state().await
    }

    pub async fn pending_count(&self) -> usize {
        self.inner.pending.pending_count().await
    }

    async fn sink(&self) -> Result<Arc<dyn FrameSink>> {
        self.inner
            .sink
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(Error::NotConnected)
    }

    async fn set_state(&self, state: SessionState) {
        self.inner.state.set_state(state).await;
        if let Some(ref m) = self.inner.metrics {
            m.update_state(state);
        }
    }

    fn record_call(&self, method: &str, outcome: &str, start: Instant) {
        if let Some(ref m) = self.inner.metrics {
            m.record_call(method, outcome, start.elapsed().as_secs_f64());
        }
    }

    fn record_error(&self, kind: &'static str) {
        if let Some(ref m) = self.inner.metrics {
            m.record_error(kind);
        }
    }

    async fn settle_open_waiter(&self, generation: u64, outcome: Result<()>) {
        let mut waiter = self.inner.open_waiter.lock().await;
        if matches!(*waiter, Some((g, _)) if g == generation) {
            if let Some((_, tx)) = waiter.take() {
                let _ = tx.send(outcome);
            }
        }
    }

    async fn handle_event(
        &self,
        generation: u64,
        event: TransportEvent,
        hook: Option<&MessageHook>,
        fan_out: &mpsc::UnboundedSender<FanOut>,
    ) {
        match event {
            TransportEvent::Opened => {
                tracing::info!("Transport opened");
                queue(fan_out, FanOut::Opened);
            }
            TransportEvent::Message(text) => {
                if let Some(hook) = hook {
                    if std::panic::catch_unwind(AssertUnwindSafe(|| hook(text.as_str()))).is_err() {
                        tracing::error!("Adapter message hook panicked");
                    }
                }
                queue(fan_out, FanOut::Message(text.clone()));
                if let Err(e) = self.dispatch_frame(&text, fan_out).await {
                    tracing::error!(error = %e, "Error handling message");
                    self.record_error(e.kind());
                }
            }
            TransportEvent::Error(reason) => {
                tracing::warn!(error = %reason, "Transport error");
                self.record_error("transport");
                queue(fan_out, FanOut::Error(reason));
            }
            TransportEvent::Closed(info) => {
                tracing::info!(code = info.code, reason = %info.reason, "Transport closed");
                queue(fan_out, FanOut::Closed(info));

                let fail_pending = self.inner.config.read().await.fail_pending_on_close;
                if fail_pending {
                    let failed = self.inner.pending.fail_all(Error::ConnectionClosed).await;
                    if failed > 0 {
                        tracing::warn!(failed, "Failed pending calls on close");
                    }
                }
            }
        }
    }

    async fn dispatch_frame(&self, text: &str, fan_out: &mpsc::UnboundedSender<FanOut>) -> Result<()> {
        let value = codec::decode(text)?;

        let Some(envelope) = classify(&value) else {
            tracing::debug!("Dropping unclassifiable frame");
            if let Some(ref m) = self.inner.metrics {
                m.record_frame("unclassified");
            }
            return Ok(());
        };

        if let Some(ref m) = self.inner.metrics {
            m.record_frame(envelope.category());
        }

        let settlement = match &envelope {
            Envelope::Success(resp) => Some((resp.id.clone(), Ok(resp.result.clone()))),
            Envelope::Error(resp) => Some((resp.id.clone(), Err(Error::JsonRpc(resp.error.clone())))),
            Envelope::Notification(n) => {
                tracing::debug!(method = %n.method, "Notification received");
                None
            }
            Envelope::Request(r) => {
                tracing::debug!(method = %r.method, id = %r.id, "Request received");
                None
            }
        };

        queue(fan_out, FanOut::Envelope(envelope));

        if let Some((id, outcome)) = settlement {
            if !self.inner.pending.resolve(&id, outcome).await {
                tracing::debug!(id = %id, "Response matched no pending call");
            }
        }

        Ok(())
    }

    async fn run_handlers(&self, generation: u64, job: FanOut) {
        let events = &self.inner.events;
        match job {
            FanOut::Opened => {
                events.open.emit(()).await;
                self.set_state(SessionState::Open).await;
                self.settle_open_waiter(generation, Ok(())).await;
            }
            FanOut::Message(text) => {
                events.any_message.emit(text).await;
            }
            FanOut::Envelope(envelope) => {
                events.emit_envelope(envelope).await;
            }
            FanOut::Error(reason) => {
                events.error.emit(reason).await;
            }
            FanOut::Closed(info) => {
                events.close.emit(info).await;
                self.set_state(SessionState::Closed).await;
                self.settle_open_waiter(generation, Err(Error::ConnectionClosed))
                    .await;
            }
        }
    }
}

impl Default for RpcSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler work handed from a dispatch task to its fan-out task
enum FanOut {
    Opened,
    Message(String),
    Envelope(Envelope),
    Error(String),
    Closed(CloseInfo),
}

fn queue(fan_out: &mpsc::UnboundedSender<FanOut>, job: FanOut) {
    if fan_out.send(job).is_err() {
        tracing::debug!("Fan-out task gone, dropping handler work");
    }
}

async fn dispatch_loop(
    session: Weak<SessionInner>,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    hook: Option<MessageHook>,
    fan_out: mpsc::UnboundedSender<FanOut>,
) {
    let mut saw_close = false;

    while let Some(event) = events.recv().await {
        let Some(inner) = session.upgrade() else {
            return;
        };
        if inner.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        saw_close |= matches!(event, TransportEvent::Closed(_));
        RpcSession { inner }
            .handle_event(generation, event, hook.as_ref(), &fan_out)
            .await;
    }

    // the adapter went away without reporting a close
    if !saw_close {
        if let Some(inner) = session.upgrade() {
            if inner.generation.load(Ordering::SeqCst) == generation {
                RpcSession { inner }
                    .handle_event(
                        generation,
                        TransportEvent::Closed(CloseInfo::abnormal()),
                        None,
                        &fan_out,
                    )
                    .await;
            }
        }
    }
}

/// Runs queued handler work in order until the dispatch task drops its sender
async fn fan_out_loop(
    session: Weak<SessionInner>,
    generation: u64,
    mut jobs: mpsc::UnboundedReceiver<FanOut>,
) {
    while let Some(job) = jobs.recv().await {
        let Some(inner) = session.upgrade() else {
            return;
        };
        if inner.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        RpcSession { inner }.run_handlers(generation, job).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory;
    use serde_json::json;
    use sockrpc_core::{ErrorObject, Id};
    use std::time::Duration;

    async fn attached() -> (RpcSession, memory::MemoryPeer) {
        let session = RpcSession::new();
        let (adapter, peer) = memory::pair();
        session.change_socket(adapter).await;
        session.listen_messages().await.unwrap();
        peer.open();
        (session, peer)
    }

    #[tokio::test]
    async fn test_call_without_transport() {
        let session = RpcSession::new();
        assert!(matches!(session.call("sum", None).await, Err(Error::NotConnected)));
        assert!(matches!(session.notify("ping", None).await, Err(Error::NotConnected)));
        assert!(matches!(session.listen_messages().await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_call_resolves_with_result() {
        let (session, mut peer) = attached().await;

        let caller = session.clone();
        let call = tokio::spawn(async move { caller.call("sum", Some(json!([1, 2]))).await });

        let sent = peer.recv_json().await.unwrap();
        assert_eq!(sent["method"], "sum");
        assert_eq!(sent["params"], json!([1, 2]));
        assert_eq!(sent["jsonrpc"], "2.0");

        peer.deliver_json(&json!({"jsonrpc": "2.0", "id": sent["id"], "result": 3}));
        assert_eq!(call.await.unwrap().unwrap(), json!(3));
        assert_eq!(session.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_call_rejects_with_remote_error() {
        let (session, mut peer) = attached().await;

        let caller = session.clone();
        let call = tokio::spawn(async move { caller.call("sum", None).await });

        let sent = peer.recv_json().await.unwrap();
        assert!(sent.get("params").is_none());
        peer.deliver_json(&json!({
            "id": sent["id"],
            "error": {"code": -32602, "message": "Invalid params", "data": "need two"}
        }));

        match call.await.unwrap() {
            Err(Error::JsonRpc(obj)) => {
                assert_eq!(obj, ErrorObject::with_data(-32602, "Invalid params", json!("need two")));
            }
            other => panic!("Expected remote error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_call_times_out() {
        let (session, mut peer) = attached().await;
        session
            .configure(SessionConfig::default().with_response_timeout(Duration::from_millis(30)))
            .await;

        let result = session.call("sum", Some(json!([1, 2]))).await;
        let sent = peer.recv_json().await.unwrap();

        match result {
            Err(Error::Timeout { method, id }) => {
                assert_eq!(method, "sum");
                assert_eq!(serde_json::to_value(&id).unwrap(), sent["id"]);
            }
            other => panic!("Expected timeout, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_custom_id_and_no_rpc() {
        let (session, mut peer) = attached().await;
        session.custom_id(IdGenerator::from_fn(|| Id::Number(42))).await;
        session.no_rpc().await;
        assert_eq!(session.protocol_mode().await, ProtocolMode::Bare);

        let caller = session.clone();
        let call = tokio::spawn(async move { caller.call("answer", None).await });

        assert_eq!(
            peer.recv_text().await.as_deref(),
            Some(r#"{"id":42,"method":"answer"}"#)
        );
        peer.deliver(r#"{"id":42,"result":"ok"}"#);
        assert_eq!(call.await.unwrap().unwrap(), json!("ok"));
    }

    #[tokio::test]
    async fn test_typed_request() {
        #[derive(serde::Serialize)]
        struct Pair {
            a: i32,
            b: i32,
        }

        let (session, mut peer) = attached().await;
        session.custom_id(IdGenerator::sequential()).await;

        let caller = session.clone();
        let call = tokio::spawn(async move { caller.request::<_, i32>("add", Pair { a: 2, b: 3 }).await });

        let sent = peer.recv_json().await.unwrap();
        assert_eq!(sent["params"], json!({"a": 2, "b": 3}));
        assert_eq!(sent["id"], json!(0));
        peer.deliver_json(&json!({"id": 0, "result": 5}));

        assert_eq!(call.await.unwrap().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_typed_request_without_params() {
        let (session, mut peer) = attached().await;

        let caller = session.clone();
        let call = tokio::spawn(async move { caller.request::<_, String>("version", ()).await });

        let sent = peer.recv_json().await.unwrap();
        assert!(sent.get("params").is_none());
        peer.deliver_json(&json!({"id": sent["id"], "result": "1.0"}));

        assert_eq!(call.await.unwrap().unwrap(), "1.0");
    }

    #[tokio::test]
    async fn test_send_failure_evicts_waiter() {
        let session = RpcSession::new();
        let (adapter, peer) = memory::pair();
        session.change_socket(adapter).await;
        drop(peer);

        assert!(matches!(session.call("sum", None).await, Err(Error::ConnectionClosed)));
        assert_eq!(session.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_sends_close_frame() {
        let (session, mut peer) = attached().await;
        session.disconnect().await.unwrap();
        assert_eq!(peer.recv().await, Some(Frame::Close));
    }
}
