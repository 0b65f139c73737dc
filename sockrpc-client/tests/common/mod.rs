//! Common test utilities for sockrpc-client integration tests
//!
//! Provides a mock WebSocket server, an attached in-memory session, and a
//! recorder that turns handler invocations into an ordered stream of tags.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use sockrpc_client::transport::memory::{self, MemoryPeer};
use sockrpc_client::RpcSession;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Clone, Debug)]
enum Control {
    Push(String),
    Close,
}

/// Mock WebSocket server for session testing
///
/// Every text frame it receives is forwarded to the test (see
/// [`wait_for_message`](MockWsServer::wait_for_message)) and passed to the
/// handler; whatever the handler returns is written back.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    control_tx: broadcast::Sender<Control>,
    message_rx: mpsc::Receiver<String>,
}

impl MockWsServer {
    /// Start a server that never answers
    pub async fn new() -> Self {
        Self::with_handler(|_| async { None }).await
    }

    /// Start a server with a custom message handler
    pub async fn with_handler<F, Fut>(handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Option<String>> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (msg_tx, msg_rx) = mpsc::channel::<String>(100);
        let (control_tx, _) = broadcast::channel::<Control>(16);
        let handler = Arc::new(handler);
        let controls = control_tx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        let msg_tx = msg_tx.clone();
                        let handler = Arc::clone(&handler);
                        let mut control_rx = controls.subscribe();

                        tokio::spawn(async move {
                            let Ok(ws_stream) = accept_async(stream).await else { return };
                            let (mut write, mut read) = ws_stream.split();

                            loop {
                                tokio::select! {
                                    incoming = read.next() => match incoming {
                                        Some(Ok(Message::Text(text))) => {
                                            let _ = msg_tx.send(text.clone()).await;
                                            if let Some(response) = handler(text).await {
                                                let _ = write.send(Message::Text(response)).await;
                                            }
                                        }
                                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                                        Some(Ok(_)) => {}
                                    },
                                    control = control_rx.recv() => match control {
                                        Ok(Control::Push(text)) => {
                                            let _ = write.send(Message::Text(text)).await;
                                        }
                                        Ok(Control::Close) | Err(_) => {
                                            let _ = write.send(Message::Close(None)).await;
                                            break;
                                        }
                                    },
                                }
                            }
                        });
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            control_tx,
            message_rx: msg_rx,
        }
    }

    /// Get the WebSocket URL for connecting to this server
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Send a text frame to every connected client
    pub fn push(&self, text: impl Into<String>) {
        let _ = self.control_tx.send(Control::Push(text.into()));
    }

    /// Close every client connection
    pub fn close_all(&self) {
        let _ = self.control_tx.send(Control::Close);
    }

    /// Wait for a message to be received by the server
    pub async fn wait_for_message(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(5), self.message_rx.recv())
            .await
            .ok()
            .flatten()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Handler answering `sum` requests with the sum of their params array
pub async fn sum_handler(text: String) -> Option<String> {
    let request: serde_json::Value = serde_json::from_str(&text).ok()?;
    if request["method"] != "sum" {
        return None;
    }
    let total: i64 = request["params"]
        .as_array()?
        .iter()
        .filter_map(|v| v.as_i64())
        .sum();
    Some(mock_response(request["id"].clone(), serde_json::json!(total)))
}

/// Helper to create a mock JSON-RPC response
pub fn mock_response(id: serde_json::Value, result: serde_json::Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": id
    })
    .to_string()
}

/// Helper to create a mock JSON-RPC error response
pub fn mock_error_response(id: serde_json::Value, code: i64, message: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "error": {
            "code": code,
            "message": message
        },
        "id": id
    })
    .to_string()
}

/// Helper to create a mock JSON-RPC notification
pub fn mock_notification(method: &str, params: serde_json::Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params
    })
    .to_string()
}

/// Session listening on an in-memory transport that has already opened
pub async fn attached_session() -> (RpcSession, MemoryPeer) {
    let session = RpcSession::new();
    let (adapter, peer) = memory::pair();
    session.change_socket(adapter).await;
    session.listen_messages().await.unwrap();
    peer.open();
    (session, peer)
}

/// Collects tags from handlers in the order they ran
#[derive(Clone)]
pub struct Recorder {
    tx: mpsc::UnboundedSender<String>,
}

impl Recorder {
    pub fn record(&self, tag: impl Into<String>) {
        let _ = self.tx.send(tag.into());
    }
}

pub fn recorder() -> (Recorder, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Recorder { tx }, rx)
}

/// Next recorded tag, failing the test if none arrives in time
pub async fn next_tag(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a handler")
        .expect("recorder dropped")
}

/// Register a recording handler on each of the eight event lists
pub async fn record_everything(session: &RpcSession, rec: &Recorder) {
    let r = rec.clone();
    session
        .on_open(move || {
            let r = r.clone();
            async move { r.record("open") }
        })
        .await;
    let r = rec.clone();
    session
        .on_any_message(move |_| {
            let r = r.clone();
            async move { r.record("any") }
        })
        .await;
    let r = rec.clone();
    session
        .on_error(move |reason| {
            let r = r.clone();
            async move { r.record(format!("error:{}", reason)) }
        })
        .await;
    let r = rec.clone();
    session
        .on_close(move |info| {
            let r = r.clone();
            async move { r.record(format!("close:{}", info.code)) }
        })
        .await;
    let r = rec.clone();
    session
        .on_notification(move |n| {
            let r = r.clone();
            async move { r.record(format!("notification:{}", n.method)) }
        })
        .await;
    let r = rec.clone();
    session
        .on_request(move |req| {
            let r = r.clone();
            async move { r.record(format!("request:{}", req.method)) }
        })
        .await;
    let r = rec.clone();
    session
        .on_success_response(move |resp| {
            let r = r.clone();
            async move { r.record(format!("success:{}", resp.id)) }
        })
        .await;
    let r = rec.clone();
    session
        .on_error_response(move |resp| {
            let r = r.clone();
            async move { r.record(format!("error_response:{}", resp.error.code)) }
        })
        .await;
}
