//! In-process transport
//!
//! [`pair`] returns a [`SocketAdapter`] for a session together with the
//! [`MemoryPeer`] standing on the other side of it. The peer raises
//! transport events and reads back whatever the session sent. Tests use it
//! in place of a real socket; applications can use it to bridge a
//! connection that was opened outside the session.
//!
//! ```rust
//! use sockrpc_client::{transport::memory, RpcSession};
//!
//! # async fn example() -> sockrpc_core::Result<()> {
//! let (adapter, mut peer) = memory::pair();
//! let session = RpcSession::new();
//! session.change_socket(adapter).await;
//! session.listen_messages().await?;
//!
//! peer.open();
//! session.notify("ping", None).await?;
//! assert_eq!(peer.recv_text().await.as_deref(), Some(r#"{"jsonrpc":"2.0","method":"ping"}"#));
//! # Ok(())
//! # }
//! ```

use super::{ChannelSink, CloseInfo, Frame, SocketAdapter, TransportEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Create a connected adapter/peer pair
pub fn pair() -> (SocketAdapter, MemoryPeer) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (frame_tx, frame_rx) = mpsc::unbounded_channel();

    let adapter = SocketAdapter::new(Arc::new(ChannelSink::new(frame_tx)), event_rx);
    let peer = MemoryPeer {
        events: event_tx,
        sent: frame_rx,
    };

    (adapter, peer)
}

/// The far end of an in-process transport
pub struct MemoryPeer {
    events: mpsc::UnboundedSender<TransportEvent>,
    sent: mpsc::UnboundedReceiver<Frame>,
}

impl MemoryPeer {
    /// Raise an event; returns false once the adapter is gone
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn open(&self) -> bool {
        self.emit(TransportEvent::Opened)
    }

    /// Deliver an inbound text frame
    pub fn deliver(&self, text: impl Into<String>) -> bool {
        self.emit(TransportEvent::Message(text.into()))
    }

    /// Deliver a JSON value as an inbound text frame
    pub fn deliver_json(&self, value: &serde_json::Value) -> bool {
        self.deliver(value.to_string())
    }

    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.emit(TransportEvent::Error(reason.into()))
    }

    pub fn close(&self, info: CloseInfo) -> bool {
        self.emit(TransportEvent::Closed(info))
    }

    /// Next frame the session sent, waiting for it
    pub async fn recv(&mut self) -> Option<Frame> {
        self.sent.recv().await
    }

    /// Next text frame the session sent, skipping other frame kinds
    pub async fn recv_text(&mut self) -> Option<String> {
        while let Some(frame) = self.sent.recv().await {
            if let Frame::Text(text) = frame {
                return Some(text);
            }
        }
        None
    }

    /// Next text frame parsed as JSON
    pub async fn recv_json(&mut self) -> Option<serde_json::Value> {
        let text = self.recv_text().await?;
        serde_json::from_str(&text).ok()
    }

    /// Next frame if one is already queued
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.sent.try_recv().ok()
    }
}
