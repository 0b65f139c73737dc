//! Transport adapter seam
//!
//! A session does not own a socket directly. It owns a [`SocketAdapter`]:
//!
//! - an outbound [`FrameSink`] that accepts text, binary and close frames
//! - an ordered stream of inbound [`TransportEvent`]s (opened, message,
//!   error, closed)
//! - optionally, a message hook installed by another consumer of the same
//!   connection, which sees every inbound text frame before the session
//!   classifies it
//!
//! Two adapters ship with the crate:
//!
//! - [`ws::connect`]: a tokio-tungstenite WebSocket client
//! - [`memory::pair`]: an in-process adapter driven by a [`memory::MemoryPeer`]
//!
//! Anything else (a socket opened elsewhere, a different WebSocket library)
//! plugs in by implementing [`FrameSink`] and feeding a channel of events
//! into [`SocketAdapter::new`].

pub mod memory;
pub mod ws;

use sockrpc_core::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// An outbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    /// Ask the transport to close the connection
    Close,
}

/// Close code and reason reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    pub const NORMAL: u16 = 1000;
    pub const ABNORMAL: u16 = 1006;

    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub fn normal() -> Self {
        Self::new(Self::NORMAL, "")
    }

    /// The connection went away without a close handshake
    pub fn abnormal() -> Self {
        Self::new(Self::ABNORMAL, "")
    }
}

/// Something that happened on the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Error(String),
    Closed(CloseInfo),
}

/// Outbound half of a transport
pub trait FrameSink: Send + Sync {
    fn send(&self, frame: Frame) -> Result<()>;
}

/// Sink backed by an unbounded channel, drained by a transport task
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Frame>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Frame>) -> Self {
        Self { tx }
    }
}

impl FrameSink for ChannelSink {
    fn send(&self, frame: Frame) -> Result<()> {
        self.tx.send(frame).map_err(|_| Error::ConnectionClosed)
    }
}

/// Hook invoked with every inbound text frame before classification
pub type MessageHook = Arc<dyn Fn(&str) + Send + Sync>;

/// A transport as the session sees it
pub struct SocketAdapter {
    pub(crate) sink: Arc<dyn FrameSink>,
    pub(crate) events: mpsc::UnboundedReceiver<TransportEvent>,
    pub(crate) message_hook: Option<MessageHook>,
}

impl SocketAdapter {
    pub fn new(sink: Arc<dyn FrameSink>, events: mpsc::UnboundedReceiver<TransportEvent>) -> Self {
        Self {
            sink,
            events,
            message_hook: None,
        }
    }

    /// Keep an existing consumer's message handler running
    ///
    /// The hook runs first for every inbound text frame; the session's own
    /// classification and fan-out follow.
    pub fn with_message_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.message_hook = Some(Arc::new(hook));
        self
    }

    /// Send a frame directly, bypassing any session
    pub fn send(&self, frame: Frame) -> Result<()> {
        self.sink.send(frame)
    }
}

impl fmt::Debug for SocketAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketAdapter")
            .field("message_hook", &self.message_hook.is_some())
            .finish_non_exhaustive()
    }
}
