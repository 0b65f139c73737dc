//! WebSocket transport over tokio-tungstenite
//!
//! [`connect`] returns immediately with a [`SocketAdapter`]; the handshake
//! runs in a spawned socket task that then owns both halves of the
//! connection:
//!
//! ```text
//! connect_async ──ok──▶ Opened ──▶ loop { outbound frames ▶ socket
//!      │                                  socket ▶ Message / Error / Closed }
//!      └─err──▶ Error, Closed(1006)
//! ```
//!
//! Inbound binary frames are decoded as UTF-8 and surface as `Message`
//! events; invalid UTF-8 surfaces as an `Error` event. Ping/pong is handled
//! by tungstenite. Every run of the task ends with exactly one `Closed`
//! event.

use super::{ChannelSink, CloseInfo, Frame, SocketAdapter, TransportEvent};
use futures::{SinkExt, StreamExt};
use sockrpc_core::{Error, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::connect_async;

const PROTOCOL_HEADER: &str = "Sec-WebSocket-Protocol";

/// Open a WebSocket connection to `url`
///
/// `protocols` become the `Sec-WebSocket-Protocol` request header. URL and
/// header problems are reported here; connection failures arrive later as
/// `Error` followed by `Closed` events.
pub fn connect(url: &str, protocols: &[&str]) -> Result<SocketAdapter> {
    let request = build_request(url, protocols)?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (frame_tx, frame_rx) = mpsc::unbounded_channel();

    tokio::spawn(run_socket(request, event_tx, frame_rx));

    Ok(SocketAdapter::new(
        Arc::new(ChannelSink::new(frame_tx)),
        event_rx,
    ))
}

fn build_request(url: &str, protocols: &[&str]) -> Result<Request> {
    let mut request = url
        .into_client_request()
        .map_err(|e| Error::WebSocket(e.to_string()))?;

    if !protocols.is_empty() {
        let value = HeaderValue::from_str(&protocols.join(", "))
            .map_err(|e| Error::WebSocket(format!("Invalid subprotocol list: {}", e)))?;
        request.headers_mut().insert(PROTOCOL_HEADER, value);
    }

    Ok(request)
}

async fn run_socket(
    request: Request,
    events: mpsc::UnboundedSender<TransportEvent>,
    mut frames: mpsc::UnboundedReceiver<Frame>,
) {
    let url = request.uri().to_string();
    tracing::info!(url = %url, "Connecting to server");

    let stream = match connect_async(request).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "WebSocket handshake failed");
            let _ = events.send(TransportEvent::Error(e.to_string()));
            let _ = events.send(TransportEvent::Closed(CloseInfo::abnormal()));
            return;
        }
    };

    tracing::info!(url = %url, "Connected successfully");
    let _ = events.send(TransportEvent::Opened);

    let (mut write, mut read) = stream.split();
    let mut outbound_open = true;

    let close = loop {
        tokio::select! {
            frame = frames.recv(), if outbound_open => {
                let message = match frame {
                    Some(Frame::Text(text)) => Message::Text(text),
                    Some(Frame::Binary(bytes)) => Message::Binary(bytes),
                    Some(Frame::Close) | None => {
                        // keep reading until the peer answers the close
                        outbound_open = false;
                        Message::Close(None)
                    }
                };
                if let Err(e) = write.send(message).await {
                    tracing::error!(error = %e, "WebSocket send failed");
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                }
            }
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Message(text));
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => {
                        let _ = events.send(TransportEvent::Message(text));
                    }
                    Err(e) => {
                        let _ = events.send(TransportEvent::Error(format!(
                            "Binary frame is not UTF-8: {}",
                            e
                        )));
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!("Connection closed by server");
                    break frame
                        .map(|f| CloseInfo::new(u16::from(f.code), f.reason.to_string()))
                        .unwrap_or_else(CloseInfo::normal);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!(error = %e, "WebSocket error");
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    break CloseInfo::abnormal();
                }
                None => break CloseInfo::abnormal(),
            }
        }
    };

    let _ = events.send(TransportEvent::Closed(close));
}
