//! Per-connection handling
//!
//! Each accepted socket gets a WebSocket handshake, a writer task that
//! drains the session's outbound channel into the socket, and a read loop
//! that decodes inbound JSON events and feeds the dispatcher. Whichever way
//! the connection ends — clean close, error, or idle timeout — the session
//! is unregistered and its room is notified.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::error::Result;
use crate::protocol::{ClientEvent, ServerEvent};
use crate::registry::{RoomRegistry, SessionHandle};
use crate::relay::broadcast_room;
use crate::server::config::ServerConfig;

use super::dispatch;

pub(crate) async fn run(
    session_id: u64,
    socket: TcpStream,
    peer_addr: SocketAddr,
    config: ServerConfig,
    registry: Arc<RoomRegistry>,
) -> Result<()> {
    let ws = tokio_tungstenite::accept_async(socket).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (tx, mut rx) = mpsc::channel(registry.config().outbound_buffer);
    let session = SessionHandle::new(session_id, tx);

    let writer = tokio::spawn(async move {
        while let Some(buf) = rx.recv().await {
            let text = String::from_utf8_lossy(&buf).into_owned();
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    loop {
        let msg = match tokio::time::timeout(config.idle_timeout, ws_rx.next()).await {
            Err(_) => {
                tracing::debug!(session_id, peer = %peer_addr, "Socket idle timeout");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::debug!(session_id, error = %e, "WebSocket read error");
                break;
            }
            Ok(Some(Ok(msg))) => msg,
        };

        let data = match msg {
            Message::Text(text) => text.into_bytes(),
            Message::Binary(data) => data,
            Message::Close(_) => break,
            // Ping/pong frames are handled by the protocol layer
            _ => continue,
        };

        match serde_json::from_slice::<ClientEvent>(&data) {
            Ok(event) => dispatch::handle_event(&registry, &session, event).await,
            Err(e) => {
                tracing::debug!(session_id, error = %e, "Ignoring malformed event");
            }
        }
    }

    writer.abort();

    // Abrupt disconnects reach the registry through this path; an explicit
    // leave beforehand makes this a no-op.
    if let Some((room_id, identity)) = registry.disconnect_session(session_id).await {
        broadcast_room(&registry, &room_id, &ServerEvent::PeerLeft { identity }).await;
    }

    Ok(())
}
