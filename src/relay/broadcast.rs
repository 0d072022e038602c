//! Room-wide fan-out
//!
//! Delivers one event to every member of a room, optionally excluding the
//! originator. The event is encoded once; each member's channel receives a
//! refcounted clone of the same buffer. Slow or closed sessions are skipped,
//! never awaited.

use crate::protocol::ServerEvent;
use crate::registry::{RoomId, RoomRegistry};

/// Deliver an event to every current member of a room
pub async fn broadcast_room(registry: &RoomRegistry, room_id: &RoomId, event: &ServerEvent) {
    fan_out(registry, room_id, None, event).await;
}

/// Deliver an event to every member of a room except `exclude`
pub async fn broadcast_room_except(
    registry: &RoomRegistry,
    room_id: &RoomId,
    exclude: &str,
    event: &ServerEvent,
) {
    fan_out(registry, room_id, Some(exclude), event).await;
}

async fn fan_out(
    registry: &RoomRegistry,
    room_id: &RoomId,
    exclude: Option<&str>,
    event: &ServerEvent,
) {
    let members = registry.room_sessions(room_id).await;
    if members.is_empty() {
        return;
    }

    let buf = match event.encode() {
        Ok(buf) => buf,
        Err(e) => {
            tracing::warn!(room = %room_id, error = %e, "Failed to encode broadcast event");
            return;
        }
    };

    for (identity, handle) in &members {
        if exclude.is_some_and(|excluded| excluded == identity) {
            continue;
        }
        handle.send(buf.clone());
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde_json::Value;
    use tokio::sync::mpsc;

    use crate::registry::SessionHandle;

    use super::*;

    fn session(id: u64) -> (SessionHandle, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(16);
        (SessionHandle::new(id, tx), rx)
    }

    fn decode(buf: Bytes) -> Value {
        serde_json::from_slice(&buf).unwrap()
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_members() {
        let registry = RoomRegistry::new();
        let r1 = RoomId::from("r1");
        let (alice, mut alice_rx) = session(1);
        let (bob, mut bob_rx) = session(2);

        registry.join(&r1, "u1", "Alice", alice).await.unwrap();
        registry.join(&r1, "u2", "Bob", bob).await.unwrap();

        let chat = ServerEvent::Chat {
            identity: "u1".into(),
            display_name: "Alice".into(),
            text: "hello".into(),
            timestamp: 1700000000000,
        };
        broadcast_room(&registry, &r1, &chat).await;

        // Chat reaches everyone, the sender included
        let msg = decode(alice_rx.recv().await.unwrap());
        assert_eq!(msg["type"], "chat");
        assert_eq!(msg["text"], "hello");
        let msg = decode(bob_rx.recv().await.unwrap());
        assert_eq!(msg["text"], "hello");
    }

    #[tokio::test]
    async fn test_broadcast_except_skips_originator() {
        let registry = RoomRegistry::new();
        let r1 = RoomId::from("r1");
        let (alice, mut alice_rx) = session(1);
        let (bob, mut bob_rx) = session(2);

        registry.join(&r1, "u1", "Alice", alice).await.unwrap();
        registry.join(&r1, "u2", "Bob", bob).await.unwrap();

        let notice = ServerEvent::HandRaised {
            identity: "u1".into(),
            display_name: "Alice".into(),
        };
        broadcast_room_except(&registry, &r1, "u1", &notice).await;

        assert!(alice_rx.try_recv().is_err());
        let msg = decode(bob_rx.recv().await.unwrap());
        assert_eq!(msg["type"], "hand_raised");
        assert_eq!(msg["identity"], "u1");
    }

    #[tokio::test]
    async fn test_broadcast_to_absent_room_is_noop() {
        let registry = RoomRegistry::new();

        // No room exists; nothing to deliver, nothing to panic over
        broadcast_room(
            &registry,
            &RoomId::from("ghost"),
            &ServerEvent::PeerLeft { identity: "u1".into() },
        )
        .await;
    }
}
