//! Point-to-point signaling relay
//!
//! Forwards an opaque negotiation payload from a sending session to exactly
//! one target identity in the same room. The three message kinds share one
//! relay rule; only the outbound event tag differs.
//!
//! The sender's identity and room are always recomputed from the transport
//! session itself. Client-declared sender fields are never used for
//! addressing, so a session cannot speak as someone else, and a target
//! identity that lives in another room resolves to nothing.

use serde_json::Value;

use crate::protocol::ServerEvent;
use crate::registry::{RoomRegistry, SessionHandle};

/// The three relayed negotiation message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl SignalKind {
    fn into_event(self, from: String, payload: Value) -> ServerEvent {
        match self {
            SignalKind::Offer => ServerEvent::Offer { from, payload },
            SignalKind::Answer => ServerEvent::Answer { from, payload },
            SignalKind::Candidate => ServerEvent::Candidate { from, payload },
        }
    }
}

/// Relay one signal from `sender_session` to `target`.
///
/// Drops the message (debug log, no error to the sender) when the sender has
/// no room membership or the target is not a member of the sender's room.
/// Both are expected races with leave/disconnect, not failures.
pub async fn relay_signal(
    registry: &RoomRegistry,
    sender_session: u64,
    kind: SignalKind,
    target: &str,
    payload: Value,
) {
    let Some((room_id, sender_identity)) = registry.peer_of_session(sender_session).await else {
        tracing::debug!(
            session_id = sender_session,
            kind = ?kind,
            "Dropping signal from session with no room membership"
        );
        return;
    };

    let Some(handle) = registry.resolve_target(&room_id, target).await else {
        tracing::debug!(
            room = %room_id,
            from = %sender_identity,
            target = target,
            kind = ?kind,
            "Dropping signal for unknown target"
        );
        return;
    };

    deliver(&handle, &kind.into_event(sender_identity, payload));
}

fn deliver(handle: &SessionHandle, event: &ServerEvent) {
    match event.encode() {
        Ok(buf) => {
            handle.send(buf);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode relay event");
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::sync::mpsc;

    use crate::registry::RoomId;

    use super::*;

    fn session(id: u64) -> (SessionHandle, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(16);
        (SessionHandle::new(id, tx), rx)
    }

    fn decode(buf: Bytes) -> Value {
        serde_json::from_slice(&buf).unwrap()
    }

    #[tokio::test]
    async fn test_offer_reaches_target_with_resolved_sender() {
        let registry = RoomRegistry::new();
        let r1 = RoomId::from("r1");
        let (alice, _alice_rx) = session(1);
        let (bob, mut bob_rx) = session(2);

        registry.join(&r1, "u1", "Alice", alice).await.unwrap();
        registry.join(&r1, "u2", "Bob", bob).await.unwrap();

        relay_signal(
            &registry,
            1,
            SignalKind::Offer,
            "u2",
            serde_json::json!({"sdp": "v=0"}),
        )
        .await;

        let msg = decode(bob_rx.recv().await.unwrap());
        assert_eq!(msg["type"], "offer");
        assert_eq!(msg["from"], "u1");
        assert_eq!(msg["payload"]["sdp"], "v=0");
    }

    #[tokio::test]
    async fn test_cross_room_target_never_delivered() {
        let registry = RoomRegistry::new();
        let a = RoomId::from("a");
        let b = RoomId::from("b");
        let (x, _x_rx) = session(1);
        let (y, _y_rx) = session(2);
        let (z, mut z_rx) = session(3);

        registry.join(&a, "x", "X", x).await.unwrap();
        registry.join(&a, "y", "Y", y).await.unwrap();
        registry.join(&b, "z", "Z", z).await.unwrap();

        // x targets z, who lives in room b
        relay_signal(
            &registry,
            1,
            SignalKind::Offer,
            "z",
            serde_json::json!({"sdp": "v=0"}),
        )
        .await;

        assert!(z_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unjoined_sender_dropped() {
        let registry = RoomRegistry::new();
        let r1 = RoomId::from("r1");
        let (bob, mut bob_rx) = session(2);

        registry.join(&r1, "u2", "Bob", bob).await.unwrap();

        // Session 99 never joined anything
        relay_signal(
            &registry,
            99,
            SignalKind::Candidate,
            "u2",
            serde_json::json!({"candidate": ""}),
        )
        .await;

        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_departed_target_dropped() {
        let registry = RoomRegistry::new();
        let r1 = RoomId::from("r1");
        let (alice, _alice_rx) = session(1);
        let (bob, mut bob_rx) = session(2);

        registry.join(&r1, "u1", "Alice", alice).await.unwrap();
        registry.join(&r1, "u2", "Bob", bob).await.unwrap();
        registry.leave(&r1, "u2").await;

        relay_signal(
            &registry,
            1,
            SignalKind::Answer,
            "u2",
            serde_json::json!({"sdp": "v=0"}),
        )
        .await;

        assert!(bob_rx.try_recv().is_err());
    }
}
