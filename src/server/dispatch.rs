//! Inbound event dispatch
//!
//! One exhaustive match mapping every inbound event kind to exactly one
//! registry/relay/broadcast operation. This is the whole state machine of
//! the server: adding an event kind means adding an arm here, and the
//! compiler points at it.
//!
//! Room-scoped events are honored only when the declared room and identity
//! match the membership registered for the *sending session*. A client can
//! claim any identity it likes in a payload; the registry's view of its
//! session is what counts. Mismatches and non-members are dropped with a
//! debug log, the same policy the relay applies.

use crate::protocol::{ClientEvent, ServerEvent};
use crate::registry::{RegistryError, RoomId, RoomRegistry, SessionHandle, StatusUpdate};
use crate::relay::{broadcast_room, broadcast_room_except, relay_signal, SignalKind};

/// Handle one decoded inbound event from a session
pub async fn handle_event(registry: &RoomRegistry, session: &SessionHandle, event: ClientEvent) {
    // Any inbound activity counts against the idle threshold
    registry.touch_session(session.id()).await;

    match event {
        ClientEvent::Join {
            room_id,
            identity,
            display_name,
        } => {
            let room_id = RoomId::new(room_id);
            match registry
                .join(&room_id, &identity, &display_name, session.clone())
                .await
            {
                Ok(snapshot) => {
                    send_event(
                        session,
                        &ServerEvent::RoomJoined {
                            room_id: snapshot.room_id.clone(),
                            participants: snapshot.participants,
                        },
                    );
                    let notice = ServerEvent::PeerJoined {
                        identity: identity.clone(),
                        display_name,
                    };
                    broadcast_room_except(registry, &room_id, &identity, &notice).await;
                }
                Err(e) => send_error(session, &e),
            }
        }

        ClientEvent::Leave { room_id, identity } => {
            let Some(room_id) = verified_room(registry, session, &room_id, &identity).await else {
                return;
            };
            if registry.leave(&room_id, &identity).await {
                broadcast_room(registry, &room_id, &ServerEvent::PeerLeft { identity }).await;
            }
        }

        ClientEvent::Offer { target, payload } => {
            relay_signal(registry, session.id(), SignalKind::Offer, &target, payload).await;
        }
        ClientEvent::Answer { target, payload } => {
            relay_signal(registry, session.id(), SignalKind::Answer, &target, payload).await;
        }
        ClientEvent::Candidate { target, payload } => {
            relay_signal(registry, session.id(), SignalKind::Candidate, &target, payload).await;
        }

        ClientEvent::ToggleVideo {
            room_id,
            identity,
            enabled,
        } => {
            let Some(room_id) = verified_room(registry, session, &room_id, &identity).await else {
                return;
            };
            let update = StatusUpdate {
                video: Some(enabled),
                audio: None,
            };
            if registry.update_status(&room_id, &identity, update).await {
                let notice = ServerEvent::VideoToggled {
                    identity: identity.clone(),
                    enabled,
                };
                broadcast_room_except(registry, &room_id, &identity, &notice).await;
            }
        }

        ClientEvent::ToggleAudio {
            room_id,
            identity,
            enabled,
        } => {
            let Some(room_id) = verified_room(registry, session, &room_id, &identity).await else {
                return;
            };
            let update = StatusUpdate {
                video: None,
                audio: Some(enabled),
            };
            if registry.update_status(&room_id, &identity, update).await {
                let notice = ServerEvent::AudioToggled {
                    identity: identity.clone(),
                    enabled,
                };
                broadcast_room_except(registry, &room_id, &identity, &notice).await;
            }
        }

        ClientEvent::SendMessage {
            room_id,
            identity,
            display_name,
            text,
            timestamp,
        } => {
            let Some(room_id) = verified_room(registry, session, &room_id, &identity).await else {
                return;
            };
            // Chat goes to everyone, the sender included, so the sender's UI
            // sees the same ordering as the receivers'.
            broadcast_room(
                registry,
                &room_id,
                &ServerEvent::Chat {
                    identity,
                    display_name,
                    text,
                    timestamp,
                },
            )
            .await;
        }

        ClientEvent::RaiseHand {
            room_id,
            identity,
            display_name,
        } => {
            let Some(room_id) = verified_room(registry, session, &room_id, &identity).await else {
                return;
            };
            let notice = ServerEvent::HandRaised {
                identity: identity.clone(),
                display_name,
            };
            broadcast_room_except(registry, &room_id, &identity, &notice).await;
        }

        ClientEvent::ScreenShareStart { room_id, identity } => {
            let Some(room_id) = verified_room(registry, session, &room_id, &identity).await else {
                return;
            };
            let notice = ServerEvent::ScreenShareStarted {
                identity: identity.clone(),
            };
            broadcast_room_except(registry, &room_id, &identity, &notice).await;
        }

        ClientEvent::ScreenShareStop { room_id, identity } => {
            let Some(room_id) = verified_room(registry, session, &room_id, &identity).await else {
                return;
            };
            let notice = ServerEvent::ScreenShareStopped {
                identity: identity.clone(),
            };
            broadcast_room_except(registry, &room_id, &identity, &notice).await;
        }

        ClientEvent::Heartbeat { identity } => {
            registry.touch(&identity).await;
        }
    }
}

/// Resolve the sending session's membership and check it matches the
/// declared room and identity. Mismatches are expected from raced or
/// misbehaving clients and are dropped, not errored.
async fn verified_room(
    registry: &RoomRegistry,
    session: &SessionHandle,
    declared_room: &str,
    declared_identity: &str,
) -> Option<RoomId> {
    let Some((room_id, identity)) = registry.peer_of_session(session.id()).await else {
        tracing::debug!(
            session_id = session.id(),
            room = declared_room,
            "Dropping event from session with no membership"
        );
        return None;
    };

    if identity != declared_identity || room_id.as_str() != declared_room {
        tracing::debug!(
            session_id = session.id(),
            registered = %identity,
            declared = declared_identity,
            room = declared_room,
            "Dropping event with mismatched identity or room"
        );
        return None;
    }

    Some(room_id)
}

fn send_event(session: &SessionHandle, event: &ServerEvent) {
    match event.encode() {
        Ok(buf) => {
            session.send(buf);
        }
        Err(e) => {
            tracing::warn!(session_id = session.id(), error = %e, "Failed to encode event");
        }
    }
}

fn send_error(session: &SessionHandle, error: &RegistryError) {
    tracing::debug!(session_id = session.id(), error = %error, "Rejecting request");
    send_event(
        session,
        &ServerEvent::Error {
            code: error.code().to_owned(),
            message: error.to_string(),
        },
    );
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde_json::Value;
    use tokio::sync::mpsc;

    use super::*;

    fn session(id: u64) -> (SessionHandle, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(16);
        (SessionHandle::new(id, tx), rx)
    }

    fn decode(buf: Bytes) -> Value {
        serde_json::from_slice(&buf).unwrap()
    }

    fn join(room_id: &str, identity: &str, display_name: &str) -> ClientEvent {
        ClientEvent::Join {
            room_id: room_id.into(),
            identity: identity.into(),
            display_name: display_name.into(),
        }
    }

    #[tokio::test]
    async fn test_join_ack_and_notice_scenario() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = session(1);
        let (bob, mut bob_rx) = session(2);

        handle_event(&registry, &alice, join("r1", "u1", "Alice")).await;

        // u1's ack lists zero other participants
        let ack = decode(alice_rx.recv().await.unwrap());
        assert_eq!(ack["type"], "room_joined");
        assert_eq!(ack["room_id"], "r1");
        assert_eq!(ack["participants"].as_array().unwrap().len(), 0);

        handle_event(&registry, &bob, join("r1", "u2", "Bob")).await;

        // u2's ack lists exactly Alice
        let ack = decode(bob_rx.recv().await.unwrap());
        assert_eq!(ack["participants"].as_array().unwrap().len(), 1);
        assert_eq!(ack["participants"][0]["display_name"], "Alice");

        // u1 receives a join notice naming Bob
        let notice = decode(alice_rx.recv().await.unwrap());
        assert_eq!(notice["type"], "peer_joined");
        assert_eq!(notice["identity"], "u2");
        assert_eq!(notice["display_name"], "Bob");
    }

    #[tokio::test]
    async fn test_join_failure_reported_to_caller_only() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = session(1);
        let (intruder, mut intruder_rx) = session(2);

        handle_event(&registry, &alice, join("r1", "u1", "Alice")).await;
        let _ack = alice_rx.recv().await.unwrap();

        handle_event(&registry, &intruder, join("r1", "u1", "Impostor")).await;

        let err = decode(intruder_rx.recv().await.unwrap());
        assert_eq!(err["type"], "error");
        assert_eq!(err["code"], "duplicate_identity");

        // Alice saw nothing
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_validation_failure_error_notice() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = session(1);

        handle_event(&registry, &alice, join("r1", "u1", "")).await;

        let err = decode(alice_rx.recv().await.unwrap());
        assert_eq!(err["code"], "validation");
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_chat_from_non_member_dropped() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = session(1);
        let (outsider, _outsider_rx) = session(2);

        handle_event(&registry, &alice, join("r1", "u1", "Alice")).await;
        let _ack = alice_rx.recv().await.unwrap();

        // Outsider never joined r1 but claims a membership
        handle_event(
            &registry,
            &outsider,
            ClientEvent::SendMessage {
                room_id: "r1".into(),
                identity: "u9".into(),
                display_name: "Ghost".into(),
                text: "boo".into(),
                timestamp: 0,
            },
        )
        .await;

        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_chat_echoes_to_sender() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = session(1);
        let (bob, mut bob_rx) = session(2);

        handle_event(&registry, &alice, join("r1", "u1", "Alice")).await;
        handle_event(&registry, &bob, join("r1", "u2", "Bob")).await;
        let _ = alice_rx.recv().await; // ack
        let _ = alice_rx.recv().await; // bob's join notice
        let _ = bob_rx.recv().await; // ack

        handle_event(
            &registry,
            &alice,
            ClientEvent::SendMessage {
                room_id: "r1".into(),
                identity: "u1".into(),
                display_name: "Alice".into(),
                text: "hi".into(),
                timestamp: 123,
            },
        )
        .await;

        let to_alice = decode(alice_rx.recv().await.unwrap());
        let to_bob = decode(bob_rx.recv().await.unwrap());
        assert_eq!(to_alice["type"], "chat");
        assert_eq!(to_alice["timestamp"], 123);
        assert_eq!(to_bob["text"], "hi");
    }

    #[tokio::test]
    async fn test_toggle_updates_state_and_notifies_others() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = session(1);
        let (bob, mut bob_rx) = session(2);

        handle_event(&registry, &alice, join("r1", "u1", "Alice")).await;
        handle_event(&registry, &bob, join("r1", "u2", "Bob")).await;
        let _ = alice_rx.recv().await;
        let _ = alice_rx.recv().await;
        let _ = bob_rx.recv().await;

        handle_event(
            &registry,
            &alice,
            ClientEvent::ToggleVideo {
                room_id: "r1".into(),
                identity: "u1".into(),
                enabled: false,
            },
        )
        .await;

        let notice = decode(bob_rx.recv().await.unwrap());
        assert_eq!(notice["type"], "video_toggled");
        assert_eq!(notice["identity"], "u1");
        assert_eq!(notice["enabled"], false);
        // No echo to the originator
        assert!(alice_rx.try_recv().is_err());

        let detail = registry
            .room_detail(&RoomId::from("r1"))
            .await
            .unwrap();
        let alice_info = detail
            .participants
            .iter()
            .find(|p| p.identity == "u1")
            .unwrap();
        assert!(!alice_info.video_enabled);
    }

    #[tokio::test]
    async fn test_leave_notifies_room_and_ignores_spoof() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = session(1);
        let (bob, mut bob_rx) = session(2);

        handle_event(&registry, &alice, join("r1", "u1", "Alice")).await;
        handle_event(&registry, &bob, join("r1", "u2", "Bob")).await;
        let _ = alice_rx.recv().await;
        let _ = alice_rx.recv().await;
        let _ = bob_rx.recv().await;

        // Bob cannot evict Alice
        handle_event(
            &registry,
            &bob,
            ClientEvent::Leave {
                room_id: "r1".into(),
                identity: "u1".into(),
            },
        )
        .await;
        assert!(registry.is_member(&RoomId::from("r1"), "u1").await);

        handle_event(
            &registry,
            &bob,
            ClientEvent::Leave {
                room_id: "r1".into(),
                identity: "u2".into(),
            },
        )
        .await;

        let notice = decode(alice_rx.recv().await.unwrap());
        assert_eq!(notice["type"], "peer_left");
        assert_eq!(notice["identity"], "u2");
        assert!(!registry.is_member(&RoomId::from("r1"), "u2").await);
    }

    #[tokio::test]
    async fn test_screen_share_notices() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = session(1);
        let (bob, mut bob_rx) = session(2);

        handle_event(&registry, &alice, join("r1", "u1", "Alice")).await;
        handle_event(&registry, &bob, join("r1", "u2", "Bob")).await;
        let _ = alice_rx.recv().await;
        let _ = alice_rx.recv().await;
        let _ = bob_rx.recv().await;

        handle_event(
            &registry,
            &alice,
            ClientEvent::ScreenShareStart {
                room_id: "r1".into(),
                identity: "u1".into(),
            },
        )
        .await;
        let notice = decode(bob_rx.recv().await.unwrap());
        assert_eq!(notice["type"], "screen_share_started");

        handle_event(
            &registry,
            &alice,
            ClientEvent::ScreenShareStop {
                room_id: "r1".into(),
                identity: "u1".into(),
            },
        )
        .await;
        let notice = decode(bob_rx.recv().await.unwrap());
        assert_eq!(notice["type"], "screen_share_stopped");
        assert_eq!(notice["identity"], "u1");
    }
}
