//! Wire events
//!
//! JSON message types exchanged with clients, internally tagged on `type`.
//! Offer/answer/candidate payloads are opaque `serde_json::Value`s: the
//! server brokers them between sessions without interpreting SDP or ICE
//! contents.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::{ParticipantInfo, RoomId};

/// Events received from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Join {
        room_id: String,
        identity: String,
        display_name: String,
    },
    Leave {
        room_id: String,
        identity: String,
    },
    Offer {
        target: String,
        payload: Value,
    },
    Answer {
        target: String,
        payload: Value,
    },
    Candidate {
        target: String,
        payload: Value,
    },
    ToggleVideo {
        room_id: String,
        identity: String,
        enabled: bool,
    },
    ToggleAudio {
        room_id: String,
        identity: String,
        enabled: bool,
    },
    SendMessage {
        room_id: String,
        identity: String,
        display_name: String,
        text: String,
        timestamp: i64,
    },
    RaiseHand {
        room_id: String,
        identity: String,
        display_name: String,
    },
    ScreenShareStart {
        room_id: String,
        identity: String,
    },
    ScreenShareStop {
        room_id: String,
        identity: String,
    },
    Heartbeat {
        identity: String,
    },
}

/// Events sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Join acknowledgment carrying the membership snapshot
    RoomJoined {
        room_id: RoomId,
        participants: Vec<ParticipantInfo>,
    },
    PeerJoined {
        identity: String,
        display_name: String,
    },
    PeerLeft {
        identity: String,
    },
    /// Relayed negotiation payloads; `from` is the resolved sender identity
    Offer {
        from: String,
        payload: Value,
    },
    Answer {
        from: String,
        payload: Value,
    },
    Candidate {
        from: String,
        payload: Value,
    },
    VideoToggled {
        identity: String,
        enabled: bool,
    },
    AudioToggled {
        identity: String,
        enabled: bool,
    },
    Chat {
        identity: String,
        display_name: String,
        text: String,
        timestamp: i64,
    },
    HandRaised {
        identity: String,
        display_name: String,
    },
    ScreenShareStarted {
        identity: String,
    },
    ScreenShareStopped {
        identity: String,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerEvent {
    /// Serialize to a frame suitable for zero-copy fan-out
    pub fn encode(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_tagged_decoding() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"join","room_id":"r1","identity":"u1","display_name":"Alice"}"#,
        )
        .unwrap();
        assert!(matches!(event, ClientEvent::Join { ref identity, .. } if identity == "u1"));

        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"offer","target":"u2","payload":{"sdp":"v=0..."}}"#,
        )
        .unwrap();
        let ClientEvent::Offer { target, payload } = event else {
            panic!("expected offer");
        };
        assert_eq!(target, "u2");
        assert_eq!(payload["sdp"], "v=0...");
    }

    #[test]
    fn test_unknown_event_kind_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"type":"selfdestruct"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_event_encoding() {
        let event = ServerEvent::Candidate {
            from: "u1".into(),
            payload: serde_json::json!({"candidate": "candidate:0 1 UDP ..."}),
        };

        let buf = event.encode().unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["type"], "candidate");
        assert_eq!(value["from"], "u1");
        assert_eq!(value["payload"]["candidate"], "candidate:0 1 UDP ...");
    }

    #[test]
    fn test_room_joined_snapshot_shape() {
        let event = ServerEvent::RoomJoined {
            room_id: RoomId::from("r1"),
            participants: vec![ParticipantInfo {
                identity: "u1".into(),
                display_name: "Alice".into(),
                video_enabled: true,
                audio_enabled: false,
            }],
        };

        let value: Value = serde_json::from_slice(&event.encode().unwrap()).unwrap();
        assert_eq!(value["type"], "room_joined");
        assert_eq!(value["room_id"], "r1");
        assert_eq!(value["participants"][0]["identity"], "u1");
        assert_eq!(value["participants"][0]["audio_enabled"], false);
    }
}
