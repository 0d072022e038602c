//! Read-only status snapshots
//!
//! Point-in-time views of the registry for operational monitoring. All of
//! these are produced by snapshot reads and are safe to request concurrently
//! with mutating operations; none of them mutate anything.

use serde::Serialize;

use crate::registry::{ParticipantInfo, RoomId};

/// Process-level liveness and aggregate counts
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    /// Seconds since the registry was constructed
    pub uptime_secs: u64,
    /// Number of live rooms
    pub room_count: usize,
    /// Number of participants across all rooms
    pub participant_count: usize,
}

/// One room's headline numbers, for room listings
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub participant_count: usize,
}

/// A single room's full participant list
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetail {
    pub room_id: RoomId,
    pub participants: Vec<ParticipantInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes() {
        let status = ServerStatus {
            uptime_secs: 42,
            room_count: 2,
            participant_count: 5,
        };

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["uptime_secs"], 42);
        assert_eq!(value["room_count"], 2);
        assert_eq!(value["participant_count"], 5);
    }

    #[test]
    fn test_room_summary_serializes_room_id_as_string() {
        let summary = RoomSummary {
            room_id: RoomId::from("standup"),
            participant_count: 3,
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["room_id"], "standup");
    }
}
