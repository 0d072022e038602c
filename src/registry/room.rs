//! Room and participant state
//!
//! Pure data: the room table and the records it owns. No I/O, no
//! notification. All mutation goes through [`super::store::RoomRegistry`],
//! which keeps this store and the identity index consistent as a pair.

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::session::SessionHandle;

/// Unique identifier for a room, externally supplied
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

impl RoomId {
    /// Create a room id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw room name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// One room membership: an identity bound to its current transport session
#[derive(Debug, Clone)]
pub struct Participant {
    /// Externally supplied identity, unique within a room
    pub identity: String,

    /// Current transport session (non-owning)
    pub session: SessionHandle,

    /// Human-readable label, set at join
    pub display_name: String,

    /// When this membership was created
    pub joined_at: Instant,

    /// Last inbound activity; consulted by the idle reaper
    pub last_active: Instant,

    /// Media-state flags, mutated by toggle events
    pub video_enabled: bool,
    pub audio_enabled: bool,
}

impl Participant {
    /// Create a participant record at join time
    pub fn new(
        identity: impl Into<String>,
        display_name: impl Into<String>,
        session: SessionHandle,
    ) -> Self {
        let now = Instant::now();
        Self {
            identity: identity.into(),
            session,
            display_name: display_name.into(),
            joined_at: now,
            last_active: now,
            video_enabled: true,
            audio_enabled: true,
        }
    }

    /// Wire-facing view of this participant
    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            identity: self.identity.clone(),
            display_name: self.display_name.clone(),
            video_enabled: self.video_enabled,
            audio_enabled: self.audio_enabled,
        }
    }
}

/// Serializable view of a participant, as sent in snapshots and notices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub identity: String,
    pub display_name: String,
    pub video_enabled: bool,
    pub audio_enabled: bool,
}

/// Snapshot of a room's membership, as returned to a joiner
#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    /// The room that was joined
    pub room_id: RoomId,
    /// All *other* current members, in no particular order
    pub participants: Vec<ParticipantInfo>,
}

/// A single room: participant set plus creation time
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub participants: HashMap<String, Participant>,
    pub created_at: Instant,
}

impl Room {
    fn new(id: RoomId) -> Self {
        Self {
            id,
            participants: HashMap::new(),
            created_at: Instant::now(),
        }
    }

    /// Number of current members
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the room has no members
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Snapshot of all members except `exclude`
    pub fn snapshot_excluding(&self, exclude: &str) -> Vec<ParticipantInfo> {
        self.participants
            .values()
            .filter(|p| p.identity != exclude)
            .map(Participant::info)
            .collect()
    }
}

/// Owns the mapping from room id to room state
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomId, Room>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing room or create an empty one; idempotent
    pub fn ensure_room(&mut self, id: &RoomId) -> &mut Room {
        self.rooms
            .entry(id.clone())
            .or_insert_with(|| Room::new(id.clone()))
    }

    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn get_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    /// Delete the room iff it has no participants; no-op otherwise.
    ///
    /// Returns `true` if the room was removed. Keeping this as the only
    /// deletion path enforces the no-empty-rooms invariant.
    pub fn remove_if_empty(&mut self, id: &RoomId) -> bool {
        if self.rooms.get(id).is_some_and(Room::is_empty) {
            self.rooms.remove(id);
            true
        } else {
            false
        }
    }

    /// Number of live rooms
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoomId, &Room)> {
        self.rooms.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&RoomId, &mut Room)> {
        self.rooms.iter_mut()
    }
}
