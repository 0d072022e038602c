//! Identity index
//!
//! Bidirectional mapping between participant identities and transport
//! sessions, across all rooms. The forward direction answers "is this
//! identity anywhere, and on which session"; the reverse direction answers
//! "which membership does this session own" for O(1) disconnect cleanup and
//! relay sender resolution.
//!
//! Both directions are always mutated together, and only by the registry.

use std::collections::HashMap;

use super::room::RoomId;

/// Bidirectional identity <-> session map
#[derive(Debug, Default)]
pub struct IdentityIndex {
    /// identity -> session id
    forward: HashMap<String, u64>,
    /// session id -> (identity, room)
    reverse: HashMap<u64, (String, RoomId)>,
}

impl IdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both directions for a new membership
    pub fn insert(&mut self, identity: &str, session_id: u64, room: &RoomId) {
        self.forward.insert(identity.to_owned(), session_id);
        self.reverse
            .insert(session_id, (identity.to_owned(), room.clone()));
    }

    /// Remove both directions by identity. Returns the session id if present.
    pub fn remove_identity(&mut self, identity: &str) -> Option<u64> {
        let session_id = self.forward.remove(identity)?;
        self.reverse.remove(&session_id);
        Some(session_id)
    }

    /// Remove both directions by session. Returns the membership if present.
    pub fn remove_session(&mut self, session_id: u64) -> Option<(String, RoomId)> {
        let (identity, room) = self.reverse.remove(&session_id)?;
        self.forward.remove(&identity);
        Some((identity, room))
    }

    /// Current session for an identity, if it has an active membership
    pub fn session_of(&self, identity: &str) -> Option<u64> {
        self.forward.get(identity).copied()
    }

    /// Membership owned by a session, if any
    pub fn peer_of(&self, session_id: u64) -> Option<&(String, RoomId)> {
        self.reverse.get(&session_id)
    }

    pub fn contains_identity(&self, identity: &str) -> bool {
        self.forward.contains_key(identity)
    }

    pub fn contains_session(&self, session_id: u64) -> bool {
        self.reverse.contains_key(&session_id)
    }

    /// Number of indexed memberships
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.forward.len(), self.reverse.len());
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
