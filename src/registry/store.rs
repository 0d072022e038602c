//! Room registry implementation
//!
//! The central registry that owns all rooms, participants, and identity index
//! entries, and enforces the membership invariants: capacity, one active
//! membership per identity, no empty rooms, and index/store consistency.
//!
//! A single `Mutex` covers the room store and the identity index together.
//! They must stay consistent as a pair (lookups resolve through both), so
//! partial locking is not an option. Every operation validates first, then
//! mutates to completion under the lock; delivery of any resulting messages
//! happens outside the lock, from handles returned to the caller.

use std::time::Instant;

use tokio::sync::Mutex;

use crate::stats::{RoomDetail, RoomSummary, ServerStatus};

use super::config::RegistryConfig;
use super::error::RegistryError;
use super::index::IdentityIndex;
use super::room::{Participant, RoomId, RoomSnapshot, RoomStore};
use super::session::SessionHandle;

/// Partial media-state update; only the present fields are applied
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusUpdate {
    pub video: Option<bool>,
    pub audio: Option<bool>,
}

struct Inner {
    rooms: RoomStore,
    index: IdentityIndex,
}

/// Central registry for all rooms and participants
pub struct RoomRegistry {
    inner: Mutex<Inner>,
    config: RegistryConfig,
    started_at: Instant,
}

impl RoomRegistry {
    /// Create a registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rooms: RoomStore::new(),
                index: IdentityIndex::new(),
            }),
            config,
            started_at: Instant::now(),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Add a participant to a room.
    ///
    /// Fails without mutating anything when a field is empty, the room is at
    /// capacity, the identity already has an active membership anywhere, or
    /// the session is already bound to an identity. On success the room is
    /// created if needed, both index directions are registered, and the
    /// returned snapshot lists all *other* current members.
    pub async fn join(
        &self,
        room_id: &RoomId,
        identity: &str,
        display_name: &str,
        session: SessionHandle,
    ) -> Result<RoomSnapshot, RegistryError> {
        if room_id.as_str().is_empty() {
            return Err(RegistryError::Validation("room_id"));
        }
        if identity.is_empty() {
            return Err(RegistryError::Validation("identity"));
        }
        if display_name.is_empty() {
            return Err(RegistryError::Validation("display_name"));
        }

        let mut inner = self.inner.lock().await;

        // One active membership per identity; rejoin requires a leave first
        if let Some(session_id) = inner.index.session_of(identity) {
            let room = inner
                .index
                .peer_of(session_id)
                .map(|(_, room)| room.clone())
                .unwrap_or_else(|| room_id.clone());
            return Err(RegistryError::DuplicateIdentity {
                room,
                identity: identity.to_owned(),
            });
        }

        // A session carries at most one membership
        if let Some((bound_identity, room)) = inner.index.peer_of(session.id()) {
            return Err(RegistryError::DuplicateIdentity {
                room: room.clone(),
                identity: bound_identity.clone(),
            });
        }

        if let Some(room) = inner.rooms.get(room_id) {
            if room.len() >= self.config.max_room_size {
                return Err(RegistryError::RoomFull {
                    room: room_id.clone(),
                    capacity: self.config.max_room_size,
                });
            }
        }

        // All checks passed; commit both structures together
        let session_id = session.id();
        let room = inner.rooms.ensure_room(room_id);
        let participants = room.snapshot_excluding(identity);
        room.participants.insert(
            identity.to_owned(),
            Participant::new(identity, display_name, session),
        );
        let member_count = room.len();
        inner.index.insert(identity, session_id, room_id);

        tracing::info!(
            room = %room_id,
            identity = identity,
            session_id = session_id,
            members = member_count,
            "Participant joined"
        );

        Ok(RoomSnapshot {
            room_id: room_id.clone(),
            participants,
        })
    }

    /// Remove a participant from a room.
    ///
    /// Idempotent: returns `false` (not an error) when the identity is not
    /// currently a member. Removes the room when it becomes empty.
    pub async fn leave(&self, room_id: &RoomId, identity: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let removed = Self::remove_membership(&mut inner, room_id, identity);

        if removed {
            tracing::info!(room = %room_id, identity = identity, "Participant left");
        }

        removed
    }

    /// Clean up after an abruptly closed session.
    ///
    /// Reverse lookup by session; performs the same cleanup as [`Self::leave`]
    /// and returns the membership it removed so the caller can emit a leave
    /// notice. `None` if the session had no membership.
    pub async fn disconnect_session(&self, session_id: u64) -> Option<(RoomId, String)> {
        let mut inner = self.inner.lock().await;
        let (identity, room_id) = inner.index.peer_of(session_id).cloned()?;

        Self::remove_membership(&mut inner, &room_id, &identity);

        tracing::info!(
            room = %room_id,
            identity = %identity,
            session_id = session_id,
            "Session disconnected"
        );

        Some((room_id, identity))
    }

    /// Resolve a relay target within a specific room.
    ///
    /// Only resolves identities that are members of *this* room; an identity
    /// present in some other room is not addressable.
    pub async fn resolve_target(&self, room_id: &RoomId, identity: &str) -> Option<SessionHandle> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(room_id)?
            .participants
            .get(identity)
            .map(|p| p.session.clone())
    }

    /// The membership owned by a session, if any. Non-destructive.
    pub async fn peer_of_session(&self, session_id: u64) -> Option<(RoomId, String)> {
        let inner = self.inner.lock().await;
        inner
            .index
            .peer_of(session_id)
            .map(|(identity, room)| (room.clone(), identity.clone()))
    }

    /// Apply a partial media-state update and refresh last_active.
    ///
    /// Returns `false` (no-op) when the identity is not a member of the room.
    pub async fn update_status(
        &self,
        room_id: &RoomId,
        identity: &str,
        update: StatusUpdate,
    ) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(participant) = inner
            .rooms
            .get_mut(room_id)
            .and_then(|room| room.participants.get_mut(identity))
        else {
            return false;
        };

        if let Some(video) = update.video {
            participant.video_enabled = video;
        }
        if let Some(audio) = update.audio {
            participant.audio_enabled = audio;
        }
        participant.last_active = Instant::now();
        true
    }

    /// Refresh last_active for a heartbeat. O(1) via the identity index.
    pub async fn touch(&self, identity: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(session_id) = inner.index.session_of(identity) else {
            return false;
        };
        Self::touch_membership(&mut inner, session_id)
    }

    /// Refresh last_active for any inbound activity on a session
    pub async fn touch_session(&self, session_id: u64) -> bool {
        let mut inner = self.inner.lock().await;
        Self::touch_membership(&mut inner, session_id)
    }

    /// Evict every participant idle longer than the configured threshold.
    ///
    /// Performs the equivalent of [`Self::leave`] for each and returns the
    /// evicted memberships so the caller can emit leave notices. `now` is
    /// passed in so the reaper and tests share one code path.
    pub async fn sweep_idle(&self, now: Instant) -> Vec<(RoomId, String)> {
        let threshold = self.config.idle_threshold;
        let mut inner = self.inner.lock().await;

        let stale: Vec<(RoomId, String)> = inner
            .rooms
            .iter()
            .flat_map(|(room_id, room)| {
                room.participants
                    .values()
                    .filter(|p| now.duration_since(p.last_active) > threshold)
                    .map(|p| (room_id.clone(), p.identity.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (room_id, identity) in &stale {
            Self::remove_membership(&mut inner, room_id, identity);
            tracing::info!(room = %room_id, identity = %identity, "Evicted idle participant");
        }

        stale
    }

    /// All current members of a room with their session handles.
    ///
    /// Used by the broadcast layer; delivery happens after this returns, so
    /// no send ever runs under the registry lock.
    pub async fn room_sessions(&self, room_id: &RoomId) -> Vec<(String, SessionHandle)> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(room_id)
            .map(|room| {
                room.participants
                    .values()
                    .map(|p| (p.identity.clone(), p.session.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether an identity is currently a member of a room
    pub async fn is_member(&self, room_id: &RoomId, identity: &str) -> bool {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(room_id)
            .is_some_and(|room| room.participants.contains_key(identity))
    }

    /// Process-level status snapshot: uptime and aggregate counts
    pub async fn status(&self) -> ServerStatus {
        let inner = self.inner.lock().await;
        ServerStatus {
            uptime_secs: self.started_at.elapsed().as_secs(),
            room_count: inner.rooms.len(),
            participant_count: inner.index.len(),
        }
    }

    /// All live rooms with their member counts
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .iter()
            .map(|(room_id, room)| RoomSummary {
                room_id: room_id.clone(),
                participant_count: room.len(),
            })
            .collect()
    }

    /// A single room's participant list, if the room exists
    pub async fn room_detail(&self, room_id: &RoomId) -> Option<RoomDetail> {
        let inner = self.inner.lock().await;
        inner.rooms.get(room_id).map(|room| RoomDetail {
            room_id: room_id.clone(),
            participants: room.participants.values().map(|p| p.info()).collect(),
        })
    }

    /// Number of live rooms
    pub async fn room_count(&self) -> usize {
        self.inner.lock().await.rooms.len()
    }

    /// Number of participants across all rooms
    pub async fn participant_count(&self) -> usize {
        self.inner.lock().await.index.len()
    }

    /// Remove one membership from both structures. Idempotent.
    fn remove_membership(inner: &mut Inner, room_id: &RoomId, identity: &str) -> bool {
        let Some(room) = inner.rooms.get_mut(room_id) else {
            return false;
        };
        if room.participants.remove(identity).is_none() {
            return false;
        }
        inner.index.remove_identity(identity);
        inner.rooms.remove_if_empty(room_id);
        true
    }

    fn touch_membership(inner: &mut Inner, session_id: u64) -> bool {
        let Some((identity, room_id)) = inner.index.peer_of(session_id).cloned() else {
            return false;
        };
        let Some(participant) = inner
            .rooms
            .get_mut(&room_id)
            .and_then(|room| room.participants.get_mut(&identity))
        else {
            return false;
        };
        participant.last_active = Instant::now();
        true
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
