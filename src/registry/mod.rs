//! Room & session registry
//!
//! The registry is the single source of truth for rooms, participants, and
//! the identity <-> session index. All relay and broadcast decisions resolve
//! through it.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<RoomRegistry>
//!                  ┌───────────────────────────┐
//!                  │ Mutex<{                   │
//!                  │   rooms: RoomStore,       │
//!                  │   index: IdentityIndex,   │
//!                  │ }>                        │
//!                  └────────────┬──────────────┘
//!                               │
//!            ┌──────────────────┼──────────────────┐
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//!      [dispatch]           [relay]            [reaper]
//!      join/leave      resolve + unicast     sweep_idle()
//!            │                  │                  │
//!            └─────► SessionHandle::send() ◄───────┘
//!                     (outside the lock)
//! ```
//!
//! One mutex covers both structures: every participant in a room has exactly
//! one index entry, so the pair must mutate atomically. Registry methods
//! never send anything themselves; they return handles and snapshots, and
//! delivery happens after the lock is released.

pub mod config;
pub mod error;
pub mod index;
pub mod room;
pub mod session;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use index::IdentityIndex;
pub use room::{Participant, ParticipantInfo, Room, RoomId, RoomSnapshot, RoomStore};
pub use session::{SessionHandle, SessionSender};
pub use store::{RoomRegistry, StatusUpdate};
