//! Registry error types
//!
//! Failures local to a single registry operation. None of these leave the
//! registry in a partially mutated state: validation happens before any
//! mutation, so an error means nothing changed.

use super::room::RoomId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A required field was missing or empty
    Validation(&'static str),
    /// Room is at capacity
    RoomFull { room: RoomId, capacity: usize },
    /// Identity already has an active membership
    DuplicateIdentity { room: RoomId, identity: String },
}

impl RegistryError {
    /// Stable machine-readable code for error notices on the wire
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::Validation(_) => "validation",
            RegistryError::RoomFull { .. } => "room_full",
            RegistryError::DuplicateIdentity { .. } => "duplicate_identity",
        }
    }
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Validation(field) => {
                write!(f, "Missing or empty field: {}", field)
            }
            RegistryError::RoomFull { room, capacity } => {
                write!(f, "Room {} is full (capacity {})", room, capacity)
            }
            RegistryError::DuplicateIdentity { room, identity } => {
                write!(f, "Identity {} is already a member of room {}", identity, room)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
