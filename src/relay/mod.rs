//! Signaling relay and room-wide notification logic
//!
//! Stateless routing on top of the registry. Unicast relay resolves sender
//! and target through the registry and delivers point-to-point; broadcast
//! fans an event out to a room's members; the reaper periodically evicts
//! idle participants and emits the corresponding leave notices.

pub mod broadcast;
pub mod reaper;
pub mod signal;

pub use broadcast::{broadcast_room, broadcast_room_except};
pub use reaper::spawn_reaper;
pub use signal::{relay_signal, SignalKind};
