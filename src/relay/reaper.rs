//! Idle-session reaper
//!
//! Safety net for transports that drop without signaling a disconnect: a
//! periodic task evicts participants whose last activity is older than the
//! configured threshold, exactly as if they had left, and notifies their
//! rooms.

use std::sync::Arc;
use std::time::Instant;

use crate::protocol::ServerEvent;
use crate::registry::RoomRegistry;

use super::broadcast::broadcast_room;

/// Spawn the periodic idle sweep.
///
/// Interval and threshold come from the registry's
/// [`crate::registry::RegistryConfig`]. Returns the task handle so the host
/// can abort it at shutdown.
pub fn spawn_reaper(registry: Arc<RoomRegistry>) -> tokio::task::JoinHandle<()> {
    let interval = registry.config().sweep_interval;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh server does
        // not sweep before anyone has had a chance to join.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let evicted = registry.sweep_idle(Instant::now()).await;
            for (room_id, identity) in evicted {
                broadcast_room(
                    &registry,
                    &room_id,
                    &ServerEvent::PeerLeft { identity: identity.clone() },
                )
                .await;
            }
        }
    })
}
