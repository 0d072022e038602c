//! WebSocket signaling relay for peer-to-peer real-time sessions
//!
//! `signalhub` lets clients discover each other inside named rooms and
//! exchange the connection-negotiation messages (offers, answers, ICE
//! candidates) and session events (chat, media toggles, hand-raise,
//! screen-share notices) needed to establish direct peer links. The server
//! never touches media; it brokers opaque metadata and coordinates
//! membership.
//!
//! # Example
//!
//! ```no_run
//! use signalhub::{ServerConfig, SignalingServer};
//!
//! #[tokio::main]
//! async fn main() -> signalhub::Result<()> {
//!     let config = ServerConfig::default().max_connections(1000);
//!     let server = SignalingServer::new(config);
//!     server.run().await
//! }
//! ```
//!
//! # Modules
//!
//! - [`registry`] — rooms, participants, and the identity/session index;
//!   the single source of truth for all routing decisions
//! - [`relay`] — unicast signal relay, room broadcast, and the idle reaper
//! - [`protocol`] — the JSON wire events
//! - [`server`] — the WebSocket transport host
//! - [`stats`] — read-only status snapshots

pub mod error;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod server;
pub mod stats;

pub use error::{Error, Result};
pub use protocol::{ClientEvent, ServerEvent};
pub use registry::{
    ParticipantInfo, RegistryConfig, RegistryError, RoomId, RoomRegistry, RoomSnapshot,
    SessionHandle, StatusUpdate,
};
pub use relay::{relay_signal, SignalKind};
pub use server::{ServerConfig, SignalingServer};
pub use stats::{RoomDetail, RoomSummary, ServerStatus};
