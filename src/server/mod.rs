//! WebSocket transport host
//!
//! A thin, stateless wrapper around the registry: it accepts sockets,
//! performs the WebSocket handshake, decodes inbound events, and routes
//! them through the dispatcher. All session and room state lives in
//! [`crate::registry`].

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod listener;

pub use config::ServerConfig;
pub use listener::SignalingServer;
