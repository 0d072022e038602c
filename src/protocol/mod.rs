//! Signaling wire protocol
//!
//! JSON events exchanged over the WebSocket transport. Inbound kinds form a
//! closed set so the server's dispatch is an exhaustive match.

pub mod event;

pub use event::{ClientEvent, ServerEvent};
