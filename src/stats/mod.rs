//! Status snapshots for operational monitoring

pub mod status;

pub use status::{RoomDetail, RoomSummary, ServerStatus};
