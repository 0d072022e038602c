//! Transport session handles
//!
//! A [`SessionHandle`] is the registry's non-owning reference to one
//! connected transport session: the session id plus the sending half of that
//! connection's outbound channel. The channel carries pre-serialized frames
//! as `Bytes`, so fanning one frame out to a whole room clones a refcount,
//! not the buffer.

use bytes::Bytes;
use tokio::sync::mpsc;

/// Per-session sender for outbound frames.
///
/// Bounded so a slow client cannot buffer unbounded memory; sends are
/// non-blocking and a full channel drops the frame for that session only.
pub type SessionSender = mpsc::Sender<Bytes>;

/// Addressable reference to one connected transport session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: u64,
    sender: SessionSender,
}

impl SessionHandle {
    /// Create a handle from a session id and its outbound channel
    pub fn new(id: u64, sender: SessionSender) -> Self {
        Self { id, sender }
    }

    /// The transport session id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue a frame for delivery, without blocking.
    ///
    /// Returns `false` if the frame was dropped (channel full or the
    /// connection already went away). Either way the caller moves on; a slow
    /// or dead session must never stall registry or relay paths.
    pub fn send(&self, frame: Bytes) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(
                    session_id = self.id,
                    error = %e,
                    "Dropping frame for slow or disconnected session"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_delivers() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = SessionHandle::new(7, tx);

        assert!(handle.send(Bytes::from_static(b"hello")));
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(handle.id(), 7);
    }

    #[tokio::test]
    async fn test_send_drops_when_full() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = SessionHandle::new(1, tx);

        assert!(handle.send(Bytes::from_static(b"a")));
        assert!(!handle.send(Bytes::from_static(b"b")));
    }

    #[tokio::test]
    async fn test_send_drops_when_closed() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = SessionHandle::new(1, tx);

        assert!(!handle.send(Bytes::from_static(b"a")));
    }
}
