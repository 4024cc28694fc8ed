//! The narrow interface a cooperative TCP stack exposes to a connection.
//!
//! A single connection owns exactly one `Transport`. The request drives it
//! from the event-loop thread only; there is no locking here because there
//! is no other thread to race with.

/// Per-connection handle into the underlying send/receive machinery.
///
/// Implementors are expected to be thin wrappers over a platform TCP
/// socket (e.g. lwIP's `tcp_pcb`) where buffering and flow control are
/// owned by the stack, not by this crate.
pub trait Transport {
    /// Bytes currently available in the outbound send buffer.
    fn space(&self) -> usize;

    /// Write as much of `buf` as fits in the send buffer right now.
    /// Returns the number of bytes actually consumed, which may be less
    /// than `buf.len()` or zero.
    fn write(&mut self, buf: &[u8]) -> usize;

    /// Whether the connection is currently able to accept a write at all
    /// (distinct from `space() > 0`: a half-closed or congested link can
    /// report `false` even with nominal buffer space).
    fn can_send(&self) -> bool;

    /// Tear down the connection. Idempotent.
    fn close(&mut self);
}

#[cfg(test)]
pub mod test_support {
    use super::Transport;

    /// An in-memory `Transport` for unit and scenario tests: writes land
    /// in `sent`, and `cap` caps how many bytes a single `write()` call
    /// accepts (to exercise partial-write/backpressure paths).
    pub struct MockTransport {
        pub sent: Vec<u8>,
        pub cap: usize,
        pub sendable: bool,
        pub closed: bool,
    }

    impl MockTransport {
        pub fn new(cap: usize) -> MockTransport {
            MockTransport { sent: Vec::new(), cap, sendable: true, closed: false }
        }
    }

    impl Transport for MockTransport {
        fn space(&self) -> usize {
            if self.closed { 0 } else { self.cap }
        }

        fn write(&mut self, buf: &[u8]) -> usize {
            if self.closed || !self.sendable {
                return 0;
            }
            let n = buf.len().min(self.cap);
            self.sent.extend_from_slice(&buf[..n]);
            n
        }

        fn can_send(&self) -> bool {
            !self.closed && self.sendable
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }
}
