use mc_http::Transport;

/// A minimal in-memory `Transport` for black-box scenario tests.
pub struct MockTransport {
    pub sent: Vec<u8>,
    pub cap: usize,
    pub sendable: bool,
}

impl MockTransport {
    pub fn new(cap: usize) -> MockTransport {
        MockTransport { sent: Vec::new(), cap, sendable: true }
    }

    pub fn sent_as_string(&self) -> String {
        String::from_utf8_lossy(&self.sent).into_owned()
    }
}

impl Transport for MockTransport {
    fn space(&self) -> usize {
        self.cap
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        if !self.sendable {
            return 0;
        }
        let n = buf.len().min(self.cap);
        self.sent.extend_from_slice(&buf[..n]);
        n
    }

    fn can_send(&self) -> bool {
        self.sendable
    }

    fn close(&mut self) {
        self.sendable = false;
    }
}

/// Drain a response's pump to completion against a mock transport,
/// acknowledging bytes synchronously (no simulated network RTT).
pub fn drain(resp: &mut mc_http::Response, t: &mut MockTransport) {
    for _ in 0..256 {
        if resp.is_done() {
            break;
        }
        resp.pump(t, true);
        resp.ack(1_000_000, t, true);
    }
}

/// Drain a request's attached response to completion (recycled or
/// finalized), acknowledging bytes synchronously.
pub fn drain_request(req: &mut mc_http::Request, t: &mut MockTransport) {
    for _ in 0..256 {
        if req.response.is_none() {
            break;
        }
        req.pump_response(t, true);
        req.ack(1_000_000, t, true);
    }
}
