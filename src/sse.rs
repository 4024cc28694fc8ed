//! Server-Sent Events: a handler that, once its response reaches `END`,
//! hijacks the connection away from the owning request into a per-
//! endpoint registry of long-lived clients.

use crate::enums::{Method, Version};
use crate::handler::Handler;
use crate::request::Request;
use crate::response::{ContentSource, Response};
use crate::transport::Transport;

/// One subscribed client: a transport that has been migrated out of its
/// originating request, plus the `Last-Event-ID` it connected with.
pub struct SseClient<T: Transport> {
    pub transport: T,
    pub last_event_id: Option<String>,
}

/// Registry of clients subscribed to one SSE endpoint. Slot-based so a
/// client id stays valid across `send()` calls that may run concurrently
/// with new clients being added (the common re-entrant case: a
/// connect-callback that itself calls `send` on the same source).
pub struct EventSource<T: Transport> {
    path: String,
    clients: Vec<Option<SseClient<T>>>,
}

/// Format one SSE frame. Multi-line `data` is split on `\r`, `\n`, or
/// `\r\n` into one `data:` line per input line.
pub fn format_frame(
    data: &str,
    event: Option<&str>,
    id: Option<&str>,
    retry: Option<u64>,
) -> Vec<u8> {
    let mut out = String::new();
    if let Some(retry) = retry {
        out.push_str(&format!("retry: {}\r\n", retry));
    }
    if let Some(id) = id {
        out.push_str(&format!("id: {}\r\n", id));
    }
    if let Some(event) = event {
        out.push_str(&format!("event: {}\r\n", event));
    }
    for line in split_lines(data) {
        out.push_str("data: ");
        out.push_str(line);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out.into_bytes()
}

fn split_lines(data: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = data;
    loop {
        match rest.find(|c| c == '\r' || c == '\n') {
            None => {
                lines.push(rest);
                break;
            }
            Some(idx) => {
                lines.push(&rest[..idx]);
                let mut skip = idx + 1;
                if rest.as_bytes().get(idx) == Some(&b'\r') && rest.as_bytes().get(idx + 1) == Some(&b'\n') {
                    skip += 1;
                }
                rest = &rest[skip..];
            }
        }
    }
    lines
}

impl<T: Transport> EventSource<T> {
    pub fn new(path: impl Into<String>) -> EventSource<T> {
        EventSource { path: path.into(), clients: Vec::new() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Register a newly-hijacked transport, returning a stable client id.
    pub fn add_client(&mut self, transport: T, last_event_id: Option<String>) -> usize {
        let client = SseClient { transport, last_event_id };
        for (i, slot) in self.clients.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(client);
                return i;
            }
        }
        self.clients.push(Some(client));
        self.clients.len() - 1
    }

    pub fn remove_client(&mut self, id: usize) -> Option<SseClient<T>> {
        self.clients.get_mut(id).and_then(|slot| slot.take())
    }

    pub fn client_count(&self) -> usize {
        self.clients.iter().filter(|c| c.is_some()).count()
    }

    /// Deliver one event to every currently-registered client whose
    /// transport can accept it right now. No per-client queue: if a
    /// client can't take the write this instant, the message is simply
    /// dropped for that client. The loop re-checks `self.clients.len()`
    /// each step so a client added mid-send (e.g. from a connect
    /// callback re-entrantly calling `send`) doesn't invalidate it.
    pub fn send(&mut self, data: &str, event: Option<&str>, id: Option<&str>, retry: Option<u64>) {
        let frame = format_frame(data, event, id, retry);
        let mut i = 0;
        while i < self.clients.len() {
            if let Some(client) = self.clients[i].as_mut() {
                if client.transport.can_send() && client.transport.space() >= frame.len() {
                    client.transport.write(&frame);
                }
            }
            i += 1;
        }
    }
}

/// Handler side of SSE: matches GET on one fixed path, attaches the
/// `text/event-stream` response, and signals the caller (via
/// `take_hijack`) once that response has fully drained so the connection
/// can be moved into an `EventSource` registry.
pub struct EventSourceHandler {
    path: String,
}

impl EventSourceHandler {
    pub fn new(path: impl Into<String>) -> EventSourceHandler {
        EventSourceHandler { path: path.into() }
    }
}

impl Handler for EventSourceHandler {
    fn can_handle(&self, request: &Request) -> bool {
        request.method() == Method::GET && request.path() == self.path
    }

    fn is_interesting_header(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case("last-event-id")
    }

    fn handle_request(&self, request: &mut Request) -> Response {
        let mut resp = Response::new(request.version(), 200, "OK");
        resp.add_header("Content-Type", "text/event-stream");
        resp.add_header("Cache-Control", "no-cache");
        if request.version() == Version::Http11 {
            resp.add_header("Connection", "keep-alive");
        }
        resp.set_unsized_content(ContentSource::Empty);
        resp
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transport::test_support::MockTransport;

    #[test]
    fn frame_has_expected_shape() {
        let frame = format_frame("hi", Some("ping"), Some("18"), None);
        assert_eq!(frame, b"id: 18\r\nevent: ping\r\ndata: hi\r\n\r\n");
    }

    #[test]
    fn multiline_data_becomes_multiple_data_lines() {
        let frame = format_frame("a\r\nb\nc\rd", None, None, None);
        assert_eq!(frame, b"data: a\r\ndata: b\r\ndata: c\r\ndata: d\r\n\r\n");
    }

    #[test]
    fn send_drops_silently_for_a_client_that_cant_accept() {
        let mut source: EventSource<MockTransport> = EventSource::new("/events");
        let id_ok = source.add_client(MockTransport::new(4096), None);
        let mut blocked = MockTransport::new(4096);
        blocked.sendable = false;
        source.add_client(blocked, None);
        source.send("hi", None, None, None);
        let ok_client = source.remove_client(id_ok).unwrap();
        assert_eq!(ok_client.transport.sent, b"data: hi\r\n\r\n");
    }

    #[test]
    fn remove_client_drops_it_from_future_sends() {
        let mut source: EventSource<MockTransport> = EventSource::new("/events");
        let id = source.add_client(MockTransport::new(4096), None);
        source.remove_client(id);
        assert_eq!(source.client_count(), 0);
        source.send("hi", None, None, None);
    }
}
