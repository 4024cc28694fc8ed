//! The per-connection request object and its state machine.
//!
//! `on_data` is the `_onData`-equivalent entry point: the embedder feeds
//! it every chunk of bytes as they arrive, in whatever sizes the
//! transport hands them over, and it drives the request through the
//! head parser, handler selection, the optional 100-continue, the body
//! parser, and dispatch, exactly as laid out below:
//!
//! ```text
//! SETUP --first byte--> START --request line parsed--> HEADERS
//! HEADERS --blank line, no handler matched--> RESPONSE (501)
//! HEADERS --blank line, check_continue() false--> RESPONSE
//! HEADERS --blank line, check_continue() true, length 0--> RECEIVED
//! HEADERS --blank line, check_continue() true, length >0--> BODY
//! BODY --content fully read--> RECEIVED
//! RECEIVED --handle_request ran--> RESPONSE
//! RESPONSE --response pump starts--> REPLYING
//! REPLYING --response done, keep-alive--> SETUP (recycled)
//! REPLYING --response done, close--> FINALIZE
//! any --disconnect--> FINALIZE
//! any --parse error--> ERROR
//! ```
//!
//! Bytes that arrive once the request has left `HEADERS`/`BODY` (i.e.
//! pipelined requests) are logged and dropped: this core doesn't support
//! reading ahead on a connection.

use crate::enums::{Method, Version};
use crate::parser::body::{BodyParser, BodyStatus};
use crate::parser::head::{HeadStatus, ParsedHead};
use crate::parser::Parser;
use crate::response::{ContentSource, Response};
use crate::server::Server;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Setup,
    Start,
    Headers,
    Body,
    Received,
    Response,
    Replying,
    Error,
    Finalize,
}

pub use crate::parser::head::AuthScheme as AuthType;

/// One request, for the lifetime of one TCP connection. On a keep-alive
/// boundary the same `Request` is recycled rather than torn down: see
/// `recycle`.
pub struct Request {
    version: Version,
    state: RequestState,
    method: Method,
    raw_url: String,
    path: String,
    raw_query: String,
    query: Vec<(String, String)>,
    host: Option<String>,
    content_type: Option<String>,
    content_length: Option<u64>,
    auth_type: AuthType,
    auth_payload: Option<String>,
    headers: Vec<(String, Vec<String>)>,
    keep_alive: bool,
    expect_continue: bool,
    expect_unsupported: bool,
    body: Vec<u8>,
    pub parser: Parser,
    pub response: Option<Response>,
}

impl Request {
    pub fn new(version: Version) -> Request {
        Request {
            version,
            state: RequestState::Setup,
            method: Method::NONE,
            raw_url: String::new(),
            path: String::new(),
            raw_query: String::new(),
            query: Vec::new(),
            host: None,
            content_type: None,
            content_length: None,
            auth_type: AuthType::None,
            auth_payload: None,
            headers: Vec::new(),
            keep_alive: version.default_keep_alive(),
            expect_continue: false,
            expect_unsupported: false,
            body: Vec::new(),
            parser: Parser::new_head(),
            response: None,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn set_state(&mut self, state: RequestState) {
        self.state = state;
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: String) {
        self.path = path;
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    pub fn auth_payload(&self) -> Option<&str> {
        self.auth_payload.as_deref()
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub fn expect_continue(&self) -> bool {
        self.expect_continue
    }

    pub fn expect_unsupported(&self) -> bool {
        self.expect_unsupported
    }

    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// Bytes accumulated by the body parser once the request has reached
    /// `RECEIVED`. Empty for a bodyless request.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Copy the parsed head's fields onto the request, resolving
    /// `keep_alive` from the explicit `Connection` header or the
    /// protocol-version default.
    pub fn apply_parsed_head(&mut self, head: ParsedHead) {
        self.method = head.method;
        self.raw_url = head.raw_url;
        self.path = head.path;
        self.raw_query = head.raw_query;
        self.query = head.query;
        self.host = head.host;
        self.content_type = head.content_type;
        self.content_length = head.content_length;
        self.auth_type = head.auth_scheme;
        self.auth_payload = head.auth_payload;
        self.headers = head.headers;
        self.expect_continue = head.expect_continue;
        self.expect_unsupported = head.expect_unsupported;
        self.keep_alive = head.connection_keep_alive.unwrap_or(self.version.default_keep_alive());
    }

    /// Reset everything set by a single request/response cycle while
    /// preserving the connection's negotiated version and keep-alive
    /// state, so the same connection can accept the next request.
    pub fn recycle(&mut self) {
        let version = self.version;
        let keep_alive = self.keep_alive;
        *self = Request::new(version);
        self.keep_alive = keep_alive;
        self.state = RequestState::Setup;
    }

    /// Feed freshly-arrived bytes through whichever phase this request is
    /// currently in, advancing the state machine and, once the head
    /// completes, running rewrites, handler selection, `check_continue`
    /// (emitting the literal 100-continue line when it applies), and,
    /// once the body (if any) is fully read, `handle_request` itself.
    ///
    /// Safe to call repeatedly as more bytes trickle in, in any chunk
    /// sizes: a header split across two calls parses the same as one
    /// delivered whole. Bytes that arrive once the request has moved past
    /// `BODY` are dropped (no pipelining).
    pub fn on_data(&mut self, buf: &[u8], server: &Server, transport: &mut dyn Transport) {
        if self.state == RequestState::Setup {
            self.state = RequestState::Start;
        }
        let mut offset = 0;
        while offset < buf.len() {
            match self.state {
                RequestState::Start | RequestState::Headers => {
                    offset += self.feed_head(&buf[offset..], server, transport);
                }
                RequestState::Body => {
                    offset += self.feed_body(&buf[offset..], server);
                }
                _ => {
                    warn!("discarding {} bytes received in state {:?}", buf.len() - offset, self.state);
                    break;
                }
            }
        }
    }

    fn feed_head(&mut self, buf: &[u8], server: &Server, transport: &mut dyn Transport) -> usize {
        let status = match &mut self.parser {
            Parser::Head(p) => {
                let mut retain_all = |_: &str| true;
                p.feed(buf, &mut retain_all)
            }
            _ => return buf.len(),
        };
        match status {
            HeadStatus::NeedMore { consumed } => {
                self.state = RequestState::Headers;
                consumed
            }
            HeadStatus::Complete { consumed } => {
                let head = match std::mem::replace(&mut self.parser, Parser::Done) {
                    Parser::Head(p) => p.head,
                    _ => unreachable!(),
                };
                self.apply_parsed_head(head);
                self.finish_head(server, transport);
                consumed
            }
            HeadStatus::Error(err) => {
                warn!("request head parse error: {}", err);
                self.state = RequestState::Error;
                buf.len()
            }
        }
    }

    /// Runs once the blank line ending the head is reached: rewrites,
    /// header filtering down to what the matched handler declared
    /// interesting (headers are retained during parsing regardless of
    /// handler, then trimmed here once one is known), the 501-for-no-match
    /// case, `check_continue`, the literal 100-continue write, and the
    /// HEADERS -> BODY / RECEIVED split on `Content-Length`.
    fn finish_head(&mut self, server: &Server, transport: &mut dyn Transport) {
        server.apply_rewrites(self);

        let collected = std::mem::take(&mut self.headers);
        self.headers = collected.into_iter()
            .filter(|(name, _)| server.is_interesting_header(self, name))
            .collect();

        if server.select_handler(self).is_none() {
            let mut resp = Response::new(self.version, 501, "Not Implemented");
            resp.set_content(ContentSource::Empty, 0);
            self.response = Some(resp);
            self.state = RequestState::Response;
            return;
        }

        let proceed = server.check_continue(self);
        if !proceed {
            self.state = RequestState::Response;
            return;
        }
        if self.expect_continue {
            transport.write(b"HTTP/1.1 100 Continue\r\n\r\n");
        }

        match self.content_length {
            None | Some(0) => {
                self.state = RequestState::Received;
                self.dispatch(server);
            }
            Some(len) => {
                self.parser = Parser::Body(BodyParser::new(len));
                self.state = RequestState::Body;
            }
        }
    }

    fn feed_body(&mut self, buf: &[u8], server: &Server) -> usize {
        let status = match &mut self.parser {
            Parser::Body(p) => p.feed(buf),
            _ => return buf.len(),
        };
        match status {
            BodyStatus::NeedMore { consumed } => consumed,
            BodyStatus::Complete { consumed } => {
                if let Parser::Body(p) = std::mem::replace(&mut self.parser, Parser::Done) {
                    self.body = p.into_bytes();
                }
                self.state = RequestState::Received;
                self.dispatch(server);
                consumed
            }
        }
    }

    fn dispatch(&mut self, server: &Server) {
        let resp = server.handle_request(self);
        self.response = Some(resp);
        self.state = RequestState::Response;
    }

    /// Pump the attached response one step, transitioning
    /// `RESPONSE -> REPLYING` on the first call and, once the response
    /// finishes, recycling the connection for keep-alive or moving to
    /// `FINALIZE` otherwise. `false` if there's nothing to pump.
    pub fn pump_response(&mut self, transport: &mut dyn Transport, heap_ok: bool) -> bool {
        if self.state == RequestState::Response {
            self.state = RequestState::Replying;
        }
        let progressed = match self.response.as_mut() {
            Some(resp) => resp.pump(transport, heap_ok),
            None => return false,
        };
        self.finalize_if_done();
        progressed
    }

    /// Acknowledge `len` previously-written response bytes and pump once
    /// more; same end-of-response handling as `pump_response`.
    pub fn ack(&mut self, len: u64, transport: &mut dyn Transport, heap_ok: bool) -> bool {
        let progressed = match self.response.as_mut() {
            Some(resp) => resp.ack(len, transport, heap_ok),
            None => return false,
        };
        self.finalize_if_done();
        progressed
    }

    fn finalize_if_done(&mut self) {
        let Some(resp) = self.response.as_ref() else { return };
        if !resp.is_done() {
            return;
        }
        let keep_alive = resp.keep_alive();
        self.response = None;
        if keep_alive {
            self.recycle();
        } else {
            self.state = RequestState::Finalize;
        }
    }

    /// Whether this connection has reached the end of its lifetime and
    /// its transport can be torn down.
    pub fn is_finished(&self) -> bool {
        self.state == RequestState::Finalize
    }
}

/// A `Request` paired with its own `Transport`, scheduled as one
/// `SchedulerEntry`: each tick pumps its response by one bounded unit of
/// work. Data arrival (`on_data`) is driven separately by the embedder's
/// transport callback, not by the scheduler.
pub struct Connection<T: Transport> {
    pub request: Request,
    pub transport: T,
}

impl<T: Transport> Connection<T> {
    pub fn new(request: Request, transport: T) -> Connection<T> {
        Connection { request, transport }
    }
}

impl<T: Transport> crate::scheduler::SchedulerEntry for Connection<T> {
    fn pump(&mut self, heap_ok: bool) -> bool {
        self.request.pump_response(&mut self.transport, heap_ok)
    }

    fn is_finished(&self) -> bool {
        self.request.is_finished()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_request_defaults_keep_alive_from_version() {
        assert!(Request::new(Version::Http11).keep_alive());
        assert!(!Request::new(Version::Http10).keep_alive());
    }

    #[test]
    fn recycle_preserves_version_and_keep_alive_but_clears_fields() {
        let mut req = Request::new(Version::Http11);
        req.set_path("/foo".to_string());
        req.set_state(RequestState::Replying);
        req.recycle();
        assert_eq!(req.state(), RequestState::Setup);
        assert_eq!(req.path(), "");
        assert_eq!(req.version(), Version::Http11);
        assert!(req.keep_alive());
    }

    #[test]
    fn recycle_preserves_explicit_close_override() {
        let mut head = ParsedHead::default();
        head.connection_keep_alive = Some(false);
        let mut req = Request::new(Version::Http11);
        req.apply_parsed_head(head);
        assert!(!req.keep_alive());
        req.recycle();
        assert!(!req.keep_alive());
    }
}
