//! Incremental, line-at-a-time request head parser.
//!
//! Bytes are appended to an accumulator until a line feed is found; the
//! line is then trimmed and dispatched. This makes a header split evenly
//! across two `feed()` calls parse identically to one delivered whole.

use crate::enums::{Method, Version};
use crate::error::Error;
use crate::url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    None,
    Basic,
    Digest,
    Other,
}

/// Outcome of feeding bytes to the head parser.
pub enum HeadStatus {
    /// More bytes are needed; `consumed` of the input was absorbed.
    NeedMore { consumed: usize },
    /// The blank line terminating the head was reached; `consumed` is the
    /// offset just past it — everything after belongs to the body.
    Complete { consumed: usize },
    Error(Error),
}

#[derive(Debug, Default)]
pub struct ParsedHead {
    pub method: Method,
    pub raw_url: String,
    pub path: String,
    pub raw_query: String,
    pub query: Vec<(String, String)>,
    pub version_is_11: bool,
    pub host: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub connection_keep_alive: Option<bool>,
    pub expect_continue: bool,
    pub expect_unsupported: bool,
    pub auth_scheme: AuthScheme,
    pub auth_payload: Option<String>,
    pub headers: Vec<(String, Vec<String>)>,
}

impl Default for AuthScheme {
    fn default() -> AuthScheme {
        AuthScheme::None
    }
}

pub struct HeadParser {
    acc: Vec<u8>,
    saw_request_line: bool,
    pub head: ParsedHead,
}

impl HeadParser {
    pub fn new() -> HeadParser {
        HeadParser { acc: Vec::new(), saw_request_line: false, head: ParsedHead::default() }
    }

    pub fn version(&self) -> Version {
        if self.head.version_is_11 { Version::Http11 } else { Version::Http10 }
    }

    /// Feed freshly-arrived bytes, consulting `interesting` to decide
    /// whether to retain a header the parser doesn't itself recognize.
    pub fn feed(&mut self, buf: &[u8], interesting: &mut dyn FnMut(&str) -> bool) -> HeadStatus {
        let mut offset = 0;
        loop {
            match buf[offset..].iter().position(|&b| b == b'\n') {
                None => {
                    self.acc.extend_from_slice(&buf[offset..]);
                    return HeadStatus::NeedMore { consumed: buf.len() };
                }
                Some(rel) => {
                    let line_end = offset + rel;
                    let mut line = std::mem::take(&mut self.acc);
                    line.extend_from_slice(&buf[offset..line_end]);
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    offset = line_end + 1;

                    if line.is_empty() {
                        return HeadStatus::Complete { consumed: offset };
                    }
                    match self.process_line(&line, interesting) {
                        Ok(()) => {}
                        Err(e) => return HeadStatus::Error(e),
                    }
                    if offset >= buf.len() {
                        return HeadStatus::NeedMore { consumed: offset };
                    }
                }
            }
        }
    }

    fn process_line(&mut self, line: &[u8], interesting: &mut dyn FnMut(&str) -> bool)
        -> Result<(), Error>
    {
        if !self.saw_request_line {
            self.saw_request_line = true;
            return self.parse_request_line(line);
        }
        self.parse_header_line(line, interesting)
    }

    fn parse_request_line(&mut self, line: &[u8]) -> Result<(), Error> {
        let line = String::from_utf8_lossy(line);
        let mut parts = line.splitn(3, ' ');
        let (method, raw_url, proto) = match (parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(u), Some(p)) => (m, u, p),
            _ => return Err(Error::BadRequestLine),
        };

        self.head.method = Method::parse(method);
        // Anything not exactly "HTTP/1.0" is treated as HTTP/1.1, matching
        // a lenient version check that tolerates malformed tails.
        self.head.version_is_11 = proto != "HTTP/1.0";

        let (path_part, query_part) = match raw_url.find('?') {
            Some(idx) => (&raw_url[..idx], &raw_url[idx + 1..]),
            None => (raw_url, ""),
        };
        self.head.raw_url = raw_url.to_string();
        self.head.path = url::decode_path(path_part);
        self.head.raw_query = query_part.to_string();
        self.head.query = url::parse_query(query_part);
        Ok(())
    }

    fn parse_header_line(&mut self, line: &[u8], interesting: &mut dyn FnMut(&str) -> bool)
        -> Result<(), Error>
    {
        let colon = match line.iter().position(|&b| b == b':') {
            Some(idx) => idx,
            None => return Ok(()),
        };
        let name = String::from_utf8_lossy(&line[..colon]).trim().to_string();
        let mut value = &line[colon + 1..];
        while value.first() == Some(&b' ') {
            value = &value[1..];
        }
        let value = String::from_utf8_lossy(value).trim_end().to_string();

        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "host" => self.head.host = Some(value),
            "content-type" => self.head.content_type = Some(value),
            "content-length" => {
                let parsed: u64 = value.parse().map_err(|_| Error::BadContentLength)?;
                if self.head.content_length.is_some() {
                    return Err(Error::DuplicateContentLength);
                }
                self.head.content_length = Some(parsed);
            }
            "connection" => {
                if crate::headers::is_keepalive(value.as_bytes()) {
                    self.head.connection_keep_alive = Some(true);
                } else if crate::headers::is_close(value.as_bytes()) {
                    self.head.connection_keep_alive = Some(false);
                }
            }
            "expect" => {
                if crate::headers::is_continue(value.as_bytes()) {
                    self.head.expect_continue = true;
                } else {
                    self.head.expect_unsupported = true;
                }
            }
            "authorization" => {
                let mut parts = value.splitn(2, ' ');
                let scheme = parts.next().unwrap_or("");
                let payload = parts.next().unwrap_or("").to_string();
                self.head.auth_scheme = match scheme {
                    "Basic" => AuthScheme::Basic,
                    "Digest" => AuthScheme::Digest,
                    _ => AuthScheme::Other,
                };
                self.head.auth_payload = Some(payload);
            }
            _ => {
                if interesting(&name) {
                    match self.head.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
                        Some((_, values)) => values.push(value),
                        None => self.head.headers.push((name, vec![value])),
                    }
                }
            }
        }
        Ok(())
    }
}
