//! Path-prefix and catch-all handlers backed by a user closure.

use crate::enums::Method;
use crate::handler::Handler;
use crate::request::Request;
use crate::response::{ContentSource, Response};

/// Small insertion-ordered, case-insensitive set of header names a
/// handler wants retained on the request.
#[derive(Default)]
pub struct InterestedHeaders(Vec<String>);

impl InterestedHeaders {
    pub fn new() -> InterestedHeaders {
        InterestedHeaders(Vec::new())
    }

    pub fn add(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !self.contains(&name) {
            self.0.push(name);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

/// Matches a method mask and URL prefix, delegating to a user closure.
/// The archetypal handler named in the routing design: `filter` is the
/// method+prefix test, `handle_request` calls through to `callback`.
pub struct CallbackHandler<F>
where
    F: Fn(&mut Request) -> Response,
{
    methods: Method,
    prefix: String,
    interested: InterestedHeaders,
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(&mut Request) -> Response,
{
    pub fn new(methods: Method, prefix: impl Into<String>, callback: F) -> CallbackHandler<F> {
        CallbackHandler { methods, prefix: prefix.into(), interested: InterestedHeaders::new(), callback }
    }

    pub fn interested_headers(mut self, names: &[&str]) -> Self {
        for n in names {
            self.interested.add(*n);
        }
        self
    }
}

impl<F> Handler for CallbackHandler<F>
where
    F: Fn(&mut Request) -> Response,
{
    fn can_handle(&self, request: &Request) -> bool {
        self.methods.intersects(request.method()) && request.path().starts_with(&self.prefix)
    }

    fn is_interesting_header(&self, name: &str) -> bool {
        self.interested.contains(name)
    }

    fn handle_request(&self, request: &mut Request) -> Response {
        (self.callback)(request)
    }
}

/// Matches unconditionally and either calls a user closure or returns a
/// 500, and treats every header as interesting (it doesn't know ahead of
/// time what the fallback caller might need).
pub struct CatchAllHandler {
    callback: Option<Box<dyn Fn(&mut Request) -> Response>>,
}

impl CatchAllHandler {
    pub fn new() -> CatchAllHandler {
        CatchAllHandler { callback: None }
    }

    pub fn with_callback(callback: impl Fn(&mut Request) -> Response + 'static) -> CatchAllHandler {
        CatchAllHandler { callback: Some(Box::new(callback)) }
    }
}

impl Default for CatchAllHandler {
    fn default() -> CatchAllHandler {
        CatchAllHandler::new()
    }
}

impl Handler for CatchAllHandler {
    fn can_handle(&self, _request: &Request) -> bool {
        true
    }

    fn is_interesting_header(&self, _name: &str) -> bool {
        true
    }

    fn handle_request(&self, request: &mut Request) -> Response {
        if let Some(cb) = &self.callback {
            return cb(request);
        }
        let mut resp = Response::new(request.version(), 500, "Internal Server Error");
        resp.set_content(ContentSource::Empty, 0);
        resp
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::enums::Version;

    #[test]
    fn callback_matches_prefix_and_method() {
        let h = CallbackHandler::new(Method::GET, "/api", |req| {
            let mut r = Response::new(req.version(), 200, "OK");
            r.set_content(ContentSource::Empty, 0);
            r
        });
        let mut req = Request::new(Version::Http11);
        req.set_path("/api/v1".to_string());
        req.set_method(Method::GET);
        assert!(h.can_handle(&req));
        assert_eq!(h.handle_request(&mut req).code(), 200);
    }

    #[test]
    fn catch_all_defaults_to_500() {
        let h = CatchAllHandler::new();
        let mut req = Request::new(Version::Http11);
        assert!(h.can_handle(&req));
        assert!(h.is_interesting_header("anything"));
        assert_eq!(h.handle_request(&mut req).code(), 500);
    }
}
