//! Ordered rewrites and handlers, plus a catch-all, selected by
//! first-match semantics.

use crate::handler::Handler;
use crate::request::Request;
use crate::response::{ContentSource, Response};
use crate::rewrite::Rewrite;

/// Ordered rewrites, ordered handlers, and an optional catch-all.
///
/// Falling through every registered handler is not the same thing as
/// having a catch-all: with no `catch_all` set, `select_handler` reports
/// `None` and the caller attaches the framework's own 501 (no handler
/// matched this request at all). A `catch_all` registered with
/// `set_catch_all` is itself an ordinary `Handler` — typically a
/// `CatchAllHandler`, which defaults to 500 but can carry a user
/// callback — selected only once nothing else did.
pub struct Server {
    rewrites: Vec<Rewrite>,
    handlers: Vec<Box<dyn Handler>>,
    catch_all: Option<Box<dyn Handler>>,
}

impl Server {
    pub fn new() -> Server {
        Server { rewrites: Vec::new(), handlers: Vec::new(), catch_all: None }
    }

    pub fn add_rewrite(&mut self, rewrite: Rewrite) -> &mut Self {
        self.rewrites.push(rewrite);
        self
    }

    pub fn add_handler(&mut self, handler: impl Handler + 'static) -> &mut Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn set_catch_all(&mut self, handler: impl Handler + 'static) -> &mut Self {
        self.catch_all = Some(Box::new(handler));
        self
    }

    /// Run the rewrite chain against `request`, mutating its path in
    /// place for each rewrite whose filter accepts.
    pub fn apply_rewrites(&self, request: &mut Request) {
        for rewrite in &self.rewrites {
            rewrite.apply_if_matched(request);
        }
    }

    /// First handler whose `filter` and `can_handle` both pass, falling
    /// back to the catch-all if one is registered. `None` means nothing
    /// matched at all.
    pub fn select_handler(&self, request: &Request) -> Option<&dyn Handler> {
        for handler in &self.handlers {
            if handler.filter(request) && handler.can_handle(request) {
                return Some(handler.as_ref());
            }
        }
        self.catch_all.as_deref()
    }

    /// Whether the selected handler wants a given header retained; `false`
    /// when nothing matched (there's no handler to ask).
    pub fn is_interesting_header(&self, request: &Request, name: &str) -> bool {
        self.select_handler(request).map_or(false, |h| h.is_interesting_header(name))
    }

    /// Run the request through `check_continue` on the matched handler.
    /// `true` (proceed as normal) when nothing matched either.
    pub fn check_continue(&self, request: &mut Request) -> bool {
        match self.select_handler(request) {
            Some(h) => h.check_continue(request),
            None => true,
        }
    }

    /// Dispatch to the matched handler, or attach a bare 501 if nothing
    /// matched and no catch-all was registered.
    pub fn handle_request(&self, request: &mut Request) -> Response {
        match self.select_handler(request) {
            Some(h) => h.handle_request(request),
            None => {
                let mut resp = Response::new(request.version(), 501, "Not Implemented");
                resp.set_content(ContentSource::Empty, 0);
                resp
            }
        }
    }
}

impl Default for Server {
    fn default() -> Server {
        Server::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::enums::{Method, Version};
    use crate::handler::callback::CallbackHandler;
    use crate::response::ContentSource;

    #[test]
    fn first_matching_handler_wins() {
        let mut server = Server::new();
        server.add_handler(CallbackHandler::new(Method::GET, "/a", |req| {
            let mut r = Response::new(req.version(), 201, "Created");
            r.set_content(ContentSource::Empty, 0);
            r
        }));
        server.add_handler(CallbackHandler::new(Method::GET, "/", |req| {
            let mut r = Response::new(req.version(), 200, "OK");
            r.set_content(ContentSource::Empty, 0);
            r
        }));
        let mut req = Request::new(Version::Http11);
        req.set_method(Method::GET);
        req.set_path("/a/x".to_string());
        assert_eq!(server.handle_request(&mut req).code(), 201);
    }

    #[test]
    fn no_match_and_no_catch_all_yields_501() {
        let server = Server::new();
        let mut req = Request::new(Version::Http11);
        req.set_method(Method::GET);
        req.set_path("/anything".to_string());
        assert_eq!(server.handle_request(&mut req).code(), 501);
    }

    #[test]
    fn no_match_falls_back_to_registered_catch_all() {
        let mut server = Server::new();
        server.set_catch_all(crate::handler::callback::CatchAllHandler::new());
        let mut req = Request::new(Version::Http11);
        req.set_method(Method::GET);
        req.set_path("/anything".to_string());
        assert_eq!(server.handle_request(&mut req).code(), 500);
    }

    #[test]
    fn rewrites_run_before_handler_selection() {
        let mut server = Server::new();
        server.add_rewrite(Rewrite::exact("/old", "/new"));
        server.add_handler(CallbackHandler::new(Method::GET, "/new", |req| {
            let mut r = Response::new(req.version(), 200, "OK");
            r.set_content(ContentSource::Empty, 0);
            r
        }));
        let mut req = Request::new(Version::Http11);
        req.set_method(Method::GET);
        req.set_path("/old".to_string());
        server.apply_rewrites(&mut req);
        assert_eq!(req.path(), "/new");
        assert_eq!(server.handle_request(&mut req).code(), 200);
    }
}
