//! Handler trait: a filter+dispatch object the server tries in
//! registration order until one both matches and accepts.

pub mod callback;
pub mod static_file;

use crate::request::Request;
use crate::response::Response;

/// A filter+dispatch object attached to a server. `filter` is a cheap,
/// side-effect-free match test; `handle_request` does the real work once
/// a handler has been selected and the request body (if any) is fully
/// received.
pub trait Handler {
    /// Cheap predicate: does this handler want this request at all?
    /// Conjoined with `can_handle`; both must pass for this handler to
    /// be selected.
    fn filter(&self, request: &Request) -> bool {
        let _ = request;
        true
    }

    /// A second, handler-specific acceptance test run after `filter`
    /// (e.g. the static handler's method-mask and path-prefix check).
    fn can_handle(&self, request: &Request) -> bool;

    /// Called on the blank line ending the headers, before any switch to
    /// a body parser. Returning `false` (e.g. to issue a directory
    /// redirect) skips straight to `RESPONSE` without reading a body.
    fn check_continue(&self, request: &mut Request) -> bool {
        let _ = request;
        true
    }

    /// Whether a header this handler doesn't recognize by name should
    /// still be retained on the request. The catch-all handler declares
    /// every header interesting; most handlers name a short list.
    fn is_interesting_header(&self, name: &str) -> bool {
        let _ = name;
        false
    }

    /// Produce and attach a response. Called once the request has
    /// reached `RECEIVED`.
    fn handle_request(&self, request: &mut Request) -> Response;
}
