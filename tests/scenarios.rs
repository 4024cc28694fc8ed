mod common;

use common::{drain_request, MockTransport};
use mc_http::config::HandlerConfig;
use mc_http::enums::{Method, Version};
use mc_http::handler::callback::CallbackHandler;
use mc_http::handler::static_file::StaticFileHandler;
use mc_http::response::{ContentSource, Response};
use mc_http::scheduler::Scheduler;
use mc_http::sse::format_frame;
use mc_http::url::parse_query;
use mc_http::{Connection, Request, Server};

fn drive(server: &Server, input: &[u8]) -> (Request, MockTransport) {
    let mut req = Request::new(Version::Http11);
    let mut t = MockTransport::new(4096);
    req.on_data(input, server, &mut t);
    (req, t)
}

/// S1: a plain file under a static handler mounted at "/" is served with
/// its full headers and body, driven end to end from raw request bytes.
#[test]
fn s1_static_file_served_with_content_length_and_type() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("foo"), b"abc").unwrap();
    let mut server = Server::new();
    server.add_handler(StaticFileHandler::new(HandlerConfig::new(Method::GET, "/"), dir.path()));

    let (mut req, mut t) = drive(&server, b"GET /foo HTTP/1.1\r\nHost: x\r\n\r\n");
    assert_eq!(req.response.as_ref().map(|r| r.code()), Some(200));
    drain_request(&mut req, &mut t);

    let out = t.sent_as_string();
    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(out.contains("Content-Length: 3\r\n"));
    assert!(out.contains("Content-Type: application/octet-stream\r\n"));
    assert!(out.contains("Accept-Ranges: none\r\n"));
    assert!(out.ends_with("abc"));
}

/// S2: a matching If-None-Match against the computed ETag yields 304
/// with no body.
#[test]
fn s2_matching_etag_yields_304() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.htm"), b"abc").unwrap();
    let mtime_hex = {
        let meta = std::fs::metadata(dir.path().join("index.htm")).unwrap();
        let secs = meta.modified().unwrap()
            .duration_since(std::time::UNIX_EPOCH).unwrap().as_secs();
        format!("{:x}", secs)
    };
    let mut server = Server::new();
    server.add_handler(StaticFileHandler::new(HandlerConfig::new(Method::GET, "/"), dir.path()));

    let input = format!(
        "GET / HTTP/1.1\r\nHost: x\r\nIf-None-Match: W/\"3@{}\"\r\n\r\n", mtime_hex);
    let (mut req, mut t) = drive(&server, input.as_bytes());
    drain_request(&mut req, &mut t);
    assert!(t.sent_as_string().starts_with("HTTP/1.1 304 Not Modified\r\n"));
}

/// S3: requesting a directory without a trailing slash redirects. The
/// handler's own fallback inside `handle_request` does this (not
/// `check_continue`, which only fires when the request path is exactly
/// the mount point itself).
#[test]
fn s3_directory_without_trailing_slash_redirects() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("dir")).unwrap();
    std::fs::write(dir.path().join("dir/index.htm"), b"x").unwrap();
    let mut server = Server::new();
    server.add_handler(StaticFileHandler::new(HandlerConfig::new(Method::GET, "/"), dir.path()));

    let (mut req, mut t) = drive(&server, b"GET /dir HTTP/1.1\r\nHost: x\r\n\r\n");
    assert_eq!(req.response.as_ref().map(|r| r.code()), Some(302));
    drain_request(&mut req, &mut t);
    let out = t.sent_as_string();
    assert!(out.starts_with("HTTP/1.1 302 Found\r\n"));
    assert!(out.contains("Location: /dir/\r\n"));
}

/// S4: a request with `Expect: 100-continue` gets the literal continue
/// line written immediately, before the handler's own response exists.
#[test]
fn s4_100_continue_precedes_the_handlers_response() {
    let mut server = Server::new();
    server.add_handler(CallbackHandler::new(Method::POST, "/x", |req| {
        let mut r = Response::new(req.version(), 200, "OK");
        assert_eq!(req.body(), b"abcd");
        r.set_content(ContentSource::owned(b"ok".to_vec()), 2);
        r
    }));

    let mut req = Request::new(Version::Http11);
    let mut t = MockTransport::new(4096);
    req.on_data(
        b"POST /x HTTP/1.1\r\nHost: x\r\nExpect: 100-continue\r\nContent-Length: 4\r\n\r\nabcd",
        &server, &mut t);

    assert!(t.sent_as_string().starts_with("HTTP/1.1 100 Continue\r\n\r\n"));
    assert_eq!(req.response.as_ref().map(|r| r.code()), Some(200));

    drain_request(&mut req, &mut t);
    let out = t.sent_as_string();
    assert!(out.contains("HTTP/1.1 200 OK\r\n"));
    assert!(out.ends_with("ok"));
}

/// S6: two live connections inserted into a `Scheduler` each make
/// progress on one tick — neither starves the other. A response's pump
/// stalls at `WaitAck` until its in-flight bytes are acknowledged, which
/// keeps both entries live after a single tick with writes visible on
/// both, rather than collapsing into "first connection runs to
/// completion, second gets nothing."
#[test]
fn s6_scheduler_gives_each_live_connection_progress_per_tick() {
    let mut server = Server::new();
    server.add_handler(CallbackHandler::new(Method::GET, "/", |req| {
        let mut r = Response::new(req.version(), 200, "OK");
        r.set_content(ContentSource::owned(vec![b'x'; 1_000]), 1_000);
        r
    }));

    let mut sched: Scheduler<Connection<MockTransport>> = Scheduler::new();
    for _ in 0..2 {
        let mut req = Request::new(Version::Http11);
        let mut t = MockTransport::new(64);
        req.on_data(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n", &server, &mut t);
        sched.insert(Connection::new(req, t));
    }
    assert_eq!(sched.len(), 2);

    sched.tick(true);

    assert_eq!(sched.len(), 2, "neither connection is acked yet, so neither reaches End");
    let sent_lens: Vec<usize> = sched.entries().map(|c| c.transport.sent.len()).collect();
    assert_eq!(sent_lens.len(), 2);
    assert!(sent_lens.iter().all(|&n| n > 0), "every live connection should have written something: {:?}", sent_lens);
}

/// S5: SSE emits a frame byte-exactly reconstructable by a conformant
/// consumer.
#[test]
fn s5_sse_frame_matches_expected_bytes() {
    let frame = format_frame("hi", Some("ping"), Some("18"), None);
    assert_eq!(frame, b"id: 18\r\nevent: ping\r\ndata: hi\r\n\r\n");
}

/// No handler matching a route, and no catch-all registered, yields the
/// framework's own 501 rather than any handler's default.
#[test]
fn unmatched_route_with_no_catch_all_yields_501() {
    let server = Server::new();
    let (mut req, mut t) = drive(&server, b"GET /nope HTTP/1.1\r\nHost: x\r\n\r\n");
    assert_eq!(req.response.as_ref().map(|r| r.code()), Some(501));
    drain_request(&mut req, &mut t);
    assert!(t.sent_as_string().starts_with("HTTP/1.1 501 Not Implemented\r\n"));
}

/// Round-trip law: query parsing preserves order and handles blanks.
#[test]
fn query_parse_round_trip_law() {
    assert_eq!(parse_query("a=1&b=&c=3"), vec![
        ("a".to_string(), "1".to_string()),
        ("b".to_string(), "".to_string()),
        ("c".to_string(), "3".to_string()),
    ]);
    assert_eq!(parse_query("&&a=1&"), vec![("a".to_string(), "1".to_string())]);
}
