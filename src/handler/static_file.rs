//! Serves files from a directory under a configured URL prefix, with
//! gzip-variant preference and ETag-based conditional responses.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::config::HandlerConfig;
use crate::handler::Handler;
use crate::mime;
use crate::request::Request;
use crate::response::{ContentSource, Response};

/// `onPathNotFound` / `onIndexNotFound` / `onDirRedirect` / `onIndex` /
/// `onRequest` callback slots, each optionally overriding the handler's
/// default behavior for that branch.
pub struct Callbacks {
    pub on_path_not_found: Option<Box<dyn Fn(&Request) -> Response>>,
    pub on_index_not_found: Option<Box<dyn Fn(&Request) -> Response>>,
    pub on_dir_redirect: Option<Box<dyn Fn(&Request) -> Response>>,
    pub on_index: Option<Box<dyn Fn(&Request, &Path) -> Response>>,
    pub on_request: Option<Box<dyn Fn(&Request) -> Option<Response>>>,
}

impl Default for Callbacks {
    fn default() -> Callbacks {
        Callbacks {
            on_path_not_found: None,
            on_index_not_found: None,
            on_dir_redirect: None,
            on_index: None,
            on_request: None,
        }
    }
}

pub struct StaticFileHandler {
    config: HandlerConfig,
    root: PathBuf,
    gz_lookup: bool,
    callbacks: Callbacks,
}

impl StaticFileHandler {
    pub fn new(config: HandlerConfig, root: impl Into<PathBuf>) -> StaticFileHandler {
        StaticFileHandler { config, root: root.into(), gz_lookup: true, callbacks: Callbacks::default() }
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn gz_lookup(mut self, on: bool) -> Self {
        self.gz_lookup = on;
        self
    }

    fn not_found(&self, request: &Request) -> Response {
        if let Some(cb) = &self.callbacks.on_path_not_found {
            return cb(request);
        }
        let mut resp = Response::new(request.version(), 404, "Not Found");
        resp.set_content(ContentSource::Empty, 0);
        resp
    }

    fn forbidden(&self, request: &Request) -> Response {
        if let Some(cb) = &self.callbacks.on_index_not_found {
            return cb(request);
        }
        let mut resp = Response::new(request.version(), 403, "Forbidden");
        resp.set_content(ContentSource::Empty, 0);
        resp
    }

    fn dir_redirect(&self, request: &Request) -> Response {
        if let Some(cb) = &self.callbacks.on_dir_redirect {
            return cb(request);
        }
        let mut location = format!("{}/", request.path());
        if !request.raw_query().is_empty() {
            location.push('?');
            location.push_str(request.raw_query());
        }
        let mut resp = Response::new(request.version(), 302, "Found");
        resp.add_header("Location", location);
        resp.set_content(ContentSource::Empty, 0);
        resp
    }

    /// Open `subpath` under `root`, preferring or falling back to a
    /// `.gz` sibling per the configured lookup order. Returns the opened
    /// file, whether it was the gzip variant, and its metadata.
    fn open_variant(&self, subpath: &str, accept_gzip: bool)
        -> Option<(fs::File, bool, fs::Metadata)>
    {
        let plain = self.root.join(subpath.trim_start_matches('/'));
        let gz = {
            let mut p = plain.clone().into_os_string();
            p.push(".gz");
            PathBuf::from(p)
        };
        let open_file = |p: &Path| fs::File::open(p).ok()
            .and_then(|f| f.metadata().ok().filter(|m| m.is_file()).map(|m| (f, m)));
        let try_plain = open_file;
        let try_gz = open_file;

        let want_gzip = self.gz_lookup && accept_gzip;
        if want_gzip && self.config.get_gzip_first() {
            if let Some((f, m)) = try_gz(&gz) {
                return Some((f, true, m));
            }
            try_plain(&plain).map(|(f, m)| (f, false, m))
        } else if want_gzip {
            if let Some((f, m)) = try_plain(&plain) {
                return Some((f, false, m));
            }
            try_gz(&gz).map(|(f, m)| (f, true, m))
        } else {
            try_plain(&plain).map(|(f, m)| (f, false, m))
        }
    }
}

impl Handler for StaticFileHandler {
    fn can_handle(&self, request: &Request) -> bool {
        if !self.config.get_methods().intersects(request.method()) {
            return false;
        }
        let path = request.path();
        let stored = self.config.get_path();
        path.starts_with(stored) || format!("{}/", path) == stored
    }

    fn check_continue(&self, request: &mut Request) -> bool {
        let path = request.path().to_string();
        let stored = self.config.get_path();
        if format!("{}/", path) == stored {
            request.response = Some(self.dir_redirect(request));
            return false;
        }
        true
    }

    fn is_interesting_header(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case("accept-encoding") || name.eq_ignore_ascii_case("if-none-match")
    }

    fn handle_request(&self, request: &mut Request) -> Response {
        if let Some(cb) = &self.callbacks.on_request {
            if let Some(resp) = cb(request) {
                return resp;
            }
        }

        let stored = self.config.get_path();
        let mut subpath = request.path()[stored.len().min(request.path().len())..].to_string();

        if subpath.is_empty() || subpath.ends_with('/') {
            if let Some(cb) = &self.callbacks.on_index {
                let dir = self.root.join(subpath.trim_start_matches('/'));
                return cb(request, &dir);
            }
            let index_file = self.config.get_index_file();
            if index_file.is_empty() {
                subpath.clear();
            } else {
                subpath.push_str(index_file);
            }
        }

        let accept_gzip = request.header("Accept-Encoding")
            .map(|v| v.iter().any(|val| val.contains("gzip")))
            .unwrap_or(false);

        let opened = self.open_variant(&subpath, accept_gzip);
        let (file, is_gzip, meta) = match opened {
            Some(v) => v,
            None => {
                if !request.path().ends_with('/') {
                    let dir_path = self.root.join(subpath.trim_start_matches('/').trim_end_matches(
                        self.config.get_index_file()));
                    if dir_path.is_dir() {
                        return self.dir_redirect(request);
                    }
                }
                return self.not_found(request);
            }
        };

        let size = meta.len();
        let mtime_hex = meta.modified().ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| format!("{:x}", d.as_secs()))
            .unwrap_or_else(|| "0".to_string());
        let etag = format!("W/\"{}@{}\"", size, mtime_hex);

        if !self.config.get_cache_control().is_empty() {
            if let Some(values) = request.header("If-None-Match") {
                if values.iter().any(|v| v == &etag) {
                    let mut resp = Response::new(request.version(), 304, "Not Modified");
                    resp.set_content(ContentSource::Empty, 0);
                    return resp;
                }
            }
        }

        let mut resp = Response::new(request.version(), 200, "OK");
        if !self.config.get_cache_control().is_empty() {
            resp.add_header("Cache-Control", self.config.get_cache_control().to_string());
            resp.add_header("ETag", etag);
        }
        if is_gzip {
            resp.add_header("Content-Encoding", "gzip");
        }
        let mime_subpath = if is_gzip { subpath.trim_end_matches(".gz") } else { subpath.as_str() };
        resp.add_header("Content-Type", mime::from_path(mime_subpath));
        #[cfg(feature = "date_header")]
        if self.config.get_last_modified() {
            if let Ok(modified) = meta.modified() {
                resp.add_header("Last-Modified", httpdate::fmt_http_date(modified));
            }
        }
        resp.set_content(ContentSource::file(file), size);
        if request.method() == crate::enums::Method::HEAD {
            resp.set_content(ContentSource::Empty, size);
        }
        resp
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::enums::{Method, Version};

    fn mk_root() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn serves_existing_plain_file() {
        let dir = mk_root();
        std::fs::write(dir.path().join("foo"), b"abc").unwrap();
        let cfg = HandlerConfig::new(Method::GET, "/");
        let h = StaticFileHandler::new(cfg, dir.path());
        let mut req = Request::new(Version::Http11);
        req.set_path("/foo".to_string());
        req.set_method(Method::GET);
        assert!(h.can_handle(&req));
        let resp = h.handle_request(&mut req);
        assert_eq!(resp.code(), 200);
    }

    #[test]
    fn missing_file_is_404() {
        let dir = mk_root();
        let cfg = HandlerConfig::new(Method::GET, "/");
        let h = StaticFileHandler::new(cfg, dir.path());
        let mut req = Request::new(Version::Http11);
        req.set_path("/nope".to_string());
        let resp = h.handle_request(&mut req);
        assert_eq!(resp.code(), 404);
    }

    #[test]
    fn directory_missing_trailing_slash_redirects() {
        let dir = mk_root();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/index.htm"), b"hi").unwrap();
        let cfg = HandlerConfig::new(Method::GET, "/");
        let h = StaticFileHandler::new(cfg, dir.path());
        let mut req = Request::new(Version::Http11);
        req.set_path("/sub".to_string());
        let resp = h.handle_request(&mut req);
        assert_eq!(resp.code(), 302);
    }
}
