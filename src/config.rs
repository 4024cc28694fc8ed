//! Server- and handler-level configuration, built with the same
//! `&mut self -> &mut Self`, then `.done() -> Arc<Self>` convention used
//! throughout this crate's builders.

use std::sync::Arc;

use crate::enums::Method;

/// Server-wide tunables.
#[derive(Debug, Clone)]
pub struct Config {
    idle_timeout_secs: u32,
    realm: String,
    max_inflight: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            idle_timeout_secs: 5,
            realm: "ESP8266".to_string(),
            max_inflight: 1,
        }
    }
}

impl Config {
    /// Create a config with defaults: 5s idle timeout, realm `"ESP8266"`,
    /// one in-flight request per connection.
    pub fn new() -> Config {
        Config::default()
    }

    /// Seconds of RX inactivity before a connection is torn down.
    pub fn idle_timeout_secs(&mut self, value: u32) -> &mut Self {
        self.idle_timeout_secs = value;
        self
    }

    /// Realm string presented in Basic/Digest `WWW-Authenticate` challenges
    /// for handlers that don't override it.
    pub fn realm(&mut self, value: impl Into<String>) -> &mut Self {
        self.realm = value.into();
        self
    }

    /// Number of requests a single connection may have pending on the
    /// scheduler at once before it stops reading further request lines.
    pub fn max_inflight(&mut self, value: usize) -> &mut Self {
        self.max_inflight = value;
        self
    }

    pub fn get_idle_timeout_secs(&self) -> u32 {
        self.idle_timeout_secs
    }

    pub fn get_realm(&self) -> &str {
        &self.realm
    }

    pub fn get_max_inflight(&self) -> usize {
        self.max_inflight
    }

    /// Create an `Arc`'d clone to hand to the server constructor.
    pub fn done(&mut self) -> Arc<Config> {
        Arc::new(self.clone())
    }
}

/// Per-handler registration settings: the method mask and path this
/// handler answers to, plus the knobs specific to the static file handler.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    methods: Method,
    path: String,
    cache_control: String,
    index_file: String,
    gzip_first: bool,
    last_modified: bool,
}

impl HandlerConfig {
    /// A handler config for `methods` mounted at `path`. Defaults:
    /// `Cache-Control: public, no-cache`, index file `index.htm`, gzip
    /// variants preferred over plain files when both exist, and
    /// `Last-Modified`/ETag validation enabled.
    pub fn new(methods: Method, path: impl Into<String>) -> HandlerConfig {
        HandlerConfig {
            methods,
            path: path.into(),
            cache_control: "public, no-cache".to_string(),
            index_file: "index.htm".to_string(),
            gzip_first: true,
            last_modified: true,
        }
    }

    pub fn cache_control(&mut self, value: impl Into<String>) -> &mut Self {
        self.cache_control = value.into();
        self
    }

    pub fn index_file(&mut self, value: impl Into<String>) -> &mut Self {
        self.index_file = value.into();
        self
    }

    /// When `false`, a plain file is served even if a `.gz` sibling exists
    /// and the client accepts gzip encoding.
    pub fn gzip_first(&mut self, value: bool) -> &mut Self {
        self.gzip_first = value;
        self
    }

    pub fn last_modified(&mut self, value: bool) -> &mut Self {
        self.last_modified = value;
        self
    }

    pub fn get_methods(&self) -> Method {
        self.methods
    }

    pub fn get_path(&self) -> &str {
        &self.path
    }

    pub fn get_cache_control(&self) -> &str {
        &self.cache_control
    }

    pub fn get_index_file(&self) -> &str {
        &self.index_file
    }

    pub fn get_gzip_first(&self) -> bool {
        self.gzip_first
    }

    pub fn get_last_modified(&self) -> bool {
        self.last_modified
    }

    pub fn done(&mut self) -> Arc<HandlerConfig> {
        Arc::new(self.clone())
    }
}
