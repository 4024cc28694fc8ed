//! A cooperative, single-threaded HTTP/1.x server core for memory-
//! constrained targets: incremental parsing, a send-buffer-aware
//! response pump, keep-alive, 100-continue, chunked transfer, static
//! file serving, Basic/Digest auth, and Server-Sent Events.
#![recursion_limit = "100"]

#[macro_use(quick_error)] extern crate quick_error;
#[macro_use] extern crate matches;
#[macro_use] extern crate log;

pub mod auth;
pub mod config;
pub mod enums;
pub mod error;
pub mod handler;
pub mod headers;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod rewrite;
pub mod scheduler;
pub mod server;
pub mod sse;
pub mod transport;
pub mod url;

pub use config::{Config, HandlerConfig};
pub use enums::{Method, Status, Version};
pub use error::Error;
pub use handler::Handler;
pub use request::{AuthType, Connection, Request, RequestState};
pub use response::{ContentSource, Response, ResponseState};
#[cfg(feature = "json")]
pub use response::json::json_content;
pub use server::Server;
pub use transport::Transport;
