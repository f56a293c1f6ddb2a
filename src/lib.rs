//! Minimal static file HTTP server.
//!
//! Serves a directory over HTTP/1.x: GET and HEAD map request paths onto
//! files below the root, directories answer with their index file or a
//! generated listing, and everything else gets a small HTML error page.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{AppState, Config};
pub use error::ServerError;
pub use server::{serve_forever, Server};
