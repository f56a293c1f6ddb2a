//! HTTP protocol layer module
//!
//! Response builders, MIME detection and cache validation, decoupled from
//! the filesystem side of request handling.

pub mod cache;
pub mod mime;
pub mod response;

use http_body_util::combinators::UnsyncBoxBody;
use hyper::body::Bytes;

/// Body type shared by every response: buffered pages and streamed files
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

// Re-export commonly used items
pub use mime::MimeTable;
pub use response::{
    build_301_response, build_304_response, build_404_response, build_405_response, build_500_response,
    build_file_response, build_html_response, empty_body, full_body,
};
