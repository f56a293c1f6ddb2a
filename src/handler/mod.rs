//! Request handler module
//!
//! Maps requests onto the served directory: path resolution, file
//! streaming and directory listings.

pub mod listing;
pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use resolve::{resolve, FileTarget, ResolvedTarget};
pub use router::handle_request;
