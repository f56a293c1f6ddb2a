//! Static file serving module
//!
//! Streams resolved files and renders directory listings.

use std::path::Path;

use futures::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::Response;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::handler::listing;
use crate::handler::resolve::FileTarget;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, MimeTable, ResponseBody};
use crate::logger;

/// Serve a regular file.
///
/// The file is opened before any header is written, so a file that vanished
/// or became unreadable after resolution still gets a clean 500.
pub async fn serve_file(
    ctx: &RequestContext<'_>,
    target: &FileTarget,
    mime: &MimeTable,
) -> Response<ResponseBody> {
    let last_modified = target.modified.map(cache::format_last_modified);

    if let (Some(modified), Some(header)) = (target.modified, last_modified.as_deref()) {
        if cache::is_not_modified(
            ctx.if_modified_since.as_deref(),
            ctx.if_none_match.as_deref(),
            modified,
        ) {
            return http::build_304_response(header);
        }
    }

    let file = match File::open(&target.path).await {
        Ok(f) => f,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to open file '{}': {}",
                target.path.display(),
                e
            ));
            return http::build_500_response(ctx.is_head);
        }
    };

    let content_type = mime.for_path(&target.requested);
    logger::log_debug(&format!(
        "Streaming {} ({} bytes, {content_type})",
        target.path.display(),
        target.size
    ));

    let body = if ctx.is_head {
        http::empty_body()
    } else {
        StreamBody::new(ReaderStream::new(file).map_ok(Frame::data)).boxed_unsync()
    };

    http::build_file_response(body, content_type, target.size, last_modified.as_deref())
}

/// Serve the generated listing for a directory without index file
pub async fn serve_listing(ctx: &RequestContext<'_>, dir: &Path) -> Response<ResponseBody> {
    match listing::read_entries(dir).await {
        Ok(entries) => {
            let html = listing::render(ctx.path, &entries);
            http::build_html_response(html, ctx.is_head)
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to list directory '{}': {}",
                dir.display(),
                e
            ));
            http::build_500_response(ctx.is_head)
        }
    }
}
