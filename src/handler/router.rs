//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, path
//! resolution and dispatch to file or listing responses.

use crate::config::AppState;
use crate::handler::resolve::{self, ResolvedTarget};
use crate::handler::static_files;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{HeaderValue, CONTENT_LENGTH, IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, SERVER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) request path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub if_none_match: Option<String>,
}

impl<'a> RequestContext<'a> {
    fn from_parts(parts: &'a Parts) -> Self {
        Self {
            path: parts.uri.path(),
            query: parts.uri.query(),
            is_head: parts.method == Method::HEAD,
            if_modified_since: header_string(&parts.headers, &IF_MODIFIED_SINCE),
            if_none_match: header_string(&parts.headers, &IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Never fails: every problem becomes a status code for this request only.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    // Retrieval requests carry no body worth reading
    let (parts, body) = req.into_parts();
    drop(body);

    let mut response = match check_http_method(&parts.method) {
        Some(resp) => resp,
        None => route_request(&RequestContext::from_parts(&parts), &state).await,
    };

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.config.logging.access_log {
        let entry = access_entry(&parts, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Only GET and HEAD retrieve; everything else is refused
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Resolve the path and dispatch on what it names
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    match resolve::resolve(&state.root, ctx.path, &state.config.http.index_files).await {
        ResolvedTarget::File(target) => static_files::serve_file(ctx, &target, &state.mime).await,
        ResolvedTarget::Directory(dir) => static_files::serve_listing(ctx, &dir).await,
        ResolvedTarget::AddSlash => http::build_301_response(&slash_location(ctx)),
        ResolvedTarget::NotFound => http::build_404_response(ctx.is_head),
    }
}

/// The request target with `/` appended to its path, query kept
fn slash_location(ctx: &RequestContext<'_>) -> String {
    match ctx.query {
        Some(query) => format!("{}/?{query}", ctx.path),
        None => format!("{}/", ctx.path),
    }
}

fn header_string(headers: &HeaderMap, name: &hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn access_entry(
    req: &Parts,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = if req.method == Method::HEAD {
        None
    } else {
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    };
    entry.referer = header_string(&req.headers, &REFERER);
    entry.user_agent = header_string(&req.headers, &USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_TYPE, LOCATION};
    use hyper::StatusCode;
    use tempfile::TempDir;

    fn state() -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.html"), "<p>hi</p>").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/one.txt"), "1").unwrap();
        let state = AppState::new(&Config::with_root(dir.path())).unwrap();
        (dir, Arc::new(state))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(state: &Arc<AppState>, method: &str, uri: &str) -> Response<ResponseBody> {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        handle_request(req, Arc::clone(state), peer()).await.unwrap()
    }

    async fn body_string(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_file() {
        let (_dir, state) = state();
        let response = send(&state, "GET", "/a.html").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        assert!(response.headers()[SERVER].to_str().unwrap().starts_with("servedir/"));
        assert_eq!(body_string(response).await, "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_post_is_405() {
        let (_dir, state) = state();
        for method in ["POST", "PUT", "DELETE", "OPTIONS"] {
            let response = send(&state, method, "/a.html").await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        }
    }

    #[tokio::test]
    async fn test_missing_is_404() {
        let (_dir, state) = state();
        let response = send(&state, "GET", "/missing.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_is_404() {
        let (_dir, state) = state();
        let response = send(&state, "GET", "/../etc/passwd").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!body_string(response).await.contains("root:"));
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let (_dir, state) = state();
        let response = send(&state, "GET", "/sub/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("<a href=\"one.txt\">one.txt</a>"));
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let (_dir, state) = state();
        let response = send(&state, "GET", "/sub").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/sub/");

        let response = send(&state, "HEAD", "/sub?sort=name").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/sub/?sort=name");
    }

    #[tokio::test]
    async fn test_query_string_is_ignored() {
        let (_dir, state) = state();
        let response = send(&state, "GET", "/a.html?cache=bust").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_access_entry_fields() {
        let req = Request::builder()
            .method("GET")
            .uri("/a.html?x=1")
            .version(Version::HTTP_10)
            .header(USER_AGENT, "curl/8.0")
            .body(())
            .unwrap();
        let (parts, ()) = req.into_parts();
        let response = http::build_html_response("abc".to_string(), false);
        let entry = access_entry(&parts, &response, peer(), Instant::now());
        assert_eq!(entry.remote_addr, "127.0.0.1");
        assert_eq!(entry.path, "/a.html");
        assert_eq!(entry.query.as_deref(), Some("x=1"));
        assert_eq!(entry.http_version, "1.0");
        assert_eq!(entry.body_bytes, Some(3));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
    }
}
