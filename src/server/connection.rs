// Connection handling module
// Serves one accepted TCP connection on its own task

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;

use super::idle::IdleTimeout;
use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection and hand it to its own task.
///
/// Returns immediately; the accept loop never waits on a client.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    logger::log_connection_accepted(&peer_addr);
    let _ = stream.set_nodelay(true);

    tokio::spawn(handle_connection(stream, peer_addr, Arc::clone(state)));
}

/// Serve every request of one connection.
///
/// This function:
/// 1. Wraps the TCP stream in `IdleTimeout`, then `TokioIo`
/// 2. Configures HTTP/1 keep-alive and the header read timeout
/// 3. Serves the connection with the request handler
///
/// A client that stops sending or reading for `idle_timeout` seconds is
/// dropped; one that keeps a download moving is served to the end.
async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    let performance = &state.config.performance;
    let read_timeout = Duration::from_secs(performance.read_timeout);
    let idle_timeout = Duration::from_secs(performance.idle_timeout);
    let io = TokioIo::new(IdleTimeout::new(stream, idle_timeout));

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(read_timeout)
        .keep_alive(performance.keep_alive);

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );

    if let Err(err) = conn.await {
        logger::log_connection_error(&format!("{peer_addr}: {err}"));
    }
}
