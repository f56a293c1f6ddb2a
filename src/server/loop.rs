// Server loop module
// Accepts connections until the shutdown future completes

use std::future::Future;
use std::io::{self, ErrorKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::error::ServerError;
use crate::logger;

/// Pause before accepting again after running out of descriptors or memory
const EXHAUSTED_BACKOFF: Duration = Duration::from_millis(100);

/// How an accept error affects the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcceptFailure {
    /// One pending connection failed; accept the next
    Connection,
    /// Descriptor or memory limits; back off, then retry
    Exhausted,
    /// The listening socket itself is unusable
    Fatal,
}

/// Accept loop.
///
/// Every accepted connection is served on its own task. Returns `Ok(())`
/// once `shutdown` completes, or an error when the listening socket is
/// broken. Running out of file descriptors only pauses accepting.
pub async fn start_server_loop<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => match classify_accept_error(&e) {
                        AcceptFailure::Connection => {
                            logger::log_warning(&format!("Failed to accept connection: {e}"));
                        }
                        AcceptFailure::Exhausted => {
                            logger::log_error(&format!(
                                "Cannot accept connection: {e}; retrying in {}ms",
                                EXHAUSTED_BACKOFF.as_millis()
                            ));
                            tokio::time::sleep(EXHAUSTED_BACKOFF).await;
                        }
                        AcceptFailure::Fatal => {
                            logger::log_error(&format!("Listener failed: {e}"));
                            return Err(ServerError::Accept(e));
                        }
                    },
                }
            }

            () = &mut shutdown => {
                logger::log_server_stopped();
                return Ok(());
            }
        }
    }
}

fn classify_accept_error(err: &io::Error) -> AcceptFailure {
    if let Some(failure) = err.raw_os_error().and_then(classify_os_error) {
        return failure;
    }
    match err.kind() {
        ErrorKind::OutOfMemory => AcceptFailure::Exhausted,
        ErrorKind::InvalidInput => AcceptFailure::Fatal,
        _ => AcceptFailure::Connection,
    }
}

#[cfg(unix)]
const fn classify_os_error(code: i32) -> Option<AcceptFailure> {
    match code {
        libc::EMFILE | libc::ENFILE | libc::ENOBUFS | libc::ENOMEM => {
            Some(AcceptFailure::Exhausted)
        }
        libc::EBADF | libc::ENOTSOCK | libc::EINVAL | libc::EOPNOTSUPP | libc::EFAULT => {
            Some(AcceptFailure::Fatal)
        }
        _ => None,
    }
}

#[cfg(not(unix))]
const fn classify_os_error(_code: i32) -> Option<AcceptFailure> {
    None
}
