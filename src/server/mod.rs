// Server module entry point
// Binding, the accept loop and per-connection serving

pub mod connection;
pub mod idle;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is renamed
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::error::ServerError;
use crate::logger;

// Re-export commonly used items
pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::shutdown_signal;

/// A bound, not yet running server
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
}

impl Server {
    /// Resolve the root directory and bind the listening socket.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let state = AppState::new(config)?;
        Self::bind_with_state(state)
    }

    pub fn bind_with_state(state: AppState) -> Result<Self, ServerError> {
        let addr = state.config.get_socket_addr()?;
        let bind_error = |source| ServerError::Bind { addr, source };
        let listener = create_listener(addr).map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(state),
        })
    }

    /// Address actually bound; differs from the configured one for port 0
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Accept connections until `shutdown` completes
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        start_server_loop(self.listener, self.state, shutdown).await
    }
}

/// Bind, announce the port on stdout, and serve until `shutdown` completes
pub async fn serve_forever<F>(config: &Config, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    let server = Server::bind(config)?;
    logger::log_server_start(&server.local_addr(), &server.state.root, config);
    server.run(shutdown).await
}
