//! Control listener: TCP accept loop and per-connection task spawning.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the control port with `SO_REUSEADDR`, so a
//!    restart does not fail on a socket lingering in `TIME_WAIT`.
//! 2. Accepting connections in a loop until the `running` flag is cleared.
//! 3. Handing each connection to its own Tokio task running
//!    [`handle_connection`].
//!
//! # Scalability
//!
//! The accept loop never waits on a session: it accepts a connection and
//! immediately spawns a task for it before accepting the next one.  There is
//! no connection limit; the only bound is what the OS allows.  Sessions share
//! nothing mutable, so no lock sits on the command path.
//!
//! # Shutdown
//!
//! `accept()` is wrapped in a short timeout so the loop notices a cleared
//! `running` flag even when nobody connects.  Sessions that are already
//! running are not interrupted.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};
use tokio::time::timeout;
use tracing::{error, info};

use crate::infrastructure::network::session::{handle_connection, SessionContext};

/// Pending-connection queue length passed to `listen`.
const LISTEN_BACKLOG: u32 = 1024;

/// How often the accept loop re-checks the `running` flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Error type for listener setup.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("bind failed on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// The bound control listener, ready to run.
pub struct ControlListener {
    listener: TcpListener,
    context: Arc<SessionContext>,
}

impl ControlListener {
    /// Binds `addr` with address reuse enabled.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::BindFailed`] if the socket cannot be created,
    /// configured, bound, or put into listening mode.
    pub fn bind(addr: SocketAddr, context: SessionContext) -> Result<Self, NetworkError> {
        let bind_failed = |source| NetworkError::BindFailed { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_failed)?;
        socket.set_reuseaddr(true).map_err(bind_failed)?;
        socket.bind(addr).map_err(bind_failed)?;
        let listener = socket.listen(LISTEN_BACKLOG).map_err(bind_failed)?;

        Ok(Self {
            listener,
            context: Arc::new(context),
        })
    }

    /// The address actually bound (useful when binding port 0).
    ///
    /// # Errors
    ///
    /// Propagates the OS error from `getsockname`.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until `running` is set to `false`.
    ///
    /// A failed `accept` is logged and the loop carries on.
    pub async fn run(self, running: Arc<AtomicBool>) {
        match self.listener.local_addr() {
            Ok(addr) => info!("control listener accepting on TCP {addr}"),
            Err(e) => error!("control listener has no local address: {e}"),
        }

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            match timeout(ACCEPT_POLL_INTERVAL, self.listener.accept()).await {
                Ok(Ok((stream, peer))) => {
                    let ctx = Arc::clone(&self.context);
                    tokio::spawn(async move {
                        handle_connection(stream, peer, &ctx).await;
                    });
                }
                Ok(Err(e)) => {
                    // Transient accept error (e.g., too many open file descriptors).
                    error!("accept error: {e}");
                }
                Err(_) => {
                    // Timeout; loop back to check the `running` flag.
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
