//! Mouse server entry point.
//!
//! Wires together the infrastructure services and runs until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- optional log level / advertised address
//!  └─ SecretToken::generate() -- printed once for the operator
//!  └─ start services
//!       ├─ ControlListener    (Tokio accept loop, one task per connection)
//!       └─ DiscoveryResponder (UDP background thread)
//! ```

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mouse_core::SecretToken;
use mouse_server::application::dispatch_command::CommandDispatcher;
use mouse_server::infrastructure::actuator::TracingActuator;
use mouse_server::infrastructure::network::{
    ControlListener, DiscoveryAdvert, DiscoveryResponder, SessionContext, BIND_ADDRESS,
    CONTROL_PORT, DEFAULT_READ_BUFFER_SIZE, DISCOVERY_PORT,
};
use mouse_server::infrastructure::storage::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config().context("failed to load configuration")?;

    // Structured logging.  `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.server.log_level)),
        )
        .init();

    info!("mouse server starting");

    let token = SecretToken::generate();
    info!("secret key: {token}");

    let dispatcher = CommandDispatcher::new(Arc::new(TracingActuator::new()));
    let context = SessionContext::new(token.clone(), dispatcher, DEFAULT_READ_BUFFER_SIZE);

    // Shutdown flag shared by both listeners.
    let running = Arc::new(AtomicBool::new(true));

    // ── Control listener ──────────────────────────────────────────────────────
    let listener = ControlListener::bind(SocketAddr::new(BIND_ADDRESS, CONTROL_PORT), context)
        .context("failed to start control listener")?;
    let control_port = listener
        .local_addr()
        .context("control listener has no local address")?
        .port();

    // ── Discovery responder ───────────────────────────────────────────────────
    let advert = DiscoveryAdvert {
        control_port,
        token,
        advertise_address: cfg.network.advertise_ip()?,
    };
    let discovery = DiscoveryResponder::bind(SocketAddr::new(BIND_ADDRESS, DISCOVERY_PORT), advert)
        .context("failed to start discovery responder")?
        .spawn(Arc::clone(&running))?;

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    info!("mouse server ready.  Press Ctrl-C to exit.");
    listener.run(Arc::clone(&running)).await;

    match tokio::task::spawn_blocking(move || discovery.join()).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => error!("discovery thread panicked"),
        Err(e) => error!("failed to join discovery thread: {e}"),
    }

    info!("mouse server stopped");
    Ok(())
}
