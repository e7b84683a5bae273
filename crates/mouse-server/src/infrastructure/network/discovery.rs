//! UDP discovery responder.
//!
//! The server binds a UDP socket on the discovery port (default 5001) and
//! answers every datagram whose content is exactly `DISCOVER_MOUSE_SERVER`
//! with a unicast reply to the sender:
//!
//! ```text
//! SERVER_IP:<host>:<control_port>:<secret_key>
//! ```
//!
//! Anything else is dropped without a reply.  A bad datagram or a failed
//! send is logged and the loop moves on to the next datagram.
//!
//! The responder runs on a dedicated thread with a blocking socket so it
//! never competes with connection tasks on the Tokio runtime.
//!
//! # Which address goes in the reply?
//!
//! 1. The configured `advertise_address`, if any.
//! 2. Otherwise the IP the socket is bound to, if it is a specific interface.
//! 3. Otherwise the local interface the OS would use to reach the prober.
//!    Connecting a throwaway UDP socket performs the route lookup without
//!    sending a packet.
//! 4. Loopback, as a last resort.
//!
//! # Read timeout
//!
//! The socket is configured with a 500 ms read timeout.  On each timeout the
//! loop checks the `running` flag; if the application is shutting down the
//! thread exits cleanly.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::JoinHandle;
use std::time::Duration;

use mouse_core::{protocol::discovery::is_discovery_probe, DiscoveryReply, SecretToken};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Largest datagram the responder reads; longer ones are truncated and can
/// never equal the probe.
const RECV_BUFFER_SIZE: usize = 1024;

/// How long one `recv_from` may block before the `running` flag is checked.
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Error type for discovery service operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound or configured.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The responder thread could not be started.
    #[error("failed to spawn discovery thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// What the responder advertises.
#[derive(Debug, Clone)]
pub struct DiscoveryAdvert {
    /// TCP control port included in every reply.
    pub control_port: u16,
    /// The current secret key.
    pub token: SecretToken,
    /// Fixed host address to advertise instead of resolving one per probe.
    pub advertise_address: Option<IpAddr>,
}

/// A bound discovery socket, ready to be started.
pub struct DiscoveryResponder {
    socket: UdpSocket,
    advert: DiscoveryAdvert,
}

impl DiscoveryResponder {
    /// Binds the discovery socket.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::BindFailed`] if the socket cannot be bound or
    /// its read timeout cannot be set.
    pub fn bind(addr: SocketAddr, advert: DiscoveryAdvert) -> Result<Self, DiscoveryError> {
        let socket =
            UdpSocket::bind(addr).map_err(|source| DiscoveryError::BindFailed { addr, source })?;
        socket
            .set_read_timeout(Some(RECV_POLL_INTERVAL))
            .map_err(|source| DiscoveryError::BindFailed { addr, source })?;
        Ok(Self { socket, advert })
    }

    /// The address actually bound (useful when binding port 0).
    ///
    /// # Errors
    ///
    /// Propagates the OS error from `getsockname`.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Starts the receive loop on a thread named `mouse-discovery`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Spawn`] if the OS refuses to create the thread.
    pub fn spawn(self, running: Arc<AtomicBool>) -> Result<JoinHandle<()>, DiscoveryError> {
        if let Ok(addr) = self.socket.local_addr() {
            info!("discovery responder listening on UDP {addr}");
        }
        std::thread::Builder::new()
            .name("mouse-discovery".to_string())
            .spawn(move || self.serve(&running))
            .map_err(DiscoveryError::Spawn)
    }

    /// The main receive loop executed on the discovery thread.
    fn serve(self, running: &AtomicBool) {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];

        while running.load(Ordering::Relaxed) {
            let (len, src) = match self.socket.recv_from(&mut buf) {
                Ok(pair) => pair,
                Err(e) if is_timeout_error(&e) => continue,
                Err(e) => {
                    error!("discovery recv error: {e}");
                    continue;
                }
            };

            let Some(reply) = self.reply_for(&buf[..len], src) else {
                continue;
            };
            match self.socket.send_to(reply.to_string().as_bytes(), src) {
                Ok(_) => debug!("answered discovery probe from {src}"),
                Err(e) => warn!("failed to send discovery reply to {src}: {e}"),
            }
        }

        info!("discovery responder stopped");
    }

    /// Builds the reply for one datagram, or `None` if it is not a probe.
    fn reply_for(&self, datagram: &[u8], src: SocketAddr) -> Option<DiscoveryReply> {
        let content = match std::str::from_utf8(datagram) {
            Ok(text) => text,
            Err(e) => {
                debug!("undecodable discovery datagram from {src}: {e}");
                return None;
            }
        };
        if !is_discovery_probe(content) {
            debug!("ignoring non-probe datagram from {src}");
            return None;
        }
        Some(DiscoveryReply {
            host: self.resolve_host(src),
            control_port: self.advert.control_port,
            secret_key: self.advert.token.to_string(),
        })
    }

    fn resolve_host(&self, peer: SocketAddr) -> IpAddr {
        if let Some(addr) = self.advert.advertise_address {
            return addr;
        }
        if let Ok(local) = self.socket.local_addr() {
            if !local.ip().is_unspecified() {
                return local.ip();
            }
        }
        route_local_ip(peer).unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

/// Returns the local interface address the OS would route `peer` through.
fn route_local_ip(peer: SocketAddr) -> Option<IpAddr> {
    let unspecified: IpAddr = match peer {
        SocketAddr::V4(_) => Ipv4Addr::UNSPECIFIED.into(),
        SocketAddr::V6(_) => Ipv6Addr::UNSPECIFIED.into(),
    };
    let probe = UdpSocket::bind((unspecified, 0)).ok()?;
    probe.connect(peer).ok()?;
    let ip = probe.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

/// Returns `true` for OS timeout / would-block errors that should be retried.
fn is_timeout_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn advert(advertise_address: Option<IpAddr>) -> DiscoveryAdvert {
        DiscoveryAdvert {
            control_port: 5000,
            token: SecretToken::from_value("DISC0VER").unwrap(),
            advertise_address,
        }
    }

    fn bind_any(advertise_address: Option<IpAddr>) -> DiscoveryResponder {
        DiscoveryResponder::bind("0.0.0.0:0".parse().unwrap(), advert(advertise_address)).unwrap()
    }

    fn src() -> SocketAddr {
        "127.0.0.1:45000".parse().unwrap()
    }

    #[test]
    fn test_is_timeout_error_recognises_timed_out_and_would_block() {
        assert!(is_timeout_error(&std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timed out"
        )));
        assert!(is_timeout_error(&std::io::Error::new(
            std::io::ErrorKind::WouldBlock,
            "would block"
        )));
    }

    #[test]
    fn test_is_timeout_error_returns_false_for_other_errors() {
        let e = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(!is_timeout_error(&e));
    }

    #[test]
    fn test_reply_for_probe_carries_port_and_key() {
        // Arrange
        let responder = bind_any(Some("10.1.2.3".parse().unwrap()));

        // Act
        let reply = responder.reply_for(b"DISCOVER_MOUSE_SERVER", src()).unwrap();

        // Assert
        assert_eq!(reply.to_string(), "SERVER_IP:10.1.2.3:5000:DISC0VER");
    }

    #[test]
    fn test_reply_for_ignores_other_content() {
        let responder = bind_any(None);
        assert!(responder.reply_for(b"HELLO", src()).is_none());
        assert!(responder.reply_for(b"DISCOVER_MOUSE_SERVER\n", src()).is_none());
        assert!(responder.reply_for(b"", src()).is_none());
    }

    #[test]
    fn test_reply_for_ignores_invalid_utf8() {
        let responder = bind_any(None);
        assert!(responder.reply_for(&[0xff, 0x00, 0xfe], src()).is_none());
    }

    #[test]
    fn test_resolve_host_uses_specific_bind_address() {
        let responder =
            DiscoveryResponder::bind("127.0.0.1:0".parse().unwrap(), advert(None)).unwrap();
        assert_eq!(
            responder.resolve_host(src()),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }

    #[test]
    fn test_route_local_ip_for_loopback_peer_is_loopback() {
        assert_eq!(
            route_local_ip(src()),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
    }

    #[test]
    fn test_spawned_responder_stops_when_flag_cleared() {
        // Arrange
        let responder = bind_any(None);
        let running = Arc::new(AtomicBool::new(false));

        // Act
        let handle = responder.spawn(Arc::clone(&running)).unwrap();

        // Assert – the thread sees the cleared flag and exits
        handle.join().unwrap();
    }
}
