//! LAN discovery wire format.
//!
//! # How discovery works (for beginners)
//!
//! A client that does not know where the server lives sends a single UDP
//! datagram containing the exact ASCII text `DISCOVER_MOUSE_SERVER`, usually
//! to the broadcast address `255.255.255.255` on the discovery port.  Every
//! machine on the LAN receives it; only the mouse server answers, with a
//! unicast datagram back to the sender:
//!
//! ```text
//! SERVER_IP:192.168.1.20:5000:K7Q2ZP0A
//!           └─ host ──┘ └port┘ └ key ┘
//! ```
//!
//! Fields are separated by `:` and never escaped.  The key alphabet has no
//! colon, so a reader can always split from the right; that keeps an IPv6
//! host (which itself contains colons) unambiguous.
//!
//! Any datagram whose content is not exactly the probe literal gets no reply.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use thiserror::Error;

/// The probe literal a client sends to locate the server.
pub const DISCOVERY_PROBE: &str = "DISCOVER_MOUSE_SERVER";

/// Leading tag of every discovery reply.
pub const REPLY_PREFIX: &str = "SERVER_IP";

/// Returns `true` only for an exact match of [`DISCOVERY_PROBE`].
///
/// No trimming is applied: `"DISCOVER_MOUSE_SERVER\n"` is not a probe.
pub fn is_discovery_probe(content: &str) -> bool {
    content == DISCOVERY_PROBE
}

/// Errors when decoding a discovery reply on the client side.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryReplyError {
    #[error("reply does not start with SERVER_IP:")]
    MissingPrefix,
    #[error("reply is missing the {0} field")]
    MissingField(&'static str),
    #[error("invalid host address: {0}")]
    InvalidHost(String),
    #[error("invalid control port: {0}")]
    InvalidPort(String),
}

/// The server's answer to a discovery probe.
///
/// Built fresh for every probe so it always carries the current host address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReply {
    /// Address clients should connect to.
    pub host: IpAddr,
    /// TCP control port.
    pub control_port: u16,
    /// The secret key clients must send as their first line.
    pub secret_key: String,
}

impl fmt::Display for DiscoveryReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{REPLY_PREFIX}:{}:{}:{}",
            self.host, self.control_port, self.secret_key
        )
    }
}

impl FromStr for DiscoveryReply {
    type Err = DiscoveryReplyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .trim_end()
            .strip_prefix(REPLY_PREFIX)
            .and_then(|r| r.strip_prefix(':'))
            .ok_or(DiscoveryReplyError::MissingPrefix)?;

        // Split from the right: key, then port, then whatever remains is the host.
        let mut fields = rest.rsplitn(3, ':');
        let secret_key = fields
            .next()
            .filter(|k| !k.is_empty())
            .ok_or(DiscoveryReplyError::MissingField("secret key"))?;
        let port = fields
            .next()
            .ok_or(DiscoveryReplyError::MissingField("control port"))?;
        let host = fields
            .next()
            .ok_or(DiscoveryReplyError::MissingField("host"))?;

        Ok(Self {
            host: host
                .parse()
                .map_err(|_| DiscoveryReplyError::InvalidHost(host.to_string()))?,
            control_port: port
                .parse()
                .map_err(|_| DiscoveryReplyError::InvalidPort(port.to_string()))?,
            secret_key: secret_key.to_string(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_is_discovery_probe_exact_match_only() {
        assert!(is_discovery_probe("DISCOVER_MOUSE_SERVER"));
        assert!(!is_discovery_probe("DISCOVER_MOUSE_SERVER\n"));
        assert!(!is_discovery_probe("discover_mouse_server"));
        assert!(!is_discovery_probe(""));
    }

    #[test]
    fn test_reply_display_uses_colon_layout() {
        // Arrange
        let reply = DiscoveryReply {
            host: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
            control_port: 5000,
            secret_key: "K7Q2ZP0A".to_string(),
        };

        // Act / Assert
        assert_eq!(reply.to_string(), "SERVER_IP:192.168.1.20:5000:K7Q2ZP0A");
    }

    #[test]
    fn test_reply_parse_ipv4() {
        let reply: DiscoveryReply = "SERVER_IP:10.0.0.7:5000:ABCD1234".parse().unwrap();
        assert_eq!(reply.host, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));
        assert_eq!(reply.control_port, 5000);
        assert_eq!(reply.secret_key, "ABCD1234");
    }

    #[test]
    fn test_reply_parse_ipv6_host_with_colons() {
        let reply: DiscoveryReply = "SERVER_IP:fe80::1:5000:ABCD1234".parse().unwrap();
        assert_eq!(reply.host, IpAddr::V6("fe80::1".parse::<Ipv6Addr>().unwrap()));
        assert_eq!(reply.control_port, 5000);
    }

    #[test]
    fn test_reply_parse_rejects_missing_prefix() {
        assert_eq!(
            "10.0.0.7:5000:KEY".parse::<DiscoveryReply>(),
            Err(DiscoveryReplyError::MissingPrefix)
        );
    }

    #[test]
    fn test_reply_parse_rejects_legacy_reply_without_key() {
        // Older servers answered without a key field.
        let result = "SERVER_IP:10.0.0.7:5000".parse::<DiscoveryReply>();
        assert!(result.is_err());
    }

    #[test]
    fn test_reply_parse_rejects_bad_port() {
        assert_eq!(
            "SERVER_IP:10.0.0.7:http:KEY".parse::<DiscoveryReply>(),
            Err(DiscoveryReplyError::InvalidPort("http".to_string()))
        );
    }
}
