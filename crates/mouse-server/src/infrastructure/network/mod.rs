//! Network infrastructure for the server application.
//!
//! # Sub-modules
//!
//! - **`control_listener`** – Binds the TCP control port and spawns one task
//!   per accepted connection.
//!
//! - **`session`** – The per-connection handler: authentication handshake,
//!   then the read → parse → dispatch loop.
//!
//! - **`line_reader`** – Splits the TCP byte stream into control messages
//!   with `LinesCodec`.
//!
//! - **`discovery`** – Answers `DISCOVER_MOUSE_SERVER` UDP probes with the
//!   host address, control port, and secret key.

use std::net::{IpAddr, Ipv4Addr};

/// Interface both listeners bind to.
pub const BIND_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Well-known TCP port of the control channel.
pub const CONTROL_PORT: u16 = 5000;

/// Well-known UDP port of the discovery responder.
pub const DISCOVERY_PORT: u16 = 5001;

pub mod control_listener;
pub mod discovery;
pub mod line_reader;
pub mod session;

pub use control_listener::{ControlListener, NetworkError};
pub use discovery::{DiscoveryAdvert, DiscoveryError, DiscoveryResponder};
pub use line_reader::{LineReader, DEFAULT_READ_BUFFER_SIZE};
pub use session::{handle_connection, ClientSession, SessionContext, SessionEnd, SessionError};
