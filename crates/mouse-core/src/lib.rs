//! # mouse-core
//!
//! Shared library for the LAN mouse server containing the text command
//! grammar, the discovery wire format, the authentication handshake literals,
//! and the per-connection session rules.
//!
//! It has zero dependencies on OS APIs or network sockets, so every rule in
//! here can be unit-tested without opening a port.
//!
//! # Architecture overview (for beginners)
//!
//! The server lets a phone or another computer on the same network drive this
//! machine's pointer and keyboard.  A client:
//!
//! 1. Broadcasts the literal `DISCOVER_MOUSE_SERVER` over UDP and learns the
//!    host's address, control port, and secret key from the reply.
//! 2. Opens a TCP connection, sends the secret key as its first line, and
//!    waits for `AUTH_OK`.
//! 3. Streams short text commands such as `MOVE 10 -4` or `PRESS enter`.
//!
//! This crate defines:
//!
//! - **`protocol`** – What the bytes on the wire look like: the command
//!   grammar, the handshake replies, and the discovery probe/reply.
//!
//! - **`domain`** – Pure rules with no I/O: the [`SecretToken`] credential and
//!   the [`SessionState`] machine every connection walks through.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `mouse_core::Command` instead of `mouse_core::protocol::command::Command`.
pub use domain::secret::SecretToken;
pub use domain::session::{SessionState, SessionTransitionError};
pub use protocol::command::{parse_line, Command, MouseButton, ParseError, Verb};
pub use protocol::discovery::{DiscoveryReply, DiscoveryReplyError, DISCOVERY_PROBE};
pub use protocol::handshake::AuthReply;
