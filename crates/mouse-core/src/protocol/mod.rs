//! Protocol module containing the command grammar, handshake literals, and
//! the discovery wire format.

pub mod command;
pub mod discovery;
pub mod handshake;

pub use command::{parse_line, parse_tokens, tokenize, Arity, Command, MouseButton, ParseError, Verb};
pub use discovery::{is_discovery_probe, DiscoveryReply, DiscoveryReplyError, DISCOVERY_PROBE};
pub use handshake::AuthReply;
