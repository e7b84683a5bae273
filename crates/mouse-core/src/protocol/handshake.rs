//! Authentication handshake replies.
//!
//! The first line a client sends is its copy of the secret key.  The server
//! answers with exactly one of these replies, each terminated by `\n`:
//!
//! ```text
//! client → server   K7Q2ZP0A
//! server → client   AUTH_OK          (session is now authenticated)
//!                   AUTH_FAILED      (server closes the connection)
//! ```

use std::fmt;
use std::str::FromStr;

/// The server's one-line answer to an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthReply {
    Ok,
    Failed,
}

impl AuthReply {
    /// Wire spelling without the line terminator.
    pub fn as_str(self) -> &'static str {
        match self {
            AuthReply::Ok => "AUTH_OK",
            AuthReply::Failed => "AUTH_FAILED",
        }
    }

    /// Wire bytes including the trailing newline.
    pub fn as_line(self) -> &'static [u8] {
        match self {
            AuthReply::Ok => b"AUTH_OK\n",
            AuthReply::Failed => b"AUTH_FAILED\n",
        }
    }

    pub fn is_ok(self) -> bool {
        self == AuthReply::Ok
    }
}

impl fmt::Display for AuthReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthReply {
    type Err = String;

    /// Parses a reply line as received by a client; surrounding whitespace is
    /// ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "AUTH_OK" => Ok(AuthReply::Ok),
            "AUTH_FAILED" => Ok(AuthReply::Failed),
            other => Err(format!("not a handshake reply: {other:?}")),
        }
    }
}
