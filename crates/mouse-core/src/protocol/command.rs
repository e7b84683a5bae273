//! Text command grammar for the control channel.
//!
//! Every line a client sends after authenticating is a whitespace-separated
//! list of tokens.  The first token is the *verb*; it is matched
//! case-insensitively.  The remaining tokens are the verb's arguments:
//!
//! | Verb          | Tokens | Arguments                                  |
//! |---------------|--------|--------------------------------------------|
//! | `MOVE`        | 3      | `dx dy` – signed integers                  |
//! | `LEFT_CLICK`  | 1      | –                                          |
//! | `RIGHT_CLICK` | 1      | –                                          |
//! | `SCROLL`      | 2      | `amount` – signed integer                  |
//! | `KEYBOARD`    | ≥ 2    | text, re-joined with single spaces         |
//! | `PRESS`       | 2      | key name, lower-cased                      |
//! | `EXIT`        | 1      | –                                          |
//! | `AUTH_OK`     | any    | ignored (echoed handshake reply)           |
//! | `AUTH_FAILED` | any    | ignored (echoed handshake reply)           |
//!
//! # Failures are values
//!
//! Parsing never panics.  A bad line produces a [`ParseError`] that the
//! session loop logs before moving on to the next line; the connection stays
//! open and nothing reaches the input actuator.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::protocol::handshake::AuthReply;

/// Errors produced when a line does not match the grammar.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The line contained no tokens after trimming.
    #[error("empty command line")]
    Empty,

    /// The first token is not a recognized verb.
    #[error("unknown verb: {0}")]
    UnknownVerb(String),

    /// The verb was recognized but the token count is wrong.
    #[error("{verb} expects {expected} token(s), got {found}")]
    WrongArity {
        verb: Verb,
        expected: Arity,
        found: usize,
    },

    /// An argument that must be an integer could not be parsed as one.
    #[error("{verb}: argument {token:?} is not an integer")]
    InvalidInteger { verb: Verb, token: String },
}

/// Number of tokens (verb included) a command line must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Any,
}

impl Arity {
    /// Returns `true` when `count` tokens satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Any => f.write_str("any number of"),
        }
    }
}

/// The operation selected by the first token of a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Move,
    LeftClick,
    RightClick,
    Scroll,
    Keyboard,
    Press,
    Exit,
    AuthOk,
    AuthFailed,
}

impl Verb {
    /// All verbs, in table order.
    pub const ALL: [Verb; 9] = [
        Verb::Move,
        Verb::LeftClick,
        Verb::RightClick,
        Verb::Scroll,
        Verb::Keyboard,
        Verb::Press,
        Verb::Exit,
        Verb::AuthOk,
        Verb::AuthFailed,
    ];

    /// Returns the upper-case wire spelling of the verb.
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Move => "MOVE",
            Verb::LeftClick => "LEFT_CLICK",
            Verb::RightClick => "RIGHT_CLICK",
            Verb::Scroll => "SCROLL",
            Verb::Keyboard => "KEYBOARD",
            Verb::Press => "PRESS",
            Verb::Exit => "EXIT",
            Verb::AuthOk => "AUTH_OK",
            Verb::AuthFailed => "AUTH_FAILED",
        }
    }

    /// Returns the token count this verb requires.
    pub fn arity(self) -> Arity {
        match self {
            Verb::Move => Arity::Exactly(3),
            Verb::LeftClick | Verb::RightClick | Verb::Exit => Arity::Exactly(1),
            Verb::Scroll | Verb::Press => Arity::Exactly(2),
            Verb::Keyboard => Arity::AtLeast(2),
            Verb::AuthOk | Verb::AuthFailed => Arity::Any,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ParseError;

    /// Matches a verb case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == upper)
            .ok_or(ParseError::UnknownVerb(upper))
    }
}

/// Pointer button targeted by a click command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// A parsed control-channel command.
///
/// Commands are transient: one is built per line, handed to the dispatcher,
/// and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Relative pointer displacement.
    Move { dx: i32, dy: i32 },
    /// Click a pointer button at the current position.
    Click(MouseButton),
    /// Vertical scroll by `amount` notches (positive is up).
    Scroll { amount: i32 },
    /// Type the literal text.
    Keyboard { text: String },
    /// Press a single named key; the name is always lower-case.
    Press { key: String },
    /// End the session gracefully.
    Exit,
    /// A handshake reply echoed back by the client; ignored.
    HandshakeEcho(AuthReply),
}

impl Command {
    /// Returns the verb this command was parsed from.
    pub fn verb(&self) -> Verb {
        match self {
            Command::Move { .. } => Verb::Move,
            Command::Click(MouseButton::Left) => Verb::LeftClick,
            Command::Click(MouseButton::Right) => Verb::RightClick,
            Command::Scroll { .. } => Verb::Scroll,
            Command::Keyboard { .. } => Verb::Keyboard,
            Command::Press { .. } => Verb::Press,
            Command::Exit => Verb::Exit,
            Command::HandshakeEcho(AuthReply::Ok) => Verb::AuthOk,
            Command::HandshakeEcho(AuthReply::Failed) => Verb::AuthFailed,
        }
    }
}

impl fmt::Display for Command {
    /// Formats the command as the line a client would send (without the
    /// trailing newline).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move { dx, dy } => write!(f, "MOVE {dx} {dy}"),
            Command::Scroll { amount } => write!(f, "SCROLL {amount}"),
            Command::Keyboard { text } => write!(f, "KEYBOARD {text}"),
            Command::Press { key } => write!(f, "PRESS {key}"),
            other => f.write_str(other.verb().as_str()),
        }
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Splits a line into whitespace-separated tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Parses a full line of text.
///
/// # Errors
///
/// Returns [`ParseError::Empty`] for a blank line, otherwise whatever
/// [`parse_tokens`] reports.
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    parse_tokens(&tokenize(line))
}

/// Validates arity and argument types for an already tokenized line.
///
/// `tokens[0]` is the verb (any case); the whole slice, verb included, is
/// checked against [`Verb::arity`].
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first rule the tokens break.
pub fn parse_tokens(tokens: &[&str]) -> Result<Command, ParseError> {
    let first = tokens.first().ok_or(ParseError::Empty)?;
    let verb: Verb = first.parse()?;

    let expected = verb.arity();
    if !expected.accepts(tokens.len()) {
        return Err(ParseError::WrongArity {
            verb,
            expected,
            found: tokens.len(),
        });
    }

    let command = match verb {
        Verb::Move => Command::Move {
            dx: parse_int(verb, tokens[1])?,
            dy: parse_int(verb, tokens[2])?,
        },
        Verb::LeftClick => Command::Click(MouseButton::Left),
        Verb::RightClick => Command::Click(MouseButton::Right),
        Verb::Scroll => Command::Scroll {
            amount: parse_int(verb, tokens[1])?,
        },
        Verb::Keyboard => Command::Keyboard {
            text: tokens[1..].join(" "),
        },
        Verb::Press => Command::Press {
            key: tokens[1].to_lowercase(),
        },
        Verb::Exit => Command::Exit,
        Verb::AuthOk => Command::HandshakeEcho(AuthReply::Ok),
        Verb::AuthFailed => Command::HandshakeEcho(AuthReply::Failed),
    };
    Ok(command)
}

fn parse_int(verb: Verb, token: &str) -> Result<i32, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidInteger {
        verb,
        token: token.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
