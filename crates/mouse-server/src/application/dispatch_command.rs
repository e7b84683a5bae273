//! CommandDispatcher: maps parsed commands onto input actuator calls.
//!
//! This use case sits at the application layer and delegates to an
//! [`InputActuator`] trait object for the actual pointer and keyboard
//! injection.  Back-ends live in the infrastructure layer.
//!
//! The dispatcher keeps no state between calls.  It never swallows an
//! actuator error: failures are returned to the session loop, which logs
//! them and keeps the connection open.

use std::sync::Arc;

use mouse_core::{Command, MouseButton};
use thiserror::Error;

/// Error type for input actuator operations.
#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("unknown key name: {0}")]
    UnknownKey(String),
}

/// Platform-agnostic pointer and keyboard injection.
///
/// Implementations must be callable from many connection tasks at once.
#[cfg_attr(test, mockall::automock)]
pub trait InputActuator: Send + Sync {
    /// Moves the pointer by a relative offset.
    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), ActuatorError>;

    /// Clicks `button` at the current pointer position.
    fn click(&self, button: MouseButton) -> Result<(), ActuatorError>;

    /// Scrolls vertically; positive is up.
    fn scroll(&self, amount: i32) -> Result<(), ActuatorError>;

    /// Types literal text.
    fn type_text(&self, text: &str) -> Result<(), ActuatorError>;

    /// Presses and releases a single named key (lower-case name).
    fn press_key(&self, key: &str) -> Result<(), ActuatorError>;
}

/// What the dispatcher did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// One actuator call was made and succeeded.
    Performed,
    /// The command is recognized but has no effect (echoed handshake reply).
    Ignored,
    /// The client asked to end the session; no actuator call was made.
    Exit,
}

/// The Dispatch Command use case.
#[derive(Clone)]
pub struct CommandDispatcher {
    actuator: Arc<dyn InputActuator>,
}

impl CommandDispatcher {
    /// Creates a dispatcher that drives `actuator`.
    pub fn new(actuator: Arc<dyn InputActuator>) -> Self {
        Self { actuator }
    }

    /// Performs at most one actuator call for `command`.
    ///
    /// # Errors
    ///
    /// Returns the actuator's [`ActuatorError`] unchanged.
    pub fn dispatch(&self, command: &Command) -> Result<DispatchOutcome, ActuatorError> {
        match command {
            Command::Move { dx, dy } => self.actuator.move_relative(*dx, *dy)?,
            Command::Click(button) => self.actuator.click(*button)?,
            Command::Scroll { amount } => self.actuator.scroll(*amount)?,
            Command::Keyboard { text } => self.actuator.type_text(text)?,
            Command::Press { key } => self.actuator.press_key(key)?,
            Command::Exit => return Ok(DispatchOutcome::Exit),
            Command::HandshakeEcho(_) => return Ok(DispatchOutcome::Ignored),
        }
        Ok(DispatchOutcome::Performed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
