//! Recording input actuator.
//!
//! # Why a recording actuator?
//!
//! A real actuator moves the cursor and presses keys on the machine running
//! the tests, and nothing it does can be observed from Rust code.  The
//! `RecordingActuator` instead appends each call to an in-memory log, in
//! order, so tests can assert exactly what a client's commands turned into.
//!
//! # Usage in tests
//!
//! ```ignore
//! let actuator = Arc::new(RecordingActuator::new());
//! let dispatcher = CommandDispatcher::new(actuator.clone());
//!
//! dispatcher.dispatch(&Command::Move { dx: 3, dy: 4 }).unwrap();
//!
//! assert_eq!(actuator.calls(), vec![ActuatorCall::Move { dx: 3, dy: 4 }]);
//! ```
//!
//! # Failure injection
//!
//! [`RecordingActuator::set_failing`] makes every subsequent call return
//! [`ActuatorError::Platform`] without recording it.  Use this to test that
//! actuator failures are logged and the connection survives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use mouse_core::MouseButton;

use crate::application::dispatch_command::{ActuatorError, InputActuator};

/// One recorded actuator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuatorCall {
    Move { dx: i32, dy: i32 },
    Click(MouseButton),
    Scroll(i32),
    Type(String),
    Press(String),
}

/// An actuator that records calls instead of touching the OS.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    calls: Mutex<Vec<ActuatorCall>>,
    failing: AtomicBool,
}

impl RecordingActuator {
    /// Creates an actuator with an empty log that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches failure injection on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a snapshot of the calls recorded so far.
    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.log().clone()
    }

    /// Number of calls recorded so far.
    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    fn log(&self) -> MutexGuard<'_, Vec<ActuatorCall>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: ActuatorCall) -> Result<(), ActuatorError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ActuatorError::Platform("injected failure".into()));
        }
        self.log().push(call);
        Ok(())
    }
}

impl InputActuator for RecordingActuator {
    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Move { dx, dy })
    }

    fn click(&self, button: MouseButton) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Click(button))
    }

    fn scroll(&self, amount: i32) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Scroll(amount))
    }

    fn type_text(&self, text: &str) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Type(text.to_string()))
    }

    fn press_key(&self, key: &str) -> Result<(), ActuatorError> {
        self.record(ActuatorCall::Press(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calls_are_recorded_in_order() {
        // Arrange
        let actuator = RecordingActuator::new();

        // Act
        actuator.move_relative(1, 2).unwrap();
        actuator.click(MouseButton::Right).unwrap();
        actuator.type_text("hi").unwrap();

        // Assert
        assert_eq!(
            actuator.calls(),
            vec![
                ActuatorCall::Move { dx: 1, dy: 2 },
                ActuatorCall::Click(MouseButton::Right),
                ActuatorCall::Type("hi".to_string()),
            ]
        );
    }

    #[test]
    fn test_failing_actuator_returns_error_and_records_nothing() {
        let actuator = RecordingActuator::new();
        actuator.set_failing(true);

        assert!(matches!(
            actuator.scroll(5),
            Err(ActuatorError::Platform(_))
        ));
        assert_eq!(actuator.call_count(), 0);

        actuator.set_failing(false);
        actuator.scroll(5).unwrap();
        assert_eq!(actuator.calls(), vec![ActuatorCall::Scroll(5)]);
    }
}
