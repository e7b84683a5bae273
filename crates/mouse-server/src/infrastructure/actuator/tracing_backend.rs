//! Input actuator that reports every action through `tracing`.
//!
//! OS-level injection (XTest, `SendInput`, CoreGraphics) is supplied by a
//! separate integration.  Until one is plugged in, the server runs with this
//! back-end so an operator can watch exactly which actions clients request.

use mouse_core::MouseButton;
use tracing::info;

use crate::application::dispatch_command::{ActuatorError, InputActuator};

/// Logs each action at `info` level under the `actuator` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActuator;

impl TracingActuator {
    pub fn new() -> Self {
        Self
    }
}

impl InputActuator for TracingActuator {
    fn move_relative(&self, dx: i32, dy: i32) -> Result<(), ActuatorError> {
        info!(target: "actuator", dx, dy, "move pointer");
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), ActuatorError> {
        info!(target: "actuator", ?button, "click");
        Ok(())
    }

    fn scroll(&self, amount: i32) -> Result<(), ActuatorError> {
        info!(target: "actuator", amount, "scroll");
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), ActuatorError> {
        info!(target: "actuator", chars = text.chars().count(), "type text");
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<(), ActuatorError> {
        if key.is_empty() {
            return Err(ActuatorError::UnknownKey(String::new()));
        }
        info!(target: "actuator", key, "press key");
        Ok(())
    }
}
