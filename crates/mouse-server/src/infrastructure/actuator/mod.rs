//! Input actuator back-ends.
//!
//! Real pointer/keyboard injection is an OS integration that plugs in behind
//! [`crate::application::dispatch_command::InputActuator`].  The back-ends
//! shipped here are:
//!
//! - [`recording::RecordingActuator`] – keeps every call in memory.
//! - [`tracing_backend::TracingActuator`] – logs every call; the binary's
//!   default.

pub mod recording;
pub mod tracing_backend;

pub use recording::{ActuatorCall, RecordingActuator};
pub use tracing_backend::TracingActuator;
