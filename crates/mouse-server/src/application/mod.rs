//! Application layer use cases for the server.
//!
//! - **`dispatch_command`** – Turns a parsed [`mouse_core::Command`] into
//!   exactly one call on an [`dispatch_command::InputActuator`], the trait the
//!   OS-specific pointer/keyboard back-end implements.  The actuator is
//!   injected at construction time so tests can substitute a recorder.

pub mod dispatch_command;
