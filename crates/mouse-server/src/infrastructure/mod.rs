//! Infrastructure layer for the server application.
//!
//! Contains OS-facing adapters: input actuator back-ends, TCP/UDP network
//! I/O, and config file storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `mouse_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`actuator`** – Implementations of `InputActuator`.  The default
//!   back-end traces every action; a recording back-end is provided for tests
//!   and dry runs.
//!
//! - **`network`** – The UDP discovery responder, the TCP control listener,
//!   line framing, and the per-connection session state machine.
//!
//! - **`storage`** – TOML configuration loaded from the platform config
//!   directory.

pub mod actuator;
pub mod network;
pub mod storage;
