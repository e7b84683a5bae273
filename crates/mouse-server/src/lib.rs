//! mouse-server library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does mouse-server do? (for beginners)
//!
//! The server runs on the machine whose pointer and keyboard are being
//! *controlled*.  It offers two network endpoints:
//!
//! 1. A UDP **discovery responder** that answers `DISCOVER_MOUSE_SERVER`
//!    probes with the host address, control port, and secret key.
//! 2. A TCP **control listener** that accepts any number of clients.  Each
//!    client gets its own task which checks the secret key, then reads text
//!    commands line by line and hands them to the input actuator.
//!
//! Both endpoints share nothing but the read-only secret key, so a slow or
//! misbehaving client never holds up discovery or another client.

/// Application layer: command dispatch and the input actuator seam.
pub mod application;

/// Infrastructure layer: sockets, actuator back-ends, and config storage.
pub mod infrastructure;
