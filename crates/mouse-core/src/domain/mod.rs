//! Domain rules for the mouse server.
//!
//! Pure logic with no sockets and no OS calls:
//!
//! - [`secret`] – the single shared credential generated once per run.
//! - [`session`] – the `Unauthenticated → Authenticated → Closed` state
//!   machine each control connection walks through.

pub mod secret;
pub mod session;
