//! Per-connection authentication state machine.
//!
//! ```text
//!                 token matches
//!  Unauthenticated ─────────────▶ Authenticated
//!        │                             │
//!        │ token mismatch              │ EXIT, peer closed, I/O error
//!        ▼                             ▼
//!      Closed ◀──────────────────────────
//! ```
//!
//! There is no way back: a failed attempt always ends the connection, and a
//! closed session stays closed.  The network layer owns one [`SessionState`]
//! per accepted connection and consults it before every dispatch, so no
//! command can reach the input actuator before the key has been accepted.

use thiserror::Error;
use tracing::trace;

use crate::domain::secret::SecretToken;
use crate::protocol::handshake::AuthReply;

/// Illegal transition attempts.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionTransitionError {
    #[error("session has already attempted authentication")]
    AlreadyAttempted,
    #[error("session is not authenticated")]
    NotAuthenticated,
}

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated,
    Closed,
}

impl SessionState {
    /// Applies the single authentication attempt a connection is allowed.
    ///
    /// `submitted` is the client's first line; surrounding whitespace is
    /// ignored, everything else must match exactly.
    ///
    /// # Errors
    ///
    /// Returns [`SessionTransitionError::AlreadyAttempted`] unless the session
    /// is still `Unauthenticated`.
    pub fn authenticate(
        &mut self,
        token: &SecretToken,
        submitted: &str,
    ) -> Result<AuthReply, SessionTransitionError> {
        if *self != SessionState::Unauthenticated {
            return Err(SessionTransitionError::AlreadyAttempted);
        }
        let reply = if token.matches(submitted.trim()) {
            *self = SessionState::Authenticated;
            AuthReply::Ok
        } else {
            *self = SessionState::Closed;
            AuthReply::Failed
        };
        trace!(?reply, state = ?self, "authentication attempt");
        Ok(reply)
    }

    /// Guards command dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`SessionTransitionError::NotAuthenticated`] in any state other
    /// than `Authenticated`.
    pub fn ensure_authenticated(self) -> Result<(), SessionTransitionError> {
        match self {
            SessionState::Authenticated => Ok(()),
            _ => Err(SessionTransitionError::NotAuthenticated),
        }
    }

    /// Moves to `Closed`.  Returns `true` only for the call that performed the
    /// transition, so callers can release resources exactly once.
    pub fn close(&mut self) -> bool {
        let was_open = *self != SessionState::Closed;
        *self = SessionState::Closed;
        was_open
    }

    pub fn is_authenticated(self) -> bool {
        self == SessionState::Authenticated
    }

    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SecretToken {
        SecretToken::from_value("ZX81QL07").unwrap()
    }

    #[test]
    fn test_new_session_starts_unauthenticated() {
        let state = SessionState::default();
        assert_eq!(state, SessionState::Unauthenticated);
        assert!(state.ensure_authenticated().is_err());
    }

    #[test]
    fn test_authenticate_with_matching_token_transitions_to_authenticated() {
        // Arrange
        let mut state = SessionState::default();

        // Act – trailing CRLF from the client is tolerated
        let reply = state.authenticate(&token(), "ZX81QL07\r\n").unwrap();

        // Assert
        assert_eq!(reply, AuthReply::Ok);
        assert!(state.is_authenticated());
        assert_eq!(state.ensure_authenticated(), Ok(()));
    }

    #[test]
    fn test_authenticate_with_wrong_token_closes() {
        let mut state = SessionState::default();
        let reply = state.authenticate(&token(), "zx81ql07").unwrap();
        assert_eq!(reply, AuthReply::Failed);
        assert!(state.is_closed());
    }

    #[test]
    fn test_authenticate_twice_is_rejected() {
        // Arrange
        let mut state = SessionState::default();
        state.authenticate(&token(), "ZX81QL07").unwrap();

        // Act
        let second = state.authenticate(&token(), "ZX81QL07");

        // Assert – no second attempt, state unchanged
        assert_eq!(second, Err(SessionTransitionError::AlreadyAttempted));
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_no_retry_after_failure() {
        let mut state = SessionState::default();
        state.authenticate(&token(), "nope").unwrap();
        assert_eq!(
            state.authenticate(&token(), "ZX81QL07"),
            Err(SessionTransitionError::AlreadyAttempted)
        );
        assert!(state.is_closed());
    }

    #[test]
    fn test_close_reports_transition_exactly_once() {
        let mut state = SessionState::Authenticated;
        assert!(state.close());
        assert!(!state.close());
        assert!(state.is_closed());
    }
}
