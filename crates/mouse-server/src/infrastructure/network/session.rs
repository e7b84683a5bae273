//! Per-connection protocol handler.
//!
//! A [`ClientSession`] owns one accepted connection for its whole life and
//! drives the `Unauthenticated → Authenticated → Closed` state machine from
//! [`mouse_core::SessionState`]:
//!
//! 1. Read exactly one line and compare it with the secret key.  Reply
//!    `AUTH_OK` and continue, or reply `AUTH_FAILED` and close.  There is no
//!    second attempt on the same connection.
//! 2. Loop: read a line, tokenize, parse, dispatch.
//!    - blank line → skipped
//!    - parse failure → logged, connection stays open
//!    - `AUTH_OK` / `AUTH_FAILED` echoed back → ignored
//!    - actuator failure → logged, connection stays open
//!    - `EXIT` → closed gracefully
//! 3. Peer close, an I/O error, or an undecodable line ends the session.
//!
//! A "line" is whatever [`LineReader`] yields: a newline-terminated line, or
//! a short read that carried no newline (a bare `K3YT0K3N` authenticates).
//!
//! The session is generic over the byte stream so tests can script it with
//! `tokio_test::io::Builder` instead of a real socket.
//!
//! # Containment
//!
//! [`handle_connection`] is the boundary: whatever goes wrong inside one
//! session is logged there and never reaches the acceptor or other sessions.

use std::net::SocketAddr;

use mouse_core::{
    protocol::command::{parse_tokens, tokenize},
    AuthReply, SecretToken, SessionState,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::LinesCodecError;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::dispatch_command::{CommandDispatcher, DispatchOutcome};
use crate::infrastructure::network::line_reader::LineReader;

/// Errors that end a session early.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or framing a line failed (I/O, oversized line, bad UTF-8).
    #[error("framing error: {0}")]
    Framing(#[from] LinesCodecError),
    /// Writing a reply failed.
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The first line did not match the secret key.
    AuthRejected,
    /// The client sent `EXIT`.
    ClientExit,
    /// The peer closed the connection.
    PeerClosed,
}

/// Everything a session needs besides its stream.
///
/// Cloned into every connection task; holds only read-only data.
#[derive(Clone)]
pub struct SessionContext {
    pub token: SecretToken,
    pub dispatcher: CommandDispatcher,
    pub read_buffer_size: usize,
}

impl SessionContext {
    pub fn new(token: SecretToken, dispatcher: CommandDispatcher, read_buffer_size: usize) -> Self {
        Self {
            token,
            dispatcher,
            read_buffer_size,
        }
    }
}

/// One accepted connection and its protocol state.
pub struct ClientSession<S> {
    id: Uuid,
    peer: SocketAddr,
    state: SessionState,
    reader: LineReader<S>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> ClientSession<S> {
    /// Wraps a freshly accepted stream; the session starts `Unauthenticated`.
    pub fn new(stream: S, peer: SocketAddr, read_buffer_size: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer,
            state: SessionState::default(),
            reader: LineReader::new(stream, read_buffer_size),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to completion and releases the stream.
    ///
    /// The stream is shut down exactly once, on every exit path, before this
    /// returns; it is then dropped with the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] for transport and decoding failures.
    pub async fn run(mut self, ctx: &SessionContext) -> Result<SessionEnd, SessionError> {
        let result = self.drive(ctx).await;
        self.close().await;
        result
    }

    async fn drive(&mut self, ctx: &SessionContext) -> Result<SessionEnd, SessionError> {
        // ── Handshake ─────────────────────────────────────────────────────────
        let Some(attempt) = self.reader.next_line().await? else {
            return Ok(SessionEnd::PeerClosed);
        };
        // A fresh session is always Unauthenticated, so this cannot be a retry.
        let reply = self
            .state
            .authenticate(&ctx.token, &attempt)
            .unwrap_or(AuthReply::Failed);
        self.reader.get_mut().write_all(reply.as_line()).await?;
        if !reply.is_ok() {
            warn!("authentication failed");
            return Ok(SessionEnd::AuthRejected);
        }
        info!("client authenticated");

        // ── Command loop ──────────────────────────────────────────────────────
        while let Some(line) = self.reader.next_line().await? {
            let tokens = tokenize(&line);
            if tokens.is_empty() {
                continue;
            }

            let command = match parse_tokens(&tokens) {
                Ok(command) => command,
                Err(e) => {
                    warn!(line = %line.trim(), error = %e, "dropping malformed command");
                    continue;
                }
            };

            debug_assert!(self.state.is_authenticated());
            match ctx.dispatcher.dispatch(&command) {
                Ok(DispatchOutcome::Performed) => debug!(%command, "dispatched"),
                Ok(DispatchOutcome::Ignored) => debug!(%command, "ignoring echoed handshake reply"),
                Ok(DispatchOutcome::Exit) => return Ok(SessionEnd::ClientExit),
                Err(e) => warn!(%command, error = %e, "input actuator failed"),
            }
        }
        Ok(SessionEnd::PeerClosed)
    }

    async fn close(&mut self) {
        if self.state.close() {
            if let Err(e) = self.reader.get_mut().shutdown().await {
                debug!("shutdown after close: {e}");
            }
        }
    }
}

/// Runs one accepted connection inside a `session` span and logs how it
/// ended.  Never returns an error; this is the per-connection failure
/// boundary.
pub async fn handle_connection<S>(stream: S, peer: SocketAddr, ctx: &SessionContext) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let session = ClientSession::new(stream, peer, ctx.read_buffer_size);
    let span = info_span!("session", id = %session.id(), %peer);

    async move {
        info!("connection accepted");
        match session.run(ctx).await {
            Ok(end) => {
                info!(?end, "connection closed");
                end
            }
            Err(e) => {
                warn!("connection closed with error: {e}");
                SessionEnd::PeerClosed
            }
        }
    }
    .instrument(span)
    .await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio_test::io::Builder;

    use crate::infrastructure::actuator::{ActuatorCall, RecordingActuator};
    use mouse_core::MouseButton;

    const KEY: &str = "TESTKEY1";

    fn peer() -> SocketAddr {
        "192.168.1.50:40000".parse().unwrap()
    }

    fn context() -> (SessionContext, Arc<RecordingActuator>) {
        let actuator = Arc::new(RecordingActuator::new());
        let ctx = SessionContext::new(
            SecretToken::from_value(KEY).unwrap(),
            CommandDispatcher::new(actuator.clone()),
            1024,
        );
        (ctx, actuator)
    }

    // ── Handshake ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_correct_key_gets_auth_ok_then_commands_dispatch() {
        // Arrange
        let (ctx, actuator) = context();
        let stream = Builder::new()
            .read(b"TESTKEY1\n")
            .write(b"AUTH_OK\n")
            .read(b"MOVE 5 -5\n")
            .build();

        // Act
        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();

        // Assert
        assert_eq!(end, SessionEnd::PeerClosed);
        assert_eq!(actuator.calls(), vec![ActuatorCall::Move { dx: 5, dy: -5 }]);
    }

    #[tokio::test]
    async fn test_key_is_trimmed_before_comparison() {
        let (ctx, _) = context();
        let stream = Builder::new()
            .read(b"  TESTKEY1 \r\n")
            .write(b"AUTH_OK\n")
            .build();

        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();
        assert_eq!(end, SessionEnd::PeerClosed);
    }

    #[tokio::test]
    async fn test_key_without_newline_gets_auth_ok() {
        // Arrange – key and command each arrive as one bare read
        let (ctx, actuator) = context();
        let stream = Builder::new()
            .read(b"TESTKEY1")
            .write(b"AUTH_OK\n")
            .read(b"PRESS a")
            .build();

        // Act
        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();

        // Assert
        assert_eq!(end, SessionEnd::PeerClosed);
        assert_eq!(actuator.calls(), vec![ActuatorCall::Press("a".to_string())]);
    }

    #[tokio::test]
    async fn test_wrong_key_gets_auth_failed_and_nothing_else_is_read() {
        // Arrange – the script ends after the reply; a write past it would fail
        let (ctx, actuator) = context();
        let stream = Builder::new()
            .read(b"WRONGKEY\n")
            .write(b"AUTH_FAILED\n")
            .build();

        // Act
        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();

        // Assert
        assert_eq!(end, SessionEnd::AuthRejected);
        assert_eq!(actuator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_commands_bundled_with_wrong_key_are_never_dispatched() {
        let (ctx, actuator) = context();
        let stream = Builder::new()
            .read(b"WRONGKEY\nMOVE 1 1\n")
            .write(b"AUTH_FAILED\n")
            .build();

        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();

        assert_eq!(end, SessionEnd::AuthRejected);
        assert_eq!(actuator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_peer_closing_before_handshake_ends_quietly() {
        let (ctx, _) = context();
        let stream = Builder::new().build();

        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();
        assert_eq!(end, SessionEnd::PeerClosed);
    }

    // ── Command loop ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_exit_ends_session_without_actuator_call() {
        let (ctx, actuator) = context();
        let stream = Builder::new()
            .read(b"TESTKEY1\n")
            .write(b"AUTH_OK\n")
            .read(b"exit\n")
            .build();

        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();

        assert_eq!(end, SessionEnd::ClientExit);
        assert_eq!(actuator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_and_blank_lines_do_not_close_connection() {
        // Arrange
        let (ctx, actuator) = context();
        let stream = Builder::new()
            .read(b"TESTKEY1\n")
            .write(b"AUTH_OK\n")
            .read(b"\n   \nJUMP 3\nMOVE x y\nSCROLL\nLEFT_CLICK\n")
            .build();

        // Act
        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();

        // Assert – only the valid command after the bad ones got through
        assert_eq!(end, SessionEnd::PeerClosed);
        assert_eq!(actuator.calls(), vec![ActuatorCall::Click(MouseButton::Left)]);
    }

    #[tokio::test]
    async fn test_echoed_handshake_replies_are_ignored() {
        let (ctx, actuator) = context();
        let stream = Builder::new()
            .read(b"TESTKEY1\n")
            .write(b"AUTH_OK\n")
            .read(b"AUTH_OK\nAUTH_FAILED\nSCROLL 2\n")
            .build();

        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();

        assert_eq!(end, SessionEnd::PeerClosed);
        assert_eq!(actuator.calls(), vec![ActuatorCall::Scroll(2)]);
    }

    #[tokio::test]
    async fn test_actuator_failure_keeps_connection_open() {
        // Arrange
        let (ctx, actuator) = context();
        actuator.set_failing(true);
        let stream = Builder::new()
            .read(b"TESTKEY1\n")
            .write(b"AUTH_OK\n")
            .read(b"LEFT_CLICK\nRIGHT_CLICK\nEXIT\n")
            .build();

        // Act
        let end = ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();

        // Assert – both failures were survived and EXIT still honoured
        assert_eq!(end, SessionEnd::ClientExit);
    }

    #[tokio::test]
    async fn test_commands_are_dispatched_in_order_received() {
        let (ctx, actuator) = context();
        let stream = Builder::new()
            .read(b"TESTKEY1\n")
            .write(b"AUTH_OK\n")
            .read(b"MOVE 1 0\nKEYBOARD Hi  there\n")
            .read(b"PRESS TAB\nRIGHT_CLICK\nEXIT\n")
            .build();

        ClientSession::new(stream, peer(), 1024).run(&ctx).await.unwrap();

        assert_eq!(
            actuator.calls(),
            vec![
                ActuatorCall::Move { dx: 1, dy: 0 },
                ActuatorCall::Type("Hi there".to_string()),
                ActuatorCall::Press("tab".to_string()),
                ActuatorCall::Click(MouseButton::Right),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_closes_with_error() {
        let (ctx, _) = context();
        let stream = Builder::new()
            .read(b"TESTKEY1\n")
            .write(b"AUTH_OK\n")
            .read(&[0xc3, 0x28, b'\n'])
            .build();

        let result = ClientSession::new(stream, peer(), 1024).run(&ctx).await;
        assert!(matches!(
            result,
            Err(SessionError::Framing(LinesCodecError::Io(e)))
                if e.kind() == std::io::ErrorKind::InvalidData
        ));
    }

    #[tokio::test]
    async fn test_handle_connection_contains_errors() {
        let (ctx, _) = context();
        let stream = Builder::new()
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
            .build();

        let end = handle_connection(stream, peer(), &ctx).await;
        assert_eq!(end, SessionEnd::PeerClosed);
    }
}
