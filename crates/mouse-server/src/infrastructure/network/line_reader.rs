//! Message framing for the control channel.
//!
//! Framing itself is [`LinesCodec`]: `\n`-terminated UTF-8 lines, a trailing
//! `\r` dropped, a length cap, and the unterminated tail handed out at EOF.
//! [`LineReader`] drives the codec by hand instead of through `FramedRead`
//! because it needs to see the size of every socket read:
//!
//! - A read that fills the read buffer may be the front of a longer line, so
//!   its bytes stay buffered until a newline arrives.
//! - A shorter read is a whole message even without a newline.  Clients that
//!   send `K3YT0K3N` or `MOVE 1 2` bare are answered immediately.
//!
//! A line over the cap, or one that is not UTF-8, is a
//! [`LinesCodecError`]; the session treats it as a transport failure.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// Default chunk size for a single socket read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Default upper bound on a single line, terminator excluded.
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Reads one control message at a time from an async byte source.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    codec: LinesCodec,
    buffer: BytesMut,
    chunk: Vec<u8>,
    /// The last read came up short; whatever it left behind is complete.
    short_read: bool,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wraps `inner`, reading at most `read_buffer_size` bytes per call.
    pub fn new(inner: R, read_buffer_size: usize) -> Self {
        Self::with_limit(inner, read_buffer_size, DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_limit(inner: R, read_buffer_size: usize, max_line_len: usize) -> Self {
        let read_buffer_size = read_buffer_size.max(1);
        Self {
            inner,
            codec: LinesCodec::new_with_max_length(max_line_len),
            buffer: BytesMut::with_capacity(read_buffer_size),
            chunk: vec![0; read_buffer_size],
            short_read: false,
            eof: false,
        }
    }

    /// Returns the next message, or `None` once the peer has closed and every
    /// buffered byte has been handed out.
    ///
    /// # Errors
    ///
    /// [`LinesCodecError::MaxLineLengthExceeded`] for an oversized line, and
    /// [`LinesCodecError::Io`] for read failures and invalid UTF-8.
    pub async fn next_line(&mut self) -> Result<Option<String>, LinesCodecError> {
        loop {
            if let Some(line) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(line));
            }
            if self.eof {
                return self.codec.decode_eof(&mut self.buffer);
            }
            if self.short_read && !self.buffer.is_empty() {
                // Terminate the fragment so the codec emits it as one line.
                self.short_read = false;
                self.buffer.put_u8(b'\n');
                continue;
            }

            let n = self.inner.read(&mut self.chunk).await?;
            if n == 0 {
                self.eof = true;
            } else {
                self.short_read = n < self.chunk.len();
                self.buffer.extend_from_slice(&self.chunk[..n]);
            }
        }
    }

    /// Mutable access to the underlying stream, e.g. to write a reply.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
