//! Byte-to-line assembly with timeout and capacity bounds.
//!
//! Every reply the module sends is drained or parsed through
//! [`LineReader::read_line`]: a tick-counted loop that pulls whatever
//! bytes are pending, yields for one millisecond when there are none, and
//! stops at a line terminator, a full buffer or an exhausted budget. The
//! reader knows nothing about command semantics; it only assembles lines.

use crate::constants::REPLY_BUFFER_SIZE;
use crate::transport::{Monotonic, SerialTransport};

/// Fixed-capacity line buffer, reused across reads.
///
/// Capacity is [`REPLY_BUFFER_SIZE`] with one byte reserved for the
/// logical terminator, so at most `REPLY_BUFFER_SIZE - 1` content bytes
/// are ever held. [`push`](Self::push) refuses bytes beyond that bound
/// rather than overwriting; dropping excess input is the crate-wide
/// overflow policy.
#[derive(Debug)]
pub struct LineBuffer {
    bytes: [u8; REPLY_BUFFER_SIZE],
    len: usize,
}

impl LineBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; REPLY_BUFFER_SIZE],
            len: 0,
        }
    }

    /// Discard the current contents.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append a byte if capacity remains. Returns `false`, leaving the
    /// buffer untouched, once the content bound is reached.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.bytes[self.len] = byte;
        self.len += 1;
        true
    }

    /// Whether the content bound has been reached.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len >= REPLY_BUFFER_SIZE - 1
    }

    /// Number of content bytes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no content bytes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The assembled bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// The assembled bytes as a string slice, empty if not valid UTF-8.
    /// The protocol is ASCII, so non-UTF-8 content only appears on a
    /// corrupted link and reads as a skippable blank line.
    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Timeout-bounded, poll-driven line reader.
///
/// Owns the [`LineBuffer`] it assembles into; contents are valid until
/// the next read. No other state persists between calls.
#[derive(Debug, Default)]
pub struct LineReader {
    buffer: LineBuffer,
}

impl LineReader {
    /// Create a reader with an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: LineBuffer::new(),
        }
    }

    /// Assemble one line (or, in multiline mode, everything until the
    /// budget runs out) from `serial` into the internal buffer.
    ///
    /// Rules, applied per received byte:
    /// - `\r` is always discarded.
    /// - `\n` ends the read, unless it arrives before any content
    ///   (leading blank lines are skipped) or `multiline` is set, in
    ///   which case it is stored like any other byte.
    /// - A full buffer ends the read early.
    ///
    /// Each pass over the pending bytes costs one tick of the budget;
    /// when none are pending the reader yields for one millisecond on
    /// `clock`. Returns the number of bytes captured; `0` means nothing
    /// but blank lines arrived before the budget expired, which callers
    /// treat as "no data yet" rather than an error.
    pub fn read_line<T: SerialTransport, C: Monotonic>(
        &mut self,
        serial: &mut T,
        clock: &mut C,
        timeout_ticks: u16,
        multiline: bool,
    ) -> usize {
        self.buffer.clear();
        let mut remaining = timeout_ticks;

        'ticks: while remaining > 0 {
            remaining -= 1;

            if self.buffer.is_full() {
                break;
            }

            while let Some(byte) = serial.read_byte() {
                if byte == b'\r' {
                    continue;
                }
                if byte == b'\n' {
                    if self.buffer.is_empty() {
                        continue;
                    }
                    if !multiline {
                        break 'ticks;
                    }
                }
                if !self.buffer.push(byte) {
                    break 'ticks;
                }
            }

            if remaining == 0 {
                break;
            }
            clock.delay_millis(1);
        }

        self.buffer.len()
    }

    /// The line captured by the most recent read.
    #[must_use]
    pub fn last_line(&self) -> &str {
        self.buffer.as_str()
    }

    /// The raw bytes captured by the most recent read.
    #[must_use]
    pub fn last_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }
}
