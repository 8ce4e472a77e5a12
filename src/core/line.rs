//! Line accumulator and editor
//!
//! Turns the raw receive byte stream into a complete command line.
//! Only logical editing happens here: the engine decides what to echo
//! and when the line is handed to the dispatcher.

/// Printable ASCII range accepted into a line.
pub const PRINTABLE_FIRST: u8 = 0x20;
/// Upper bound of the printable ASCII range.
pub const PRINTABLE_LAST: u8 = 0x7E;

/// Accumulates received bytes into a command line.
///
/// One slot of the configured capacity is reserved for the line
/// terminator, matching the wire contract: a line of `capacity` bytes
/// can never be stored and latches the overflow flag instead.
pub struct LineEditor {
    buf: Box<[u8]>,
    len: usize,
    overflow: bool,
}

impl LineEditor {
    /// Create an editor with `capacity` total slots (`capacity - 1` usable).
    ///
    /// # Panics
    /// Panics if `capacity` is less than two.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "line capacity must hold at least one byte");
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
            overflow: false,
        }
    }

    /// Append a printable byte.
    ///
    /// Returns `false` and latches the overflow flag when the usable
    /// capacity is exhausted; the byte is dropped but the caller still
    /// treats it as consumed.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.overflow {
            return false;
        }
        if self.len < self.buf.len() - 1 {
            self.buf[self.len] = byte;
            self.len += 1;
            true
        } else {
            self.overflow = true;
            false
        }
    }

    /// Logically delete the last byte.
    ///
    /// A no-op on an empty or overflowed line; an overflowed line can
    /// no longer be edited back into a valid one.
    pub fn backspace(&mut self) {
        if self.len > 0 && !self.overflow {
            self.len -= 1;
        }
    }

    /// Discard all accumulated content and the overflow flag.
    pub fn reset(&mut self) {
        self.len = 0;
        self.overflow = false;
    }

    /// Accumulated line content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// True once more bytes arrived than the line can hold.
    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    /// True if nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// True for bytes echoed and accumulated as line content.
pub fn is_printable(byte: u8) -> bool {
    (PRINTABLE_FIRST..=PRINTABLE_LAST).contains(&byte)
}
