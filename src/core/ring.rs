//! Fixed-capacity circular byte buffer
//!
//! Backs both the echo channel and all outbound console text. The
//! buffer distinguishes "full" from "empty" (both have equal indices)
//! with an explicit flag, and block writes are all-or-nothing so a
//! rejected write never leaves a partial message queued.

use thiserror::Error;

/// Ring buffer error types
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Not enough free space for the requested write
    #[error("buffer out of space")]
    OutOfSpace,

    /// Nothing to read
    #[error("no data available")]
    NoData,
}

/// Fixed-capacity circular byte queue with wraparound indices.
///
/// Single-owner, single-thread access only; the engine never shares it
/// across contexts.
pub struct RingBuffer {
    storage: Box<[u8]>,
    read_index: usize,
    write_index: usize,
    full: bool,
}

impl RingBuffer {
    /// Create a buffer holding up to `capacity` bytes.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            read_index: 0,
            write_index: 0,
            full: false,
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else if self.write_index >= self.read_index {
            self.write_index - self.read_index
        } else {
            self.capacity() - self.read_index + self.write_index
        }
    }

    /// Free space in bytes.
    pub fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    /// True if no unread bytes remain.
    pub fn is_empty(&self) -> bool {
        self.read_index == self.write_index && !self.full
    }

    /// True if the buffer holds exactly `capacity` unread bytes.
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Write a single byte.
    pub fn write(&mut self, byte: u8) -> Result<(), BufferError> {
        if self.full {
            return Err(BufferError::OutOfSpace);
        }

        self.storage[self.write_index] = byte;
        self.write_index = (self.write_index + 1) % self.capacity();
        if self.write_index == self.read_index {
            self.full = true;
        }
        Ok(())
    }

    /// Write a whole block, or nothing.
    ///
    /// If `data` does not fit in the current free space the buffer is
    /// left untouched. A fitting block is split into at most two
    /// contiguous copies across the wrap boundary.
    pub fn write_block(&mut self, data: &[u8]) -> Result<(), BufferError> {
        if data.len() > self.free() {
            return Err(BufferError::OutOfSpace);
        }
        if data.is_empty() {
            return Ok(());
        }

        let capacity = self.capacity();
        let first = data.len().min(capacity - self.write_index);
        self.storage[self.write_index..self.write_index + first].copy_from_slice(&data[..first]);
        self.write_index = (self.write_index + first) % capacity;

        let rest = &data[first..];
        if !rest.is_empty() {
            self.storage[..rest.len()].copy_from_slice(rest);
            self.write_index = rest.len();
        }

        if self.write_index == self.read_index {
            self.full = true;
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn read(&mut self) -> Result<u8, BufferError> {
        if self.is_empty() {
            return Err(BufferError::NoData);
        }

        let byte = self.storage[self.read_index];
        self.read_index = (self.read_index + 1) % self.capacity();
        self.full = false;
        Ok(byte)
    }

    /// Read up to `out.len()` bytes, returning the actual count.
    pub fn read_block(&mut self, out: &mut [u8]) -> Result<usize, BufferError> {
        if self.is_empty() {
            return Err(BufferError::NoData);
        }
        if out.is_empty() {
            return Ok(0);
        }

        let capacity = self.capacity();
        let (first_run, second_run) = if self.read_index >= self.write_index {
            (capacity - self.read_index, self.write_index)
        } else {
            (self.write_index - self.read_index, 0)
        };

        let first = first_run.min(out.len());
        out[..first].copy_from_slice(&self.storage[self.read_index..self.read_index + first]);
        self.read_index = (self.read_index + first) % capacity;

        let second = second_run.min(out.len() - first);
        if second != 0 {
            out[first..first + second].copy_from_slice(&self.storage[..second]);
            self.read_index = second;
        }

        self.full = false;
        Ok(first + second)
    }

    /// First contiguous unread run, without copying.
    ///
    /// Returns an empty slice when the buffer is empty. After `clear`
    /// consumes this run, a second call surfaces any wrapped remainder.
    pub fn read_pos(&self) -> &[u8] {
        if self.is_empty() {
            return &[];
        }
        let run = if self.read_index >= self.write_index {
            self.capacity() - self.read_index
        } else {
            self.write_index - self.read_index
        };
        &self.storage[self.read_index..self.read_index + run]
    }

    /// Discard up to `count` unread bytes.
    pub fn clear(&mut self, count: usize) {
        if count == 0 || self.is_empty() {
            return;
        }

        let drop = count.min(self.len());
        self.read_index = (self.read_index + drop) % self.capacity();
        self.full = false;
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("full", &self.full)
            .finish()
    }
}
