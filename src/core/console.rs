//! Console output path and flow control
//!
//! All outbound text, echo included, goes through one ring buffer that
//! is drained toward the sink one contiguous span per poll tick. The
//! sink reports how much it actually accepted, so a slow link simply
//! leaves the remainder queued for the next tick.

use std::time::{Duration, Instant};

use thiserror::Error;

use super::ring::RingBuffer;
use super::transport::ByteSink;

/// Console output error types
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintError {
    /// Message does not fit in the outbound buffer right now
    #[error("output buffer out of space")]
    OutOfSpace,

    /// Bounded-wait send exceeded its deadline
    #[error("print timed out")]
    Timeout,
}

/// Outbound side of the engine: ring buffer plus transport sink.
///
/// Handlers receive `&mut Console` on every call and use it as their
/// only way to produce wire output.
pub struct Console {
    tx: RingBuffer,
    sink: Box<dyn ByteSink>,
    safe_print_timeout: Duration,
}

impl Console {
    /// Create a console with the given outbound capacity and sink.
    pub fn new(tx_capacity: usize, sink: Box<dyn ByteSink>, safe_print_timeout: Duration) -> Self {
        Self {
            tx: RingBuffer::new(tx_capacity),
            sink,
            safe_print_timeout,
        }
    }

    /// Enqueue a message, all or nothing.
    ///
    /// Fails with [`PrintError::OutOfSpace`] and leaves the buffer
    /// unchanged if the message does not fit in the current free space.
    pub fn print(&mut self, text: &str) -> Result<(), PrintError> {
        self.tx
            .write_block(text.as_bytes())
            .map_err(|_| PrintError::OutOfSpace)
    }

    /// Enqueue a message with a bounded wait.
    ///
    /// Drains outstanding output and retries in capacity-sized chunks
    /// until the whole message is queued or the configured timeout
    /// elapses. Intended for must-deliver text (help listings, fault
    /// reports) without ever blocking indefinitely.
    pub fn safe_print(&mut self, text: &str) -> Result<(), PrintError> {
        let mut remaining = text.as_bytes();
        let capacity = self.tx.capacity();
        let deadline = Instant::now() + self.safe_print_timeout;

        while !remaining.is_empty() {
            self.poll_send();
            let chunk = remaining.len().min(capacity);
            if self.tx.write_block(&remaining[..chunk]).is_ok() {
                remaining = &remaining[chunk..];
                continue;
            }
            if Instant::now() >= deadline {
                return Err(PrintError::Timeout);
            }
        }
        Ok(())
    }

    /// Best-effort single-byte echo; dropped silently when full.
    pub fn echo(&mut self, byte: u8) {
        let _ = self.tx.write(byte);
    }

    /// One flow-control tick: offer the first contiguous unread span
    /// to the sink and discard exactly as much as it accepted.
    pub fn poll_send(&mut self) {
        let span = self.tx.read_pos();
        if span.is_empty() {
            return;
        }
        let span_len = span.len();
        match self.sink.send(span) {
            Ok(accepted) => self.tx.clear(accepted.min(span_len)),
            Err(e) => tracing::trace!("send failed, output stays queued: {e}"),
        }
    }

    /// Unread bytes currently queued for the sink.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::{Loopback, LoopbackHost};

    fn console(capacity: usize) -> (Console, LoopbackHost) {
        let (port, host) = Loopback::pair();
        (
            Console::new(capacity, Box::new(port), Duration::from_millis(50)),
            host,
        )
    }

    #[test]
    fn test_print_all_or_nothing() {
        let (mut console, host) = console(8);
        console.print("abcdef").unwrap();
        assert_eq!(console.print("ghi"), Err(PrintError::OutOfSpace));

        // The rejected message left the queue untouched.
        console.poll_send();
        assert_eq!(host.take_output(), b"abcdef");
    }

    #[test]
    fn test_chunked_drain_preserves_bytes() {
        let (mut console, host) = console(16);
        host.set_accept_limit(Some(3));
        console.print("hello world").unwrap();

        for _ in 0..8 {
            console.poll_send();
        }
        assert_eq!(host.take_output(), b"hello world");
        assert_eq!(console.pending(), 0);
    }

    #[test]
    fn test_safe_print_larger_than_buffer() {
        let (mut console, host) = console(4);
        console.safe_print("0123456789").unwrap();
        console.poll_send();
        assert_eq!(host.take_output(), b"0123456789");
    }

    #[test]
    fn test_safe_print_times_out_when_sink_stalls() {
        let (mut console, host) = console(4);
        host.set_accept_limit(Some(0));
        assert_eq!(console.safe_print("0123456789"), Err(PrintError::Timeout));
    }

    #[test]
    fn test_echo_drop_is_silent() {
        let (mut console, host) = console(2);
        console.echo(b'a');
        console.echo(b'b');
        console.echo(b'c'); // dropped, buffer full
        console.poll_send();
        assert_eq!(host.take_output(), b"ab");
    }
}
