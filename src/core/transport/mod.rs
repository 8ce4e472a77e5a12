//! Byte-oriented transport layer
//!
//! The engine talks to the outside world through two narrow,
//! non-blocking contracts: a sink that accepts as many bytes as the
//! link currently can, and a source that returns whatever bytes have
//! arrived. Framing, retries and the physical link live below this
//! boundary.

mod serial;
mod tcp;

pub use serial::{SerialConfig, SerialTransport};
pub use tcp::{TcpHalf, TcpTransport};

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Transport is not connected yet
    #[error("not connected")]
    NotConnected,

    /// Remote end closed the connection
    #[error("disconnected")]
    Disconnected,

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Outbound byte sink with per-call acceptance limits.
pub trait ByteSink {
    /// Offer `data` to the transport; returns how many leading bytes
    /// were accepted. Must not block; `Ok(0)` means "try again later".
    fn send(&mut self, data: &[u8]) -> Result<usize, TransportError>;
}

/// Inbound byte source.
pub trait ByteSource {
    /// Read available bytes into `buf`, returning the actual count.
    /// Must not block; `Ok(0)` means nothing has arrived.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

struct LoopbackShared {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    tx_accept_limit: Option<usize>,
}

/// In-memory transport, engine side.
///
/// Cloneable so the same wire can serve as both the engine's sink and
/// source; the paired [`LoopbackHost`] plays the operator's terminal.
#[derive(Clone)]
pub struct Loopback {
    shared: Arc<Mutex<LoopbackShared>>,
}

/// Operator side of a [`Loopback`] wire.
pub struct LoopbackHost {
    shared: Arc<Mutex<LoopbackShared>>,
}

impl Loopback {
    /// Create a connected wire pair.
    pub fn pair() -> (Loopback, LoopbackHost) {
        let shared = Arc::new(Mutex::new(LoopbackShared {
            rx: VecDeque::new(),
            tx: Vec::new(),
            tx_accept_limit: None,
        }));
        (
            Loopback {
                shared: Arc::clone(&shared),
            },
            LoopbackHost { shared },
        )
    }
}

impl ByteSink for Loopback {
    fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let mut shared = self.shared.lock();
        let accepted = match shared.tx_accept_limit {
            Some(limit) => data.len().min(limit),
            None => data.len(),
        };
        let taken = &data[..accepted];
        shared.tx.extend_from_slice(taken);
        Ok(accepted)
    }
}

impl ByteSource for Loopback {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut shared = self.shared.lock();
        let mut count = 0;
        while count < buf.len() {
            match shared.rx.pop_front() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

impl LoopbackHost {
    /// Queue bytes for the engine to receive.
    pub fn push(&self, data: &[u8]) {
        self.shared.lock().rx.extend(data.iter().copied());
    }

    /// Take everything the engine has sent so far.
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.shared.lock().tx)
    }

    /// Everything the engine has sent so far, without consuming it.
    pub fn output(&self) -> Vec<u8> {
        self.shared.lock().tx.clone()
    }

    /// Cap how many bytes one `send` call accepts (`None` = unlimited).
    pub fn set_accept_limit(&self, limit: Option<usize>) {
        self.shared.lock().tx_accept_limit = limit;
    }
}
