//! Serial port transport
//!
//! Thin non-blocking adapter over the `serialport` crate. The port is
//! opened with a one-millisecond timeout; timed-out reads and writes
//! surface as "no data" / "zero accepted" so the polling loop never
//! stalls on the link.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use super::{ByteSink, ByteSource, TransportError};

/// Serial port configuration
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Port path, e.g. `/dev/ttyUSB0` or `COM3`
    pub path: String,
    /// Baud rate
    pub baud_rate: u32,
}

impl SerialConfig {
    /// Create a configuration for the given port and baud rate.
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
        }
    }
}

/// Serial port byte sink/source.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open the configured port.
    pub fn open(config: &SerialConfig) -> Result<Self, TransportError> {
        let port = serialport::new(&config.path, config.baud_rate)
            .timeout(Duration::from_millis(1))
            .open()
            .map_err(|e| TransportError::Config(format!("{}: {e}", config.path)))?;
        tracing::info!(path = %config.path, baud = config.baud_rate, "serial port opened");
        Ok(Self { port })
    }

    /// Split into sink and source halves sharing the same port.
    pub fn split(self) -> Result<(SerialTransport, SerialTransport), TransportError> {
        let clone = self.port.try_clone().map_err(|e| {
            TransportError::Config(format!("failed to clone serial handle: {e}"))
        })?;
        Ok((SerialTransport { port: clone }, self))
    }
}

fn is_would_block(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

impl ByteSink for SerialTransport {
    fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        match self.port.write(data) {
            Ok(accepted) => Ok(accepted),
            Err(e) if is_would_block(&e) => Ok(0),
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}

impl ByteSource for SerialTransport {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.port.read(buf) {
            Ok(count) => Ok(count),
            Err(e) if is_would_block(&e) => Ok(0),
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}
