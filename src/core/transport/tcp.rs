//! TCP transport
//!
//! Serves the console to one network client at a time. The listener
//! and the accepted stream both run in non-blocking mode so a poll
//! tick never waits on the network.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};

use super::{ByteSink, ByteSource, TransportError};

/// Non-blocking TCP byte sink/source.
///
/// Accepts a single client; after the client disconnects the next
/// poll accepts a new one.
pub struct TcpTransport {
    listener: TcpListener,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Bind to `addr` and start listening.
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        tracing::info!(addr = %listener.local_addr()?, "console listening");
        Ok(Self {
            listener,
            stream: None,
        })
    }

    /// Split into sink and source halves sharing the same connection.
    pub fn split(self) -> Result<(TcpHalf, TcpHalf), TransportError> {
        let shared = std::sync::Arc::new(parking_lot::Mutex::new(self));
        Ok((
            TcpHalf {
                inner: std::sync::Arc::clone(&shared),
            },
            TcpHalf { inner: shared },
        ))
    }

    fn poll_accept(&mut self) {
        if self.stream.is_some() {
            return;
        }
        match self.listener.accept() {
            Ok((stream, peer)) => {
                if stream.set_nonblocking(true).is_ok() {
                    tracing::info!(%peer, "console client connected");
                    self.stream = Some(stream);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => tracing::warn!("accept failed: {e}"),
        }
    }

    fn drop_client(&mut self) {
        tracing::info!("console client disconnected");
        self.stream = None;
    }
}

impl ByteSink for TcpTransport {
    fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.poll_accept();
        let Some(stream) = self.stream.as_mut() else {
            // No client: swallow output so the engine does not back up.
            return Ok(data.len());
        };
        match stream.write(data) {
            Ok(accepted) => Ok(accepted),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(_) => {
                self.drop_client();
                Err(TransportError::Disconnected)
            }
        }
    }
}

impl ByteSource for TcpTransport {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.poll_accept();
        let Some(stream) = self.stream.as_mut() else {
            return Ok(0);
        };
        match stream.read(buf) {
            Ok(0) => {
                self.drop_client();
                Err(TransportError::Disconnected)
            }
            Ok(count) => Ok(count),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => {
                self.drop_client();
                Err(TransportError::Io(e))
            }
        }
    }
}

/// One half of a split [`TcpTransport`].
pub struct TcpHalf {
    inner: std::sync::Arc<parking_lot::Mutex<TcpTransport>>,
}

impl ByteSink for TcpHalf {
    fn send(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.inner.lock().send(data)
    }
}

impl ByteSource for TcpHalf {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.inner.lock().recv(buf)
    }
}
