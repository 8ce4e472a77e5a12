//! # Devcon
//!
//! An embedded-style interactive command engine over byte-oriented
//! transports (serial links, TCP, in-memory loopback). The engine is
//! single-threaded and cooperative: one [`Engine::process`] call per
//! control-loop tick performs one receive poll, one command step and
//! one flow-controlled send poll, and never blocks.
//!
//! Commands are driven through a tri-state calling protocol
//! (first/repeated/terminate) that lets a long-running command keep
//! its own progress state and yield control back every tick — the
//! polling-loop substitute for coroutines.
//!
//! ## Example
//!
//! ```rust
//! use devcon::{CallState, CmdStatus, Command, Engine, EngineOptions, Loopback};
//!
//! let (port, host) = Loopback::pair();
//! let table = vec![Command::new("hi", |console: &mut devcon::Console,
//!                                      _args: &[&str],
//!                                      _state: CallState| {
//!     console.safe_print("\r\nhello").ok();
//!     Ok(CmdStatus::Done)
//! })];
//!
//! let mut engine = Engine::new(
//!     EngineOptions::default(),
//!     Box::new(port.clone()),
//!     Box::new(port),
//!     table,
//! );
//!
//! host.push(b"hi\r");
//! for _ in 0..8 {
//!     engine.process();
//! }
//! assert!(host.take_output().ends_with(b"\r\nhello\r\n> "));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commands;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::config::{ConfigError, ConsoleConfig};
pub use crate::core::command::{
    CallState, CmdError, CmdResult, CmdStatus, Command, CommandHandler,
};
pub use crate::core::console::{Console, PrintError};
pub use crate::core::engine::{Engine, EngineOptions};
pub use crate::core::ring::{BufferError, RingBuffer};
pub use crate::core::transport::{
    ByteSink, ByteSource, Loopback, LoopbackHost, SerialConfig, SerialTransport, TcpTransport,
    TransportError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
