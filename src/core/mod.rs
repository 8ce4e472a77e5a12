//! Core command-engine functionality

pub mod command;
pub mod console;
pub mod engine;
pub mod line;
pub mod ring;
pub mod tokenizer;
pub mod transport;

pub use command::{CallState, CmdError, CmdResult, CmdStatus, Command, CommandHandler};
pub use console::{Console, PrintError};
pub use engine::{Engine, EngineOptions};
pub use line::LineEditor;
pub use ring::{BufferError, RingBuffer};
pub use transport::{ByteSink, ByteSource, Loopback, LoopbackHost, TransportError};
