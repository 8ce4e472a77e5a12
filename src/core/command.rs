//! Command table and calling contract
//!
//! Commands are driven through a tri-state protocol that stands in for
//! coroutines in the single-threaded polling loop: `First` on dispatch,
//! `Repeated` once per poll tick while the command reports
//! [`CmdStatus::Pending`], and `Terminate` exactly once if the operator
//! cancels. Handlers keep their step/progress state in `&mut self`.

use thiserror::Error;

use super::console::Console;

/// Which leg of the calling protocol a handler invocation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Initial call, right after dispatch
    First,
    /// One call per poll tick while the command is still running
    Repeated,
    /// Cancellation; release resources, return value is ignored
    Terminate,
}

/// Successful handler outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdStatus {
    /// Command finished; the engine returns to idle
    Done,
    /// Still executing; call again next tick
    Pending,
}

/// Handler failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CmdError {
    /// Handler rejected its own arguments (reported on the wire)
    #[error("incorrect argument")]
    InvalidArg,

    /// Generic handler-specific fault (logged, silent on the wire)
    #[error("command failed: {0}")]
    Failed(String),
}

/// Result of one handler invocation.
pub type CmdResult = Result<CmdStatus, CmdError>;

/// A registered command's behavior.
///
/// `args` always includes the command name as element zero and aliases
/// the frozen input line; the same slices are handed to every call of
/// one execution.
pub trait CommandHandler {
    /// Execute one protocol leg.
    fn call(&mut self, console: &mut Console, args: &[&str], state: CallState) -> CmdResult;
}

impl<F> CommandHandler for F
where
    F: FnMut(&mut Console, &[&str], CallState) -> CmdResult,
{
    fn call(&mut self, console: &mut Console, args: &[&str], state: CallState) -> CmdResult {
        self(console, args, state)
    }
}

/// A named entry of the command table.
///
/// Names are assumed unique and are matched case-sensitively; the
/// table is not validated. `help` is reserved for the built-in listing
/// and must not be registered.
pub struct Command {
    name: String,
    usage: Option<String>,
    handler: Box<dyn CommandHandler>,
}

impl Command {
    /// Create a command with the given name and handler.
    pub fn new(name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name: name.into(),
            usage: None,
            handler: Box::new(handler),
        }
    }

    /// Attach a usage string, shown by `help` after the name.
    #[must_use]
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Usage string, if any.
    pub fn usage_text(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub(crate) fn handler_mut(&mut self) -> &mut dyn CommandHandler {
        self.handler.as_mut()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .finish()
    }
}
