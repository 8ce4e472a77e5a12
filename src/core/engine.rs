//! Interactive command engine
//!
//! One [`Engine::process`] call performs exactly one receive poll, one
//! command step and one send poll, so the owning control loop never
//! blocks on the console. A running command is driven through the
//! tri-state calling protocol (`First`/`Repeated`/`Terminate`) and can
//! only be displaced by the operator's cancel byte.

use std::ops::Range;
use std::time::Duration;

use super::command::{CallState, CmdError, CmdStatus, Command};
use super::console::Console;
use super::line::{self, LineEditor};
use super::tokenizer;
use super::transport::{ByteSink, ByteSource};

/// Carriage return; terminates a line.
const BYTE_ENTER: u8 = 0x0D;
/// Backspace/delete as sent by most terminals.
const BYTE_BACKSPACE: u8 = 0x7F;
/// ETX (Ctrl-C); cancels a running command.
const BYTE_CANCEL: u8 = 0x03;

const MSG_NOT_FOUND: &str = "\r\nCMD not found!";
const MSG_BAD_ARG: &str = "Incorrect arg!\r\n";

/// Engine tuning knobs.
///
/// The defaults mirror a small-device console; hosted deployments
/// usually come from [`crate::config::ConsoleConfig`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Prompt printed at startup and after every completed command
    pub prompt: String,
    /// Outbound ring buffer capacity in bytes
    pub tx_buffer_size: usize,
    /// Line buffer capacity in bytes (one slot reserved)
    pub line_size: usize,
    /// Bytes pulled from the source per poll tick
    pub rx_chunk_size: usize,
    /// Maximum tokens per line, command name included
    pub max_tokens: usize,
    /// Deadline for bounded-wait prints
    pub safe_print_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            prompt: "\r\n> ".to_string(),
            tx_buffer_size: 256,
            line_size: 128,
            rx_chunk_size: 64,
            max_tokens: 10,
            safe_print_timeout: Duration::from_millis(100),
        }
    }
}

/// Executor state: either idle or driving one command.
enum ExecState {
    Idle,
    Running {
        /// Index into the command table
        index: usize,
        /// Token spans into the frozen line buffer
        spans: Vec<Range<usize>>,
    },
}

/// The interactive command engine.
///
/// Owns both ring buffers, the line editor and the command table; all
/// mutation happens inside [`Engine::process`], which must be called
/// from a single context.
pub struct Engine {
    console: Console,
    source: Box<dyn ByteSource>,
    line: LineEditor,
    commands: Vec<Command>,
    exec: ExecState,
    prompt: String,
    max_tokens: usize,
    rx_chunk: Vec<u8>,
}

impl Engine {
    /// Build an engine over the given transport halves and command
    /// table, and print the startup prompt.
    pub fn new(
        options: EngineOptions,
        source: Box<dyn ByteSource>,
        sink: Box<dyn ByteSink>,
        commands: Vec<Command>,
    ) -> Self {
        let mut console = Console::new(
            options.tx_buffer_size,
            sink,
            options.safe_print_timeout,
        );
        let _ = console.print(&options.prompt);

        Self {
            console,
            source,
            line: LineEditor::new(options.line_size),
            commands,
            exec: ExecState::Idle,
            prompt: options.prompt,
            max_tokens: options.max_tokens,
            rx_chunk: vec![0u8; options.rx_chunk_size],
        }
    }

    /// One cooperative poll tick: receive, step, send.
    pub fn process(&mut self) {
        self.poll_receive();
        self.step_command();
        self.console.poll_send();
    }

    /// True while a command is being driven across ticks.
    pub fn is_running(&self) -> bool {
        matches!(self.exec, ExecState::Running { .. })
    }

    /// Direct access to the console, e.g. for out-of-band status text.
    pub fn console(&mut self) -> &mut Console {
        &mut self.console
    }

    fn poll_receive(&mut self) {
        let count = match self.source.recv(&mut self.rx_chunk) {
            Ok(count) => count,
            Err(e) => {
                tracing::trace!("receive failed: {e}");
                return;
            }
        };

        for i in 0..count {
            let byte = self.rx_chunk[i];
            if self.is_running() {
                if byte == BYTE_CANCEL {
                    self.cancel();
                }
                // Everything else is ignored while a command runs; the
                // line buffer stays frozen.
            } else if line::is_printable(byte) {
                self.console.echo(byte);
                self.line.push(byte);
            } else if byte == BYTE_BACKSPACE {
                self.console.echo(byte);
                self.line.backspace();
            } else if byte == BYTE_ENTER {
                self.dispatch();
            }
        }
    }

    /// Handle a finished line: tokenize, look up, run the first leg.
    fn dispatch(&mut self) {
        if self.line.overflowed() {
            // Never act on truncated input.
            tracing::debug!("dropping overflowed line");
            self.reject_line();
            return;
        }

        let spans = tokenizer::tokenize(
            self.line.as_bytes(),
            tokenizer::DEFAULT_DELIMITERS,
            self.max_tokens,
        );
        if spans.is_empty() {
            self.line.reset();
            let _ = self.console.print(&self.prompt);
            return;
        }

        let args = tokenizer::resolve(self.line.as_bytes(), &spans);
        let name = args[0];
        let Some(index) = self.commands.iter().position(|c| c.name() == name) else {
            if name == "help" {
                self.print_help();
                self.line.reset();
                let _ = self.console.print(&self.prompt);
            } else {
                tracing::debug!(command = name, "command not found");
                self.reject_line();
            }
            return;
        };

        tracing::debug!(command = name, argc = args.len(), "dispatch");
        let result = self.commands[index]
            .handler_mut()
            .call(&mut self.console, &args, CallState::First);

        match result {
            Ok(CmdStatus::Pending) => {
                // Line frozen until the command leaves the running state.
                self.exec = ExecState::Running { index, spans };
            }
            Ok(CmdStatus::Done) => self.finish_idle(),
            Err(CmdError::InvalidArg) => {
                let _ = self.console.print(MSG_BAD_ARG);
                self.finish_idle();
            }
            Err(CmdError::Failed(reason)) => {
                // Silent on the wire; only the host log sees the reason.
                tracing::debug!(command = name, %reason, "command failed");
                self.finish_idle();
            }
        }
    }

    /// One `Repeated` leg per tick while a command is running.
    fn step_command(&mut self) {
        let ExecState::Running { index, ref spans } = self.exec else {
            return;
        };

        let spans = spans.clone();
        let args = tokenizer::resolve(self.line.as_bytes(), &spans);
        let result = self.commands[index]
            .handler_mut()
            .call(&mut self.console, &args, CallState::Repeated);

        if result != Ok(CmdStatus::Pending) {
            if let Err(CmdError::Failed(reason)) = &result {
                tracing::debug!(%reason, "command failed");
            }
            self.finish_idle();
        }
    }

    /// Cancel the running command: exactly one `Terminate` call, its
    /// result ignored, then an unconditional return to idle.
    fn cancel(&mut self) {
        let ExecState::Running { index, ref spans } = self.exec else {
            return;
        };

        tracing::debug!(command = self.commands[index].name(), "cancelled");
        let spans = spans.clone();
        let args = tokenizer::resolve(self.line.as_bytes(), &spans);
        let _ = self.commands[index]
            .handler_mut()
            .call(&mut self.console, &args, CallState::Terminate);
        self.finish_idle();
    }

    /// Built-in `help`: list every registered command with its usage.
    fn print_help(&mut self) {
        let listing: Vec<(String, Option<String>)> = self
            .commands
            .iter()
            .map(|c| (c.name().to_string(), c.usage_text().map(str::to_string)))
            .collect();

        for (name, usage) in listing {
            let _ = self.console.safe_print("\r\n");
            let _ = self.console.safe_print(&name);
            if let Some(usage) = usage {
                if !usage.is_empty() {
                    let _ = self.console.safe_print(" ");
                    let _ = self.console.safe_print(&usage);
                }
            }
        }
        let _ = self.console.safe_print("\r\n");
    }

    fn finish_idle(&mut self) {
        self.exec = ExecState::Idle;
        self.line.reset();
        let _ = self.console.print(&self.prompt);
    }

    /// Resolve a dead-end line: fixed not-found message, then prompt.
    fn reject_line(&mut self) {
        self.line.reset();
        let _ = self.console.print(MSG_NOT_FOUND);
        let _ = self.console.print(&self.prompt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::CmdResult;
    use crate::core::transport::{Loopback, LoopbackHost};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine_with(commands: Vec<Command>) -> (Engine, LoopbackHost) {
        let (port, host) = Loopback::pair();
        let mut engine = Engine::new(
            EngineOptions::default(),
            Box::new(port.clone()),
            Box::new(port),
            commands,
        );
        engine.process();
        host.take_output(); // drop the startup prompt
        (engine, host)
    }

    fn drive(engine: &mut Engine, host: &LoopbackHost, input: &[u8]) -> Vec<u8> {
        host.push(input);
        for _ in 0..64 {
            engine.process();
        }
        host.take_output()
    }

    #[derive(Default)]
    struct CallLog {
        first: u32,
        repeated: u32,
        terminate: u32,
    }

    struct ScriptedHandler {
        log: Rc<RefCell<CallLog>>,
        pending_ticks: u32,
        result: CmdResult,
    }

    impl crate::core::command::CommandHandler for ScriptedHandler {
        fn call(&mut self, _: &mut Console, _: &[&str], state: CallState) -> CmdResult {
            let mut log = self.log.borrow_mut();
            match state {
                CallState::First => {
                    log.first += 1;
                    if self.pending_ticks > 0 {
                        return Ok(CmdStatus::Pending);
                    }
                }
                CallState::Repeated => {
                    log.repeated += 1;
                    if log.repeated < self.pending_ticks {
                        return Ok(CmdStatus::Pending);
                    }
                }
                CallState::Terminate => {
                    log.terminate += 1;
                }
            }
            self.result.clone()
        }
    }

    fn scripted(
        name: &str,
        pending_ticks: u32,
        result: CmdResult,
    ) -> (Command, Rc<RefCell<CallLog>>) {
        let log = Rc::new(RefCell::new(CallLog::default()));
        let handler = ScriptedHandler {
            log: Rc::clone(&log),
            pending_ticks,
            result,
        };
        (Command::new(name, handler), log)
    }

    #[test]
    fn test_startup_prompt() {
        let (port, host) = Loopback::pair();
        let mut engine = Engine::new(
            EngineOptions::default(),
            Box::new(port.clone()),
            Box::new(port),
            Vec::new(),
        );
        engine.process();
        assert_eq!(host.take_output(), b"\r\n> ");
    }

    #[test]
    fn test_echo_and_backspace_edit() {
        let (cmd, _log) = scripted("ac", 0, Ok(CmdStatus::Done));
        let (mut engine, host) = engine_with(vec![cmd]);

        let out = drive(&mut engine, &host, b"ab\x7Fc\r");
        // Echoes: 'a', 'b', BS, 'c'; then prompt only (command found).
        assert_eq!(out, b"ab\x7Fc\r\n> ");
    }

    #[test]
    fn test_unknown_command_message() {
        let (mut engine, host) = engine_with(Vec::new());
        let out = drive(&mut engine, &host, b"xyz\r");
        assert_eq!(out, b"xyz\r\nCMD not found!\r\n> ");
    }

    #[test]
    fn test_blank_line_reprints_prompt_only() {
        let (mut engine, host) = engine_with(Vec::new());
        let out = drive(&mut engine, &host, b"\r");
        assert_eq!(out, b"\r\n> ");
        let out = drive(&mut engine, &host, b"   \r");
        assert_eq!(out, b"   \r\n> ");
    }

    #[test]
    fn test_overflowed_line_is_never_dispatched() {
        let (cmd, log) = scripted("spam", 0, Ok(CmdStatus::Done));
        let (mut engine, host) = engine_with(vec![cmd]);

        // "spam" followed by enough filler to overflow the 128-byte
        // line buffer; token[0] would match if tokenized.
        let mut input = b"spam".to_vec();
        input.extend(std::iter::repeat(b'x').take(200));
        input.push(b'\r');
        let out = drive(&mut engine, &host, &input);

        assert_eq!(log.borrow().first, 0);
        let tail = b"CMD not found!\r\n> ";
        assert!(out.ends_with(tail), "unexpected tail: {:?}", out);
    }

    #[test]
    fn test_async_protocol_tick_counts() {
        let ticks = 5;
        let (cmd, log) = scripted("work", ticks, Ok(CmdStatus::Done));
        let (mut engine, host) = engine_with(vec![cmd]);

        host.push(b"work\r");
        // First dispatch tick.
        engine.process();
        assert!(engine.is_running());

        let mut safety = 0;
        while engine.is_running() {
            engine.process();
            safety += 1;
            assert!(safety < 100, "command never completed");
        }

        let log = log.borrow();
        assert_eq!(log.first, 1);
        assert_eq!(log.repeated, ticks);
        assert_eq!(log.terminate, 0);
        assert!(host.take_output().ends_with(b"\r\n> "));
    }

    #[test]
    fn test_cancel_preempts_running_command() {
        let (cmd, log) = scripted("work", u32::MAX, Ok(CmdStatus::Done));
        let (mut engine, host) = engine_with(vec![cmd]);

        host.push(b"work\r");
        for _ in 0..10 {
            engine.process();
        }
        assert!(engine.is_running());

        host.push(&[0x03]);
        engine.process();
        assert!(!engine.is_running());

        let log = log.borrow();
        assert_eq!(log.terminate, 1);
        assert!(host.take_output().ends_with(b"\r\n> "));

        // A second cancel while idle is ignored.
        host.push(&[0x03]);
        engine.process();
        assert_eq!(log.terminate, 1);
    }

    #[test]
    fn test_invalid_arg_message() {
        let (cmd, _log) = scripted("strict", 0, Err(CmdError::InvalidArg));
        let (mut engine, host) = engine_with(vec![cmd]);

        let out = drive(&mut engine, &host, b"strict nope\r");
        assert_eq!(out, b"strict nopeIncorrect arg!\r\n\r\n> ");
    }

    #[test]
    fn test_failed_is_silent_on_wire() {
        let (cmd, _log) = scripted("broken", 0, Err(CmdError::Failed("nope".into())));
        let (mut engine, host) = engine_with(vec![cmd]);

        let out = drive(&mut engine, &host, b"broken\r");
        assert_eq!(out, b"broken\r\n> ");
    }

    #[test]
    fn test_help_lists_commands_and_usage() {
        let (a, _) = scripted("alpha", 0, Ok(CmdStatus::Done));
        let (b, _) = scripted("beta", 0, Ok(CmdStatus::Done));
        let commands = vec![a.usage("ID"), b];
        let (mut engine, host) = engine_with(commands);

        let out = drive(&mut engine, &host, b"help\r");
        assert_eq!(out, b"help\r\nalpha ID\r\nbeta\r\n\r\n> ");
    }

    #[test]
    fn test_args_stay_frozen_across_repeated_calls() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::default();
        let seen_handle = Rc::clone(&seen);
        let mut ticks = 0u32;
        let handler = move |_: &mut Console, args: &[&str], _state: CallState| {
            seen_handle
                .borrow_mut()
                .push(args.join(","));
            ticks += 1;
            if ticks < 4 {
                Ok(CmdStatus::Pending)
            } else {
                Ok(CmdStatus::Done)
            }
        };
        let (mut engine, host) = engine_with(vec![Command::new("run", handler)]);

        // Keystrokes arriving while the command runs must not perturb
        // the frozen argument view.
        host.push(b"run a b\r");
        engine.process();
        host.push(b"zzz");
        while engine.is_running() {
            engine.process();
        }

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|s| s == "run,a,b"));
    }

    #[test]
    fn test_new_command_accepted_after_completion() {
        let (a, log_a) = scripted("one", 2, Ok(CmdStatus::Done));
        let (b, log_b) = scripted("two", 0, Ok(CmdStatus::Done));
        let (mut engine, host) = engine_with(vec![a, b]);

        drive(&mut engine, &host, b"one\r");
        drive(&mut engine, &host, b"two\r");

        assert_eq!(log_a.borrow().first, 1);
        assert_eq!(log_b.borrow().first, 1);
    }
}
