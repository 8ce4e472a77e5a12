//! Stock commands
//!
//! Small general-purpose handlers used by the demo binary and the
//! integration tests. `tick` is the reference implementation of the
//! async calling protocol: it parses its arguments on the first call,
//! yields every tick, and emits one line per period until its count
//! runs out or the operator cancels.

use std::time::{Duration, Instant};

use crate::core::command::{CallState, CmdError, CmdResult, CmdStatus, Command, CommandHandler};
use crate::core::console::Console;

/// Build the stock command table.
pub fn stock_commands() -> Vec<Command> {
    vec![
        Command::new("echo", echo).usage("[TEXT...]"),
        Command::new("uptime", Uptime::new()),
        Command::new("tick", Tick::default()).usage("PERIOD_MS [COUNT]"),
    ]
}

/// `echo`: print the arguments back.
fn echo(console: &mut Console, args: &[&str], state: CallState) -> CmdResult {
    if state != CallState::First {
        return Ok(CmdStatus::Done);
    }
    let _ = console.safe_print("\r\n");
    let _ = console.safe_print(&args[1..].join(" "));
    Ok(CmdStatus::Done)
}

/// `uptime`: milliseconds since the table was built.
struct Uptime {
    started: Instant,
}

impl Uptime {
    fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl CommandHandler for Uptime {
    fn call(&mut self, console: &mut Console, _args: &[&str], state: CallState) -> CmdResult {
        if state != CallState::First {
            return Ok(CmdStatus::Done);
        }
        let _ = console.safe_print(&format!("\r\n{} ms", self.started.elapsed().as_millis()));
        Ok(CmdStatus::Done)
    }
}

/// `tick PERIOD_MS [COUNT]`: periodic async logger.
#[derive(Default)]
struct Tick {
    period: Duration,
    remaining: Option<u64>,
    next_due: Option<Instant>,
    emitted: u64,
}

impl Tick {
    fn parse_args(&mut self, args: &[&str]) -> Result<(), CmdError> {
        if args.len() < 2 || args.len() > 3 {
            return Err(CmdError::InvalidArg);
        }
        let period_ms: u64 = args[1].parse().map_err(|_| CmdError::InvalidArg)?;
        self.period = Duration::from_millis(period_ms);
        self.remaining = match args.get(2) {
            Some(count) => Some(count.parse().map_err(|_| CmdError::InvalidArg)?),
            None => None,
        };
        Ok(())
    }
}

impl CommandHandler for Tick {
    fn call(&mut self, console: &mut Console, args: &[&str], state: CallState) -> CmdResult {
        match state {
            CallState::First => {
                self.parse_args(args)?;
                self.emitted = 0;
                self.next_due = Some(Instant::now() + self.period);
                if self.remaining == Some(0) {
                    return Ok(CmdStatus::Done);
                }
                Ok(CmdStatus::Pending)
            }
            CallState::Repeated => {
                let due = match self.next_due {
                    Some(due) => due,
                    None => return Ok(CmdStatus::Done),
                };
                if Instant::now() < due {
                    return Ok(CmdStatus::Pending);
                }

                self.emitted += 1;
                let _ = console.safe_print(&format!("\r\ntick {}", self.emitted));
                self.next_due = Some(due + self.period);

                if let Some(remaining) = &mut self.remaining {
                    *remaining -= 1;
                    if *remaining == 0 {
                        return Ok(CmdStatus::Done);
                    }
                }
                Ok(CmdStatus::Pending)
            }
            CallState::Terminate => {
                self.next_due = None;
                Ok(CmdStatus::Done)
            }
        }
    }
}
