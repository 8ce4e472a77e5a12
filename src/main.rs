//! Devcon demo console
//!
//! Serves the stock command table over a serial port or a TCP
//! listener, polling the engine at a fixed interval.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use devcon::commands::stock_commands;
use devcon::core::transport::{ByteSink, ByteSource, SerialConfig, SerialTransport, TcpTransport};
use devcon::{ConsoleConfig, Engine};

/// Interactive device console over serial or TCP
#[derive(Parser, Debug)]
#[command(name = "devcon", version, about)]
struct Args {
    /// Serial port to serve on, e.g. /dev/ttyUSB0
    #[arg(long, conflicts_with = "listen")]
    serial: Option<String>,

    /// Baud rate for the serial port
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// TCP address to listen on, e.g. 127.0.0.1:5555
    #[arg(long)]
    listen: Option<String>,

    /// Explicit config file path (defaults to the platform config dir)
    #[arg(long, env = "DEVCON_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ConsoleConfig::load_from(path)?,
        None => ConsoleConfig::load()?,
    };
    tracing::info!("starting devcon v{}", env!("CARGO_PKG_VERSION"));

    let (source, sink): (Box<dyn ByteSource>, Box<dyn ByteSink>) =
        if let Some(addr) = &args.listen {
            let (sink, source) = TcpTransport::bind(addr.as_str())?.split()?;
            (Box::new(source), Box::new(sink))
        } else if let Some(port) = &args.serial {
            let serial = SerialTransport::open(&SerialConfig::new(port, args.baud))?;
            let (sink, source) = serial.split()?;
            (Box::new(source), Box::new(sink))
        } else {
            return Err("specify either --serial or --listen".into());
        };

    let poll_interval = Duration::from_millis(config.poll_interval_ms.max(1));
    let mut engine = Engine::new(config.engine_options(), source, sink, stock_commands());

    loop {
        engine.process();
        std::thread::sleep(poll_interval);
    }
}
