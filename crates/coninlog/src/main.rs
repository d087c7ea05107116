//! coninlog entry point.
//!
//! Captures key events from the attached console and prints one line per
//! event to stdout until Ctrl-C or the configured stop key.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load LoggerConfig (+ CLI overrides)
//!  └─ InputLogger::new(platform_console())
//!  └─ start()
//!       ├─ coninlog-reader thread   (blocking console reads)
//!       └─ print_events             (blocking Tokio task draining the channel)
//!  └─ Ctrl-C or stop key → stop()   (restores the console mode)
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use coninlog::application::event_channel::EventReceiver;
use coninlog::application::input_logger::InputLogger;
use coninlog::infrastructure::console_input::platform_console;
use coninlog::infrastructure::storage::config::{self, LoggerConfig, OutputFormat};

/// How long to wait for the reader thread after stop before exiting anyway.
const READER_GRACE: Duration = Duration::from_millis(100);

/// Console keyboard input logger.
#[derive(Debug, Parser)]
#[command(name = "coninlog", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to the platform config directory).
    #[arg(long, env = "CONINLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Output channel capacity; 0 hands every event off synchronously.
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Print events as JSON lines instead of text.
    #[arg(long)]
    json: bool,

    /// Log filter used when RUST_LOG is unset (e.g. "debug").
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply_to(&self, cfg: &mut LoggerConfig) {
        if let Some(size) = self.buffer_size {
            cfg.buffer_size = size;
        }
        if self.json {
            cfg.output = OutputFormat::Json;
        }
        if let Some(level) = &self.log_level {
            cfg.log_level = level.clone();
        }
    }
}

/// Why the printing task returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    StopKey,
    EndOfStream,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load_config(),
    }
    .context("loading configuration")?;
    cli.apply_to(&mut cfg);

    // Logs go to stderr so stdout carries only events.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let console = platform_console()?;
    let logger = InputLogger::new(console, cfg.buffer_size).context("opening console input")?;
    let events = logger.channel();
    logger.start().context("starting input logger")?;

    match cfg.stop_key() {
        Some(vk) => info!("capturing console input; press Ctrl-C or vk=0x{vk:02X} to exit"),
        None => info!("capturing console input; press Ctrl-C to exit"),
    }

    let output = cfg.output;
    let stop_key = cfg.stop_key();
    let mut printer = tokio::task::spawn_blocking(move || print_events(&events, output, stop_key));

    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl-C")?;
            info!("shutdown signal received");
            None
        }
        printed = &mut printer => Some(printed.context("event printer task failed")??),
    };

    logger.stop().context("stopping input logger")?;

    let end = match finished {
        Some(end) => end,
        // Stop closed the channel, so the printer drains and returns.
        None => printer.await.context("event printer task failed")??,
    };
    info!(?end, "session ended");

    match logger.wait_for_reader(READER_GRACE) {
        Ok(Some(exit)) => info!(?exit, "console reader finished"),
        Ok(None) => info!("console reader still parked in a read; exiting anyway"),
        Err(e) => warn!("console reader: {e}"),
    }
    Ok(())
}

/// Writes every event to stdout until end-of-stream or a stop-key press.
fn print_events(
    events: &EventReceiver,
    format: OutputFormat,
    stop_key: Option<u16>,
) -> anyhow::Result<SessionEnd> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for event in events.iter() {
        match format {
            OutputFormat::Text => writeln!(out, "{event}")?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, &event)?;
                writeln!(out)?;
            }
        }
        out.flush()?;

        if event.key_down && Some(event.virtual_key_code) == stop_key {
            return Ok(SessionEnd::StopKey);
        }
    }
    Ok(SessionEnd::EndOfStream)
}
