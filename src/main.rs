//! kenrich CLI: enrich Kubernetes resource fragments from file naming conventions.

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "kenrich",
    version,
    about = "Enrich Kubernetes resource fragments: kind, apiVersion and name from file names"
)]
struct Cli {
    /// Log level (written to stderr)
    #[arg(long, value_enum, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: kenrich::cli::Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// `KENRICH_LOG` takes precedence over `--log-level`.
fn setup_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_env("KENRICH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.log_level);
    if let Err(e) = kenrich::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
