//! BrickHub CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod output;

use brickhub_core::config::logging::LoggingConfig;
use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A broken config file is reported by the command itself.
    let logging = commands::load_config(cli.config.as_deref())
        .map(|c| c.logging)
        .unwrap_or_default();
    init_logging(&logging);

    if let Err(e) = cli.execute().await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber from the logging section.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
