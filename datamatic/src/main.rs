mod commands;
mod ops;
mod reports;

use clap::Parser;
use eyre::Result;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::commands::Cli;

/// Environment variable holding the log filter, e.g. `DATAMATIC_LOG=debug`.
const LOG_ENV: &str = "DATAMATIC_LOG";

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var(LOG_ENV)
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    Cli::parse().run()
}
