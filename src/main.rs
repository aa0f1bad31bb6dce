use std::process::ExitCode;

use brain::cli::{self, Cli};
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Log filter variable, checked before `RUST_LOG`.
const LOG_ENV: &str = "BRAIN_LOG";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    cli::run(cli).await
}

/// Log to stderr so command output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        std::env::var(LOG_ENV)
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
