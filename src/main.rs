//! Spottoken - Spotify access token CLI
//!
//! Main entry point: parses flags, initializes tracing, and runs one
//! authorization attempt.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spottoken::cli::Cli;
use spottoken::commands;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Execute the single authorization attempt
    commands::fetch_token(cli).await
}

/// Initialize tracing subscriber with environment filter
///
/// `--verbose` bumps the default level to debug; `RUST_LOG` still wins when
/// set.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "spottoken=debug"
    } else {
        "spottoken=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
