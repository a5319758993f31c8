//! cv - command-line front end for confvault

use clap::Parser;
use confvault::cli::Cli;
use confvault::config::Settings;
use confvault::error::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("Starting confvault");

    let settings = Settings::load()?;
    cli.execute(settings)
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "confvault=debug" } else { "confvault=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
