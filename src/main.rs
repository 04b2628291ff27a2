//! Examglass CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use examglass::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => examglass::cli::commands::init::execute(args).await,
        Commands::Solve => examglass::cli::commands::solve::execute(cli.config).await,
    };

    if let Err(err) = result {
        examglass::cli::handle_error(err);
    }
}
