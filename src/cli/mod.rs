//! Command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "examglass")]
#[command(about = "Exam solver loop for AI glasses", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Load configuration from this file instead of .examglass/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default .examglass/config.yaml
    Init(commands::init::InitArgs),

    /// Run the capture / solve / display loop until Ctrl-C
    Solve,
}

/// Log the error chain and exit non-zero.
pub fn handle_error(err: anyhow::Error) -> ! {
    error!("{err:#}");
    std::process::exit(1);
}
