//! Slipway CLI - build-and-package orchestrator for the levython runtime.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("slipway=debug")
    } else {
        EnvFilter::new("slipway=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match &cli.command {
        Commands::Dist(args) => commands::dist::execute(&cli, args.clone()),
        Commands::Toolchain(args) => commands::toolchain::execute(&cli, args.clone()),
        Commands::Clean(args) => commands::clean::execute(&cli, args.clone()),
    }
}
