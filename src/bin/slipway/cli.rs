//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use slipway::core::arch::ArchSelect;
use slipway::util::shell::ColorChoice;

/// Slipway - build-and-package orchestrator for the levython runtime
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress everything but errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output: auto, always, or never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build, package, and optionally assemble installers
    Dist(DistArgs),

    /// Show the toolchain slipway would use
    Toolchain(ToolchainArgs),

    /// Remove build scratch and release directories
    Clean(CleanArgs),
}

#[derive(Args, Clone)]
pub struct DistArgs {
    /// Target architecture: x86, x64, arm64, auto, or all
    #[arg(long, default_value = "auto")]
    pub arch: ArchSelect,

    /// Package a previously built executable without compiling
    #[arg(long)]
    pub skip_build: bool,

    /// Also assemble a self-extracting installer
    #[arg(long)]
    pub sfx: bool,

    /// Path to Slipway.toml (defaults to ./Slipway.toml)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Output format: human or json
    #[arg(long, value_name = "FMT")]
    pub message_format: Option<String>,
}

#[derive(Args, Clone)]
pub struct ToolchainArgs {}

#[derive(Args, Clone)]
pub struct CleanArgs {
    /// Path to Slipway.toml (defaults to ./Slipway.toml)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}
