//! `slipway toolchain` - show the discovered toolchain.

use anyhow::Result;

use slipway::builder::toolchain::locate_toolchain;

use crate::cli::{Cli, ToolchainArgs};

pub fn execute(_globals: &Cli, _args: ToolchainArgs) -> Result<()> {
    let toolchain = locate_toolchain()?;
    print!("{}", toolchain.describe());
    Ok(())
}
