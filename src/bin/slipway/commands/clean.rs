//! `slipway clean` - remove build scratch and release directories.

use std::sync::Arc;

use anyhow::Result;

use slipway::core::product::ProductManifest;
use slipway::util::fs::remove_dir_all_if_exists;
use slipway::util::shell::{Shell, Status};

use crate::cli::{CleanArgs, Cli};

pub fn execute(globals: &Cli, args: CleanArgs) -> Result<()> {
    let shell = Arc::new(Shell::from_flags(
        globals.quiet,
        globals.verbose,
        globals.color,
        false,
    ));

    let root = std::env::current_dir()?;
    let product = ProductManifest::load_or_default(&root, args.manifest_path.as_deref())?;

    for dir in [
        root.join(&product.build.target_dir),
        root.join(&product.package.release_dir),
    ] {
        if dir.exists() {
            remove_dir_all_if_exists(&dir)?;
            shell.status(Status::Removed, dir.display());
        }
    }

    Ok(())
}
