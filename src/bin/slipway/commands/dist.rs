//! `slipway dist` - run the distribution pipeline.

use std::sync::Arc;

use anyhow::{bail, Result};

use slipway::ops::{dist, DistOptions};
use slipway::util::shell::Shell;

use crate::cli::{Cli, DistArgs};

pub fn execute(globals: &Cli, args: DistArgs) -> Result<()> {
    let json = match args.message_format.as_deref() {
        None | Some("human") => false,
        Some("json") => true,
        Some(other) => bail!("unknown message format '{}'; expected 'human' or 'json'", other),
    };

    let shell = Arc::new(Shell::from_flags(
        globals.quiet,
        globals.verbose,
        globals.color,
        json,
    ));

    let opts = DistOptions {
        root: std::env::current_dir()?,
        archs: args.arch,
        skip_build: args.skip_build,
        sfx: args.sfx,
        manifest_path: args.manifest_path,
    };

    dist(&shell, &opts)
}
