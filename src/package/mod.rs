//! Packaging: staging, release archives, and the self-extracting
//! installer.

pub mod archive;
pub mod sfx;
pub mod stage;

pub use archive::{create_tar_gz, write_checksum};
pub use sfx::{InstallDirective, SfxOutcome};
pub use stage::{collect_manifest, stage, PackageManifest};
