//! Bundle construction and restoration.
//!
//! A bundle is a gzip tar archive of staged files partitioned by category
//! (`config/`, `data/`, `root/`) with a `manifest.json` at its root. The
//! manifest is the sole authority at restore time: only files it names are
//! placed back into the live tree.

pub mod archive;
pub mod collect;
pub mod manifest;
pub mod restore;
pub mod stage;

pub use archive::{Archiver, TarArchiver};
pub use collect::{BundleFile, collect_bundle_files};
pub use manifest::{
    BundleManifest, MANIFEST_FILE_NAME, MANIFEST_VERSION, ManifestEntry, MERGED_CONFIG_FILE_NAME,
};
pub use restore::{RestoreSummary, restore_bundle};
pub use stage::{BuiltBundle, create_bundle, create_bundle_directory};
