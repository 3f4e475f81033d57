//! Manifest-driven bundle restoration.
//!
//! Restoration is the inverse of staging: the payload is decoded and
//! extracted into a scratch directory, the manifest is read back, and only
//! the files the manifest names are placed into the live tree. Nothing in
//! the archive outside the manifest is ever touched, and existing files not
//! named by the manifest are left alone.

use std::path::{Component, Path};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::archive::Archiver;
use super::manifest::{BundleManifest, MANIFEST_FILE_NAME};
use crate::error::RestoreError;
use crate::logging::Log;
use crate::paths::{self, Environment};

/// Outcome of a restoration pass.
#[derive(Debug, Default)]
pub struct RestoreSummary {
    /// Files placed into the live tree.
    pub restored: usize,
    /// Manifest entries whose staged file was missing from the archive.
    pub skipped: usize,
}

/// Restore a base64-encoded bundle payload into the live tree.
///
/// Placement is purely additive and manifest-driven. A manifest entry whose
/// staged file is absent from the archive is logged as a warning and
/// skipped; the rest of the bundle still restores.
///
/// # Errors
///
/// Returns [`RestoreError::Decode`] for an invalid base64 payload,
/// [`RestoreError::Extract`] when the archiver fails,
/// [`RestoreError::MissingManifest`] when the archive carries no manifest,
/// and [`RestoreError::Place`] when a file cannot be written into place.
pub fn restore_bundle(
    payload: &str,
    env: &Environment,
    archiver: &dyn Archiver,
    log: &dyn Log,
) -> Result<RestoreSummary, RestoreError> {
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(RestoreError::Decode)?;

    let scratch = tempfile::Builder::new()
        .prefix("opsync-restore-")
        .tempdir()
        .map_err(|source| RestoreError::Place {
            path: std::env::temp_dir(),
            source,
        })?;
    archiver.extract(&bytes, scratch.path())?;

    let manifest = BundleManifest::read_from(&scratch.path().join(MANIFEST_FILE_NAME))?;
    log.info(&format!(
        "restoring bundle for target '{}' ({} files, {} config mode)",
        manifest.target,
        manifest.files.len(),
        manifest.config_mode
    ));

    let mut summary = RestoreSummary::default();
    for entry in &manifest.files {
        if !stays_under_root(Path::new(&entry.path)) {
            log.warn(&format!(
                "bundle entry {}/{} escapes its category root, skipping",
                entry.relative_to, entry.path
            ));
            summary.skipped += 1;
            continue;
        }

        let staged = scratch
            .path()
            .join(entry.relative_to.dir_name())
            .join(&entry.path);
        if !staged.is_file() {
            log.warn(&format!(
                "bundle entry {}/{} missing from archive",
                entry.relative_to, entry.path
            ));
            summary.skipped += 1;
            continue;
        }

        let dest = paths::category_root(env, entry.relative_to).join(&entry.path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| RestoreError::Place {
                path: dest.clone(),
                source,
            })?;
        }
        std::fs::copy(&staged, &dest).map_err(|source| RestoreError::Place {
            path: dest.clone(),
            source,
        })?;
        log.debug(&format!("restored {}", dest.display()));
        summary.restored += 1;
    }

    Ok(summary)
}

/// A manifest path may only descend: purely relative, no `..`, no root, no
/// drive prefix. Anything else points outside the category root.
fn stays_under_root(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_)))
}
