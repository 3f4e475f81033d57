//! The bundle manifest: the authoritative index of a bundle's contents.
//!
//! Written at build time into the root of the staging tree, consumed exactly
//! once at restore time. Restore is driven *solely* by the manifest and
//! never infers structure by scanning the extracted tree.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RestoreError;
use crate::paths::Category;

/// Manifest schema version written by this build of the tool.
pub const MANIFEST_VERSION: u32 = 1;

/// File name of the manifest inside an archive.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Fixed file name of the generated merged configuration inside the config
/// category.
pub const MERGED_CONFIG_FILE_NAME: &str = "opencode.json";

/// One staged file: its bundle-relative path and the local root it is
/// restored against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Path relative to the category root.
    pub path: String,
    /// Category determining the destination root.
    pub relative_to: Category,
}

/// Persisted JSON artifact describing every file in a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    /// Manifest schema version.
    pub version: u32,
    /// Creation timestamp (RFC 3339).
    pub created_at: DateTime<Utc>,
    /// Name of the target this bundle was built for.
    pub target: String,
    /// The configuration sync mode in effect (`none`, `full`, `merge`).
    pub config_mode: String,
    /// Every staged file, in staging order. Duplicate paths are kept.
    pub files: Vec<ManifestEntry>,
}

impl BundleManifest {
    /// Create a manifest for `target` with an empty file list.
    #[must_use]
    pub fn new(target: &str, config_mode: &str) -> Self {
        Self {
            version: MANIFEST_VERSION,
            created_at: Utc::now(),
            target: target.to_string(),
            config_mode: config_mode.to_string(),
            files: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn push(&mut self, path: String, relative_to: Category) {
        self.files.push(ManifestEntry { path, relative_to });
    }

    /// Serialize to pretty-printed JSON and write to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load and parse a manifest from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RestoreError::MissingManifest`] when the file does not
    /// exist and [`RestoreError::ManifestParse`] when it cannot be parsed.
    pub fn read_from(path: &Path) -> Result<Self, RestoreError> {
        if !path.exists() {
            return Err(RestoreError::MissingManifest);
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RestoreError::ManifestParse(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| RestoreError::ManifestParse(e.to_string()))
    }
}
