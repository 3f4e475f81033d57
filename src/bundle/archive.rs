//! Archiving abstraction for bundle transport.
//!
//! The external archiver is an injected capability so bundle building and
//! restoring can be tested without spawning a real subprocess. The
//! production implementation shells out to the system `tar`.

use std::path::Path;

use crate::error::{BundleError, RestoreError};
use crate::exec;

/// Abstraction over the external archiver.
///
/// `archive` produces gzip-compressed tar bytes whose entries are relative
/// to `dir` (no leading path component naming `dir` itself); `extract`
/// reverses the operation into an existing scratch directory.
pub trait Archiver: Send + Sync + std::fmt::Debug {
    /// Archive the entire tree rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Archive`] carrying the archiver's diagnostic
    /// output when the archiver cannot be spawned or exits non-zero.
    fn archive(&self, dir: &Path) -> Result<Vec<u8>, BundleError>;

    /// Extract archive bytes into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RestoreError::Extract`] carrying the archiver's diagnostic
    /// output on failure.
    fn extract(&self, bytes: &[u8], dir: &Path) -> Result<(), RestoreError>;
}

/// Production [`Archiver`] that spawns the system `tar`.
#[derive(Debug, Default)]
pub struct TarArchiver;

impl Archiver for TarArchiver {
    fn archive(&self, dir: &Path) -> Result<Vec<u8>, BundleError> {
        let tarball = tempfile::Builder::new()
            .prefix("opsync-archive-")
            .suffix(".tgz")
            .tempfile()
            .map_err(|e| BundleError::Archive {
                message: format!("cannot create temporary archive file: {e}"),
            })?;
        let tarball_path = tarball.path().display().to_string();
        let dir_arg = dir.display().to_string();

        // Entries are created relative to the staging root: `-C dir .`
        let result = exec::run_unchecked(
            "tar",
            &["-czf", &tarball_path, "-C", &dir_arg, "."],
        )
        .map_err(|e| BundleError::Archive {
            message: e.to_string(),
        })?;
        if !result.success {
            return Err(BundleError::Archive {
                message: format!(
                    "tar exited with {}: {}",
                    result.code.unwrap_or(-1),
                    result.stderr.trim()
                ),
            });
        }

        std::fs::read(tarball.path()).map_err(|e| BundleError::Archive {
            message: format!("cannot read archive: {e}"),
        })
    }

    fn extract(&self, bytes: &[u8], dir: &Path) -> Result<(), RestoreError> {
        std::fs::create_dir_all(dir).map_err(|e| RestoreError::Extract {
            message: format!("cannot create extraction directory: {e}"),
        })?;

        let mut tarball = tempfile::Builder::new()
            .prefix("opsync-extract-")
            .suffix(".tgz")
            .tempfile()
            .map_err(|e| RestoreError::Extract {
                message: format!("cannot create temporary archive file: {e}"),
            })?;
        std::io::Write::write_all(&mut tarball, bytes).map_err(|e| RestoreError::Extract {
            message: format!("cannot write archive bytes: {e}"),
        })?;

        let tarball_path = tarball.path().display().to_string();
        let dir_arg = dir.display().to_string();
        let result = exec::run_unchecked("tar", &["-xzf", &tarball_path, "-C", &dir_arg])
            .map_err(|e| RestoreError::Extract {
                message: e.to_string(),
            })?;
        if !result.success {
            return Err(RestoreError::Extract {
                message: format!(
                    "tar exited with {}: {}",
                    result.code.unwrap_or(-1),
                    result.stderr.trim()
                ),
            });
        }
        Ok(())
    }
}
