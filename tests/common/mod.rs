// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed home and project pair plus a fluent
// builder so each integration test can set up an isolated opencode
// installation without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use opsync_cli::bundle::Archiver;
use opsync_cli::config::{self, ResolvedTarget, SyncConfig};
use opsync_cli::error::{BundleError, RestoreError};
use opsync_cli::paths::Environment;

/// An isolated home + project pair backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    root: tempfile::TempDir,
    pub env: Environment,
}

impl IntegrationTestContext {
    /// Create a new context with empty home and project directories.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let env = Environment::new(root.path().join("home"), root.path().join("project"));
        std::fs::create_dir_all(&env.home).expect("create home dir");
        std::fs::create_dir_all(&env.cwd).expect("create project dir");
        Self { root, env }
    }

    /// Parse the sync specification previously written into the project.
    pub fn load_spec(&self) -> SyncConfig {
        let (_, config) =
            config::discover_and_load(&self.env, None).expect("discover specification");
        config
    }

    /// Resolve a single target from the written specification.
    pub fn resolve(&self, name: &str) -> ResolvedTarget {
        config::resolve_target(name, &self.load_spec()).expect("resolve target")
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context with empty home and project trees.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write the sync specification to the project root.
    pub fn with_spec(self, content: &str) -> Self {
        let path = self.ctx.env.cwd.join("opsync.json");
        std::fs::write(path, content).expect("write specification");
        self
    }

    /// Write a file under the opencode data directory.
    pub fn with_data_file(self, name: &str, content: &str) -> Self {
        write_file(
            &self.ctx.env.home.join(".local/share/opencode").join(name),
            content,
        );
        self
    }

    /// Write a file under the opencode configuration directory.
    pub fn with_config_file(self, name: &str, content: &str) -> Self {
        write_file(
            &self.ctx.env.home.join(".config/opencode").join(name),
            content,
        );
        self
    }

    /// Write a file relative to the project root.
    pub fn with_project_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.env.cwd.join(rel), content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, content).expect("write file");
}

/// In-process archiver that serialises the staging tree as a JSON document
/// mapping relative paths to base64 file contents.
///
/// Bundle and restore tests stay independent of a system `tar` binary while
/// still exercising real archive round trips.
#[derive(Debug, Default)]
pub struct FakeArchiver;

impl Archiver for FakeArchiver {
    fn archive(&self, dir: &Path) -> Result<Vec<u8>, BundleError> {
        let mut files: BTreeMap<String, String> = BTreeMap::new();
        collect_files(dir, dir, &mut files).map_err(|e| BundleError::Archive {
            message: e.to_string(),
        })?;
        serde_json::to_vec(&files).map_err(|e| BundleError::Archive {
            message: e.to_string(),
        })
    }

    fn extract(&self, bytes: &[u8], dest: &Path) -> Result<(), RestoreError> {
        let files: BTreeMap<String, String> =
            serde_json::from_slice(bytes).map_err(|e| RestoreError::Extract {
                message: e.to_string(),
            })?;
        for (rel, encoded) in files {
            let contents = BASE64.decode(&encoded).map_err(|e| RestoreError::Extract {
                message: e.to_string(),
            })?;
            let path = dest.join(&rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| RestoreError::Extract {
                    message: e.to_string(),
                })?;
            }
            std::fs::write(&path, contents).map_err(|e| RestoreError::Extract {
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

fn collect_files(
    root: &Path,
    dir: &Path,
    out: &mut BTreeMap<String, String>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            let rel: PathBuf = path
                .strip_prefix(root)
                .map_err(std::io::Error::other)?
                .to_path_buf();
            let bytes = std::fs::read(&path)?;
            out.insert(
                rel.to_string_lossy().replace('\\', "/"),
                BASE64.encode(bytes),
            );
        }
    }
    Ok(())
}
