//! Sync specification: discovery, parsing, and target resolution.
//!
//! The specification file (`opsync.json`, JSON with comments allowed) is
//! discovered by a fixed, priority-ordered path search, parsed and validated
//! into strict structural types, and resolved per target by layering
//! built-in defaults, user-declared defaults, and target overrides.

pub mod jsonc;
pub mod resolve;
pub mod types;

use std::path::{Path, PathBuf};

pub use resolve::{DEFAULT_SECRET_NAME, resolve_all_targets, resolve_target};
pub use types::{
    AuthSpec, ConfigSyncMode, IncludeEntry, MergeSpec, ProviderSpec, ResolvedSpec, ResolvedTarget,
    SyncConfig, SyncSpecification, TargetDef,
};

use crate::error::ConfigError;
use crate::paths::Environment;

/// File name of the sync specification.
pub const CONFIG_FILE_NAME: &str = "opsync.json";

/// Candidate locations, highest priority first: project root, the project's
/// opencode subdirectory, the project's generic config subdirectory, then
/// three global locations under the home directory.
fn candidates(env: &Environment) -> [PathBuf; 6] {
    [
        env.cwd.join(CONFIG_FILE_NAME),
        env.cwd.join(".opencode").join(CONFIG_FILE_NAME),
        env.cwd.join(".config").join(CONFIG_FILE_NAME),
        env.home.join(".config").join("opencode").join(CONFIG_FILE_NAME),
        env.home.join(".config").join(CONFIG_FILE_NAME),
        env.home.join(".opencode").join(CONFIG_FILE_NAME),
    ]
}

/// Locate the sync specification file.
///
/// An explicit path is returned only if it exists; discovery never falls
/// back to the search list when an explicit path was given. Otherwise the
/// fixed candidate list is probed in priority order and the first existing
/// file wins.
#[must_use]
pub fn find_config_file(env: &Environment, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    candidates(env).into_iter().find(|p| p.exists())
}

/// Parse the specification file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not a valid JSON(C) document of the
/// expected shape.
pub fn load(path: &Path) -> Result<SyncConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let stripped = jsonc::strip_comments(&raw);
    serde_json::from_str(&stripped).map_err(|e| ConfigError::Parse {
        file: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Discover and parse the specification in one step.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when no file is discoverable, plus any
/// error [`load`] can produce.
pub fn discover_and_load(
    env: &Environment,
    explicit: Option<&Path>,
) -> Result<(PathBuf, SyncConfig), ConfigError> {
    let path = find_config_file(env, explicit).ok_or(ConfigError::NotFound)?;
    let config = load(&path)?;
    Ok((path, config))
}
