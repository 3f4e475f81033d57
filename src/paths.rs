//! Canonical filesystem locations for the local opencode installation.
//!
//! Every function here is a pure mapping from an [`Environment`] (home
//! directory + working directory) to an absolute path.  Nothing in this
//! module touches the filesystem; existence checks belong to callers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Explicit process environment threaded into all path-resolving logic.
///
/// Constructed once per invocation via [`Environment::detect`] so that pure
/// code never reads ambient process state (`$HOME`, the current directory)
/// on its own.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The user's home directory.
    pub home: PathBuf,
    /// The invocation's working directory.
    pub cwd: PathBuf,
}

impl Environment {
    /// Create an environment from explicit paths.
    #[must_use]
    pub fn new(home: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            cwd: cwd.into(),
        }
    }

    /// Detect the environment from the running process.
    ///
    /// # Errors
    ///
    /// Returns an error if the HOME (or USERPROFILE on Windows) environment
    /// variable is not set, or the current directory cannot be determined.
    pub fn detect() -> anyhow::Result<Self> {
        let home = if cfg!(target_os = "windows") {
            std::env::var("USERPROFILE")
                .or_else(|_| std::env::var("HOME"))
                .map_err(|_| {
                    anyhow::anyhow!("neither USERPROFILE nor HOME environment variable is set")
                })?
        } else {
            std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?
        };
        let cwd = std::env::current_dir()?;
        Ok(Self {
            home: PathBuf::from(home),
            cwd,
        })
    }
}

/// The local root a bundled file is staged under and restored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Files under the opencode configuration root (`~/.config/opencode`).
    Config,
    /// Files under the opencode data root (`~/.local/share/opencode`).
    Data,
    /// Project-local files, relative to the invocation's working directory.
    Root,
}

impl Category {
    /// Directory name used for this category inside a staging tree.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Data => "data",
            Self::Root => "root",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// The opencode configuration root: `~/.config/opencode`.
#[must_use]
pub fn config_root(env: &Environment) -> PathBuf {
    env.home.join(".config").join("opencode")
}

/// The opencode data root: `~/.local/share/opencode`.
#[must_use]
pub fn data_root(env: &Environment) -> PathBuf {
    env.home.join(".local").join("share").join("opencode")
}

/// The local root a category's files live under.
#[must_use]
pub fn category_root(env: &Environment, category: Category) -> PathBuf {
    match category {
        Category::Config => config_root(env),
        Category::Data => data_root(env),
        Category::Root => env.cwd.clone(),
    }
}

/// Basename of the auth file in the data root.
pub const AUTH_FILE_NAME: &str = "auth.json";

/// Basename of the session-state file in the data root.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Basename of the pre-`auth.json` credentials file in the configuration root.
pub const LEGACY_CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Basename of the antigravity accounts file in the configuration root.
pub const ACCOUNTS_FILE_NAME: &str = "antigravity-accounts.json";

/// The antigravity accounts file inside the configuration root.
#[must_use]
pub fn accounts_file(env: &Environment) -> PathBuf {
    config_root(env).join(ACCOUNTS_FILE_NAME)
}

/// The auth file inside the data root.
#[must_use]
pub fn auth_file(env: &Environment) -> PathBuf {
    data_root(env).join(AUTH_FILE_NAME)
}

/// The session-state file inside the data root.
#[must_use]
pub fn session_file(env: &Environment) -> PathBuf {
    data_root(env).join(SESSION_FILE_NAME)
}

/// The credentials file at its legacy location inside the configuration
/// root, predating `auth.json`.
#[must_use]
pub fn legacy_credentials_file(env: &Environment) -> PathBuf {
    config_root(env).join(LEGACY_CREDENTIALS_FILE_NAME)
}

/// The tool's own merged configuration file, `opencode.json`.
#[must_use]
pub fn opencode_config_file(env: &Environment) -> PathBuf {
    config_root(env).join("opencode.json")
}

/// Project-local directory holding agent definitions.
#[must_use]
pub fn agents_dir(env: &Environment) -> PathBuf {
    project_dir(&env.cwd, "agents")
}

/// Project-local directory holding skill subdirectories.
#[must_use]
pub fn skills_dir(env: &Environment) -> PathBuf {
    project_dir(&env.cwd, "skills")
}

/// Project-local directory holding command definitions.
#[must_use]
pub fn commands_dir(env: &Environment) -> PathBuf {
    project_dir(&env.cwd, "commands")
}

fn project_dir(cwd: &Path, name: &str) -> PathBuf {
    cwd.join(".opencode").join(name)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::new("/home/u", "/work/project")
    }

    #[test]
    fn config_root_is_under_dot_config() {
        assert_eq!(
            config_root(&env()),
            PathBuf::from("/home/u/.config/opencode")
        );
    }

    #[test]
    fn data_root_is_under_local_share() {
        assert_eq!(
            data_root(&env()),
            PathBuf::from("/home/u/.local/share/opencode")
        );
    }

    #[test]
    fn category_roots_map_to_expected_locations() {
        let e = env();
        assert_eq!(category_root(&e, Category::Config), config_root(&e));
        assert_eq!(category_root(&e, Category::Data), data_root(&e));
        assert_eq!(category_root(&e, Category::Root), e.cwd);
    }

    #[test]
    fn named_files_resolve_against_their_roots() {
        let e = env();
        assert_eq!(accounts_file(&e), config_root(&e).join("antigravity-accounts.json"));
        assert_eq!(auth_file(&e), data_root(&e).join("auth.json"));
        assert_eq!(session_file(&e), data_root(&e).join("session.json"));
        assert_eq!(
            legacy_credentials_file(&e),
            config_root(&e).join("credentials.json")
        );
        assert_eq!(opencode_config_file(&e), config_root(&e).join("opencode.json"));
    }

    #[test]
    fn project_dirs_are_under_dot_opencode() {
        let e = env();
        assert_eq!(agents_dir(&e), PathBuf::from("/work/project/.opencode/agents"));
        assert_eq!(skills_dir(&e), PathBuf::from("/work/project/.opencode/skills"));
        assert_eq!(
            commands_dir(&e),
            PathBuf::from("/work/project/.opencode/commands")
        );
    }

    #[test]
    fn category_serde_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Category::Config).unwrap(), "\"config\"");
        assert_eq!(serde_json::to_string(&Category::Data).unwrap(), "\"data\"");
        assert_eq!(serde_json::to_string(&Category::Root).unwrap(), "\"root\"");
        let cat: Category = serde_json::from_str("\"data\"").unwrap();
        assert_eq!(cat, Category::Data);
    }
}
