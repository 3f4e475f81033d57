//! Top-level subcommand orchestration.

pub mod restore;
pub mod sync;
pub mod targets;
pub mod version;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::{self, SyncConfig};
use crate::logging::Logger;
use crate::paths::Environment;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates environment detection and specification discovery so that
/// each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected home and working directories.
    pub env: Environment,
    /// Parsed sync specification.
    pub config: SyncConfig,
}

impl CommandSetup {
    /// Detect the environment and discover and parse the sync specification.
    ///
    /// # Errors
    ///
    /// Returns an error if no specification file is discoverable or the
    /// discovered file fails to parse.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let env = Environment::detect()?;

        log.stage("Loading sync specification");
        let (path, config) = config::discover_and_load(&env, global.config.as_deref())?;
        log.info(&format!("specification: {}", path.display()));
        log.debug(&format!("{} declared target(s)", config.targets.len()));

        Ok(Self { env, config })
    }
}
