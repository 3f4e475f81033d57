//! Command: list the targets declared in the sync specification.

use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::resolve_all_targets;
use crate::logging::Logger;

/// Print every declared target with its resolved coordinates.
///
/// # Errors
///
/// Returns an error if the specification cannot be loaded.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let targets = resolve_all_targets(&setup.config);

    if targets.is_empty() {
        log.warn("no targets declared");
        return Ok(());
    }

    for target in targets {
        println!(
            "{}  repo={} env={} secret={} config={}",
            target.name,
            target.repo,
            target.environment,
            target.secret,
            target.spec.config.name()
        );
    }
    Ok(())
}
