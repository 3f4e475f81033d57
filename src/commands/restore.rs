//! Command: restore a bundle payload into the local tree.

use std::io::Read as _;

use anyhow::{Context as _, Result};

use crate::bundle::{self, Archiver};
use crate::cli::{GlobalOpts, RestoreOpts};
use crate::logging::Logger;
use crate::paths::Environment;

/// Run the restore command.
///
/// The payload is read from `--input` when given, otherwise from standard
/// input, so the command composes with whatever delivered the secret
/// (`gh`, a CI environment variable, a file).
///
/// # Errors
///
/// Returns an error if the payload cannot be read, decoded, or extracted,
/// or if a manifest entry cannot be placed.
pub fn run(
    global: &GlobalOpts,
    opts: &RestoreOpts,
    archiver: &dyn Archiver,
    log: &Logger,
) -> Result<()> {
    let env = Environment::detect()?;

    log.stage("Reading payload");
    let payload = match &opts.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read payload from stdin")?;
            buf
        }
    };
    log.debug(&format!("payload: {} bytes", payload.trim().len()));

    if global.dry_run {
        log.dry_run("would decode and restore the bundle into the local tree");
        return Ok(());
    }

    log.stage("Restoring bundle");
    let summary = bundle::restore_bundle(&payload, &env, archiver, log)?;
    log.info(&format!(
        "restored {} file(s), skipped {}",
        summary.restored, summary.skipped
    ));
    Ok(())
}
