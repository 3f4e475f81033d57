//! Command: build bundles and push them to the secret store.

use anyhow::Result;

use super::CommandSetup;
use crate::bundle::{self, Archiver};
use crate::cli::{GlobalOpts, SyncOpts};
use crate::config::{ResolvedTarget, resolve_all_targets, resolve_target};
use crate::error::ConfigError;
use crate::logging::{Logger, TaskStatus};
use crate::transport::SecretStore;

/// Run the sync command.
///
/// Each target is processed independently: one target's failure is recorded
/// in the summary and does not stop the others. The command only fails
/// after every target has been attempted.
///
/// # Errors
///
/// Returns an error if the specification cannot be loaded, a requested
/// target is not declared, or any target failed to sync.
pub fn run(
    global: &GlobalOpts,
    opts: &SyncOpts,
    store: &dyn SecretStore,
    archiver: &dyn Archiver,
    log: &Logger,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    let targets: Vec<ResolvedTarget> = match &opts.target {
        Some(name) => {
            let target = resolve_target(name, &setup.config)
                .ok_or_else(|| ConfigError::UnknownTarget(name.clone()))?;
            vec![target]
        }
        None => resolve_all_targets(&setup.config),
    };
    if targets.is_empty() {
        log.warn("no targets declared; nothing to sync");
        return Ok(());
    }

    for target in &targets {
        sync_target(target, global, &setup, store, archiver, log);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} target(s) failed");
    }
    Ok(())
}

fn sync_target(
    target: &ResolvedTarget,
    global: &GlobalOpts,
    setup: &CommandSetup,
    store: &dyn SecretStore,
    archiver: &dyn Archiver,
    log: &Logger,
) {
    log.stage(&format!("Target {}", target.name));
    log.debug(&format!(
        "repo {}, environment {}, secret {}",
        target.repo, target.environment, target.secret
    ));

    let built = match bundle::create_bundle(target, &setup.env, archiver, log) {
        Ok(built) => built,
        Err(e) => {
            log.error(&format!("{}: {e}", target.name));
            log.record_task(&target.name, TaskStatus::Failed, Some(&e.to_string()));
            return;
        }
    };

    if built.manifest.files.is_empty() {
        log.record_task(&target.name, TaskStatus::Skipped, Some("nothing to bundle"));
        return;
    }

    log.info(&format!(
        "bundled {} file(s), payload {} bytes",
        built.manifest.files.len(),
        built.payload.len()
    ));

    if global.dry_run {
        log.dry_run(&format!(
            "would set secret {} in {}/{}",
            target.secret, target.repo, target.environment
        ));
        log.record_task(&target.name, TaskStatus::DryRun, None);
        return;
    }

    match store.put_secret(
        &target.repo,
        &target.environment,
        &target.secret,
        &built.payload,
    ) {
        Ok(()) => {
            log.info(&format!(
                "secret {} updated in {}/{}",
                target.secret, target.repo, target.environment
            ));
            log.record_task(&target.name, TaskStatus::Ok, None);
        }
        Err(e) => {
            log.error(&format!("{}: {e}", target.name));
            log.record_task(&target.name, TaskStatus::Failed, Some(&e.to_string()));
        }
    }
}
