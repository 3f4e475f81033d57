//! Staging tree construction and bundle orchestration.
//!
//! A bundle is built in a uniquely named scratch directory: collected files
//! are copied into category subdirectories, the merge engine optionally
//! contributes a generated configuration file, a manifest is written at the
//! staging root, and the whole tree is archived and base64-encoded for
//! transport. The scratch directory is removed on every exit path.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};

use super::archive::Archiver;
use super::collect::collect_bundle_files;
use super::manifest::{BundleManifest, MANIFEST_FILE_NAME, MERGED_CONFIG_FILE_NAME};
use crate::config::{ResolvedTarget, jsonc};
use crate::error::BundleError;
use crate::logging::Log;
use crate::merge::build_merged_config;
use crate::paths::{self, Category, Environment};

/// A built bundle, ready for transport.
#[derive(Debug)]
pub struct BuiltBundle {
    /// Base64-encoded gzip tar archive.
    pub payload: String,
    /// The manifest that was written into the archive.
    pub manifest: BundleManifest,
}

/// Stage every file implied by `target` into `dir` and write the manifest.
///
/// Category subdirectories are created up front. Duplicate destination
/// paths follow a last-write-wins policy at staging time, while the
/// manifest keeps every entry in collection order.
///
/// # Errors
///
/// Returns [`BundleError::Staging`] when a collected file cannot be copied
/// and [`BundleError::Manifest`] when the manifest cannot be written.
pub fn create_bundle_directory(
    target: &ResolvedTarget,
    env: &Environment,
    log: &dyn Log,
    dir: &Path,
) -> Result<BundleManifest, BundleError> {
    for category in [Category::Config, Category::Data, Category::Root] {
        let path = dir.join(category.dir_name());
        std::fs::create_dir_all(&path).map_err(|source| BundleError::Staging {
            path: path.clone(),
            source,
        })?;
    }

    let mut manifest = BundleManifest::new(&target.name, target.spec.config.name());

    for file in collect_bundle_files(target, env, log) {
        let staged = dir.join(file.category.dir_name()).join(&file.dest);
        if let Some(parent) = staged.parent() {
            std::fs::create_dir_all(parent).map_err(|source| BundleError::Staging {
                path: staged.clone(),
                source,
            })?;
        }
        std::fs::copy(&file.source, &staged).map_err(|source| BundleError::Staging {
            path: staged.clone(),
            source,
        })?;
        log.debug(&format!(
            "staged {} -> {}/{}",
            file.source.display(),
            file.category,
            file.dest.display()
        ));
        manifest.push(file.dest.to_string_lossy().replace('\\', "/"), file.category);
    }

    if let Some(merged) = build_merged_config(
        &load_local_config(env, log),
        None,
        &target.spec.config,
    ) {
        let staged = dir
            .join(Category::Config.dir_name())
            .join(MERGED_CONFIG_FILE_NAME);
        let body = serde_json::to_string_pretty(&merged)
            .map_err(|e| BundleError::Manifest(std::io::Error::other(e)))?;
        std::fs::write(&staged, body).map_err(|source| BundleError::Staging {
            path: staged,
            source,
        })?;
        manifest.push(MERGED_CONFIG_FILE_NAME.to_string(), Category::Config);
        log.debug(&format!(
            "generated merged configuration ({} mode)",
            target.spec.config.name()
        ));
    }

    manifest
        .write_to(&dir.join(MANIFEST_FILE_NAME))
        .map_err(BundleError::Manifest)?;

    Ok(manifest)
}

/// Build the complete transportable bundle for `target`.
///
/// Orchestrates scratch-directory creation, staging, archiving, and base64
/// encoding. The scratch directory is a [`tempfile::TempDir`] and is
/// removed when it goes out of scope, on success and failure alike.
///
/// # Errors
///
/// Returns any staging error plus [`BundleError::Archive`] when the
/// external archiver fails.
pub fn create_bundle(
    target: &ResolvedTarget,
    env: &Environment,
    archiver: &dyn Archiver,
    log: &dyn Log,
) -> Result<BuiltBundle, BundleError> {
    let scratch = tempfile::Builder::new()
        .prefix(&format!("opsync-{}-", target.name))
        .tempdir()
        .map_err(|source| BundleError::Staging {
            path: std::env::temp_dir(),
            source,
        })?;

    let manifest = create_bundle_directory(target, env, log, scratch.path())?;
    let bytes = archiver.archive(scratch.path())?;

    Ok(BuiltBundle {
        payload: BASE64.encode(bytes),
        manifest,
    })
}

/// Read and parse the local `opencode.json`, tolerating comments.
///
/// A missing or unparseable file degrades to an empty object; the merge
/// engine then simply has nothing to draw from.
fn load_local_config(env: &Environment, log: &dyn Log) -> Value {
    let path = paths::opencode_config_file(env);
    let Ok(raw) = std::fs::read_to_string(&path) else {
        return json!({});
    };
    match serde_json::from_str(&jsonc::strip_comments(&raw)) {
        Ok(value) => value,
        Err(e) => {
            log.warn(&format!(
                "cannot parse {}: {e}; treating as empty",
                path.display()
            ));
            json!({})
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::logging::MemoryLog;
    use crate::paths::Category;

    fn target_with(spec_json: &str) -> ResolvedTarget {
        let config: SyncConfig = serde_json::from_str(&format!(
            r#"{{"targets": {{"ci": {{"repo": "acme/app", {spec_json}}}}}}}"#
        ))
        .expect("valid test spec");
        crate::config::resolve_target("ci", &config).expect("resolvable target")
    }

    fn test_env() -> (tempfile::TempDir, Environment) {
        let tmp = tempfile::tempdir().unwrap();
        let env = Environment::new(tmp.path().join("home"), tmp.path().join("project"));
        std::fs::create_dir_all(&env.cwd).unwrap();
        (tmp, env)
    }

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn staging_partitions_by_category() {
        let (_tmp, env) = test_env();
        write(&paths::auth_file(&env), r#"{"token": "t"}"#);
        write(&paths::accounts_file(&env), r#"{"acct": 1}"#);

        let target = target_with(
            r#""auth": {"credentials": true, "presets": ["antigravity-accounts"]}"#,
        );
        let log = MemoryLog::new();
        let staging = tempfile::tempdir().unwrap();
        let manifest = create_bundle_directory(&target, &env, &log, staging.path()).unwrap();

        assert!(staging.path().join("data/auth.json").is_file());
        assert!(
            staging
                .path()
                .join("config/antigravity-accounts.json")
                .is_file()
        );
        assert!(staging.path().join(MANIFEST_FILE_NAME).is_file());
        assert_eq!(manifest.files.len(), 2);
    }

    #[test]
    fn none_mode_emits_no_config_file() {
        let (_tmp, env) = test_env();
        let target = target_with(r#""auth": {"credentials": false}"#);
        let log = MemoryLog::new();
        let staging = tempfile::tempdir().unwrap();
        let manifest = create_bundle_directory(&target, &env, &log, staging.path()).unwrap();

        assert!(!staging.path().join("config/opencode.json").exists());
        assert!(manifest.files.is_empty());
        assert_eq!(manifest.config_mode, "none");
    }

    #[test]
    fn full_mode_ships_local_config_verbatim() {
        let (_tmp, env) = test_env();
        write(
            &paths::opencode_config_file(&env),
            r#"{"model": "anthropic/claude", "theme": "dark"}"#,
        );

        let target = target_with(r#""auth": {"credentials": false}, "config": {"mode": "full"}"#);
        let log = MemoryLog::new();
        let staging = tempfile::tempdir().unwrap();
        let manifest = create_bundle_directory(&target, &env, &log, staging.path()).unwrap();

        let staged = staging.path().join("config").join(MERGED_CONFIG_FILE_NAME);
        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(staged).unwrap()).unwrap();
        assert_eq!(value.get("theme").unwrap(), "dark");
        assert_eq!(
            manifest.files,
            vec![super::super::manifest::ManifestEntry {
                path: MERGED_CONFIG_FILE_NAME.to_string(),
                relative_to: Category::Config,
            }]
        );
    }

    #[test]
    fn merge_mode_draws_providers_from_local_config() {
        let (_tmp, env) = test_env();
        write(
            &paths::opencode_config_file(&env),
            r#"{"provider": {"anthropic": {"apiKey": "k"}}}"#,
        );

        let target = target_with(
            r#""auth": {"credentials": false},
               "config": {"mode": "merge", "plugins": ["p@1"], "providers": {"anthropic": true}}"#,
        );
        let log = MemoryLog::new();
        let staging = tempfile::tempdir().unwrap();
        create_bundle_directory(&target, &env, &log, staging.path()).unwrap();

        let staged = staging.path().join("config").join(MERGED_CONFIG_FILE_NAME);
        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(staged).unwrap()).unwrap();
        assert_eq!(value.get("plugin").unwrap(), &json!(["p@1"]));
        assert_eq!(
            value.get("provider").unwrap().get("anthropic").unwrap(),
            &json!({"apiKey": "k"})
        );
    }

    #[test]
    fn last_write_wins_on_duplicate_destinations() {
        let (_tmp, env) = test_env();
        // The whole config dir stages opencode.json, then merge mode
        // regenerates it; the generated file must win.
        write(&paths::opencode_config_file(&env), r#"{"model": "local"}"#);

        let target = target_with(
            r#""auth": {"credentials": false},
               "opencodeConfigDir": true,
               "config": {"mode": "merge", "model": "generated"}"#,
        );
        let log = MemoryLog::new();
        let staging = tempfile::tempdir().unwrap();
        let manifest = create_bundle_directory(&target, &env, &log, staging.path()).unwrap();

        let staged = staging.path().join("config").join(MERGED_CONFIG_FILE_NAME);
        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(staged).unwrap()).unwrap();
        assert_eq!(value.get("model").unwrap(), "generated");
        // Both entries remain in the manifest.
        let count = manifest
            .files
            .iter()
            .filter(|e| e.path == MERGED_CONFIG_FILE_NAME)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn create_bundle_encodes_base64_and_cleans_up() {
        let (_tmp, env) = test_env();
        write(&paths::auth_file(&env), "{}");

        let target = target_with(r#""auth": {"credentials": true}"#);
        let log = MemoryLog::new();
        let before: Vec<_> = scratch_dirs();
        let bundle =
            create_bundle(&target, &env, &super::super::archive::TarArchiver, &log).unwrap();
        assert!(BASE64.decode(&bundle.payload).is_ok());
        assert_eq!(bundle.manifest.files.len(), 1);
        // No opsync scratch directory survives the call.
        assert_eq!(scratch_dirs(), before);
    }

    fn scratch_dirs() -> Vec<std::path::PathBuf> {
        let mut dirs: Vec<_> = std::fs::read_dir(std::env::temp_dir())
            .map(|rd| {
                rd.filter_map(|e| e.ok().map(|e| e.path()))
                    .filter(|p| {
                        p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.starts_with("opsync-ci-"))
                    })
                    .collect()
            })
            .unwrap_or_default();
        dirs.sort();
        dirs
    }
}
