//! Target resolution: layering built-in defaults, declared defaults, and
//! per-target overrides into a fully-populated specification.
//!
//! Layering happens on the JSON representation of each layer (objects merge
//! key-by-key, scalars and arrays replace) and the merged document is then
//! deserialized into [`ResolvedSpec`], so declaring a single `auth` toggle
//! at the target level never erases toggles inherited from the defaults.

use serde_json::{Value, json};

use super::types::{ResolvedSpec, ResolvedTarget, SyncConfig, SyncSpecification};
use crate::merge::deep_merge;

/// Secret name used when a target does not declare one.
pub const DEFAULT_SECRET_NAME: &str = "OPENCODE_BUNDLE";

/// Built-in bottom layer: credentials on, everything else off.
fn builtin_defaults() -> Value {
    json!({
        "auth": { "credentials": true },
        "config": { "mode": "none" },
        "agents": false,
        "skills": false,
        "commands": false,
        "opencodeConfigDir": false,
        "opencodeDataDir": false,
        "include": []
    })
}

fn spec_layer(spec: &SyncSpecification) -> Value {
    serde_json::to_value(spec).unwrap_or_else(|_| json!({}))
}

/// Resolve a single target by name.
///
/// Returns `None` when `name` is not declared in `config.targets`. The
/// environment name defaults to the target name and the secret name to
/// [`DEFAULT_SECRET_NAME`] when the declaration omits them.
#[must_use]
pub fn resolve_target(name: &str, config: &SyncConfig) -> Option<ResolvedTarget> {
    let def = config.targets.get(name)?;

    let mut layered = builtin_defaults();
    if let Some(defaults) = &config.defaults {
        deep_merge(&mut layered, &spec_layer(defaults));
    }
    deep_merge(&mut layered, &spec_layer(&def.spec));

    let spec: ResolvedSpec = serde_json::from_value(layered).ok()?;

    Some(ResolvedTarget {
        name: name.to_string(),
        repo: def.repo.clone(),
        environment: def
            .environment
            .clone()
            .unwrap_or_else(|| name.to_string()),
        secret: def
            .secret
            .clone()
            .unwrap_or_else(|| DEFAULT_SECRET_NAME.to_string()),
        spec,
    })
}

/// Resolve every declared target, in name order.
///
/// A target that fails to resolve is excluded from the result rather than
/// failing the whole list.
#[must_use]
pub fn resolve_all_targets(config: &SyncConfig) -> Vec<ResolvedTarget> {
    config
        .targets
        .keys()
        .filter_map(|name| resolve_target(name, config))
        .collect()
}
