//! Wire-format types for the declarative sync specification.
//!
//! The on-disk document is dynamically shaped JSON(C); everything here is the
//! strict structural form it is validated into at the loading boundary.
//! Internal logic only ever sees these types (or [`ResolvedSpec`], their
//! fully-populated counterpart).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed sync specification file: optional shared defaults plus a set of
/// named targets.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Defaults layered under every target's own settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<SyncSpecification>,
    /// Declared targets, keyed by name.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetDef>,
}

/// A single target declaration: where the bundle goes, plus per-target
/// overrides of the sync specification.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetDef {
    /// Repository identifier understood by the secret store (`owner/name`).
    pub repo: String,
    /// Environment name in the remote store; defaults to the target name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Secret name the payload is written under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Target-level overrides, merged key-by-key onto the defaults.
    #[serde(flatten)]
    pub spec: SyncSpecification,
}

/// Declares which files to sync. Every field is optional at this level; the
/// resolved form ([`ResolvedSpec`]) has every field populated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSpecification {
    /// Named boolean toggles plus an optional explicit preset list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSpec>,
    /// Partial patch of the configuration sync mode. Kept as raw JSON so a
    /// layer may set a single key (`{"model": "m"}`) without naming `mode`;
    /// validated into [`ConfigSyncMode`] only after all layers are merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    /// Sync Markdown agent definitions from the project agents directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<bool>,
    /// Sync per-skill `SKILL.md` files from the project skills directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<bool>,
    /// Sync Markdown command definitions from the project commands directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<bool>,
    /// Sync the entire opencode configuration directory tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opencode_config_dir: Option<bool>,
    /// Sync the entire opencode data directory tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opencode_data_dir: Option<bool>,
    /// Arbitrary extra files, resolved against the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<IncludeEntry>>,
}

/// Auth-file selection: per-preset boolean toggles plus an explicit list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthSpec {
    /// Explicitly named presets, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<String>,
    /// Per-preset boolean toggles (`"credentials": true`, …).
    #[serde(flatten)]
    pub toggles: BTreeMap<String, bool>,
}

impl AuthSpec {
    /// Every preset name enabled by this spec: toggles set to `true` first,
    /// then the explicit list, first occurrence winning on duplicates.
    #[must_use]
    pub fn enabled_presets(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for (name, on) in &self.toggles {
            if *on && !out.iter().any(|n| n == name) {
                out.push(name.clone());
            }
        }
        for name in &self.presets {
            if !out.iter().any(|n| n == name) {
                out.push(name.clone());
            }
        }
        out
    }
}

/// How the opencode configuration object ships inside a bundle.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ConfigSyncMode {
    /// No configuration file is emitted at all.
    None,
    /// The entire local configuration object is emitted verbatim.
    Full,
    /// A new object is synthesized from the merge specification.
    Merge(MergeSpec),
}

impl ConfigSyncMode {
    /// The wire name of this mode, as recorded in the bundle manifest.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Full => "full",
            Self::Merge(_) => "merge",
        }
    }
}

/// Inputs for `mode = merge`: plugins, providers, model override, and a
/// free-form deep-merge fragment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MergeSpec {
    /// Plugin entries (`name` or `name@version`) merged by base identity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
    /// Per-provider merge instructions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<String, ProviderSpec>,
    /// Overwrites the result's `model` field outright when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Deep-merged onto the result last; highest precedence of all inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// Instructions for a single provider block.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ProviderSpec {
    /// `true` copies the whole block from the source config; `false` skips.
    Toggle(bool),
    /// Deep-merged over the source's block; these values win on conflict.
    Overrides(serde_json::Map<String, Value>),
}

/// One `include` entry: either a bare relative path or a rename pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IncludeEntry {
    /// Same relative path is used as both source and destination.
    Path(String),
    /// Source and destination differ.
    Renamed {
        /// Path of the file to include, relative to the working directory.
        source: String,
        /// Bundle-relative destination path.
        dest: String,
    },
}

impl IncludeEntry {
    /// The source path, relative to the invocation's working directory.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Path(p) => p,
            Self::Renamed { source, .. } => source,
        }
    }

    /// The bundle-relative destination path.
    #[must_use]
    pub fn dest(&self) -> &str {
        match self {
            Self::Path(p) => p,
            Self::Renamed { dest, .. } => dest,
        }
    }
}

/// A sync specification with every field populated; no optionals remain.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSpec {
    /// Fully layered auth toggles and preset list.
    pub auth: AuthSpec,
    /// Effective configuration sync mode.
    pub config: ConfigSyncMode,
    /// Whether to collect project agent definitions.
    pub agents: bool,
    /// Whether to collect project skills.
    pub skills: bool,
    /// Whether to collect project command definitions.
    pub commands: bool,
    /// Whether to stage the whole opencode configuration directory.
    pub opencode_config_dir: bool,
    /// Whether to stage the whole opencode data directory.
    pub opencode_data_dir: bool,
    /// Effective include list.
    pub include: Vec<IncludeEntry>,
}

/// A target ready to sync: destination coordinates plus a fully-populated
/// specification. Recomputed fresh on every invocation, never persisted.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// Target name as declared in the specification file.
    pub name: String,
    /// Repository identifier for the secret store.
    pub repo: String,
    /// Remote environment name.
    pub environment: String,
    /// Secret name the payload is written under.
    pub secret: String,
    /// The fully-populated sync specification.
    pub spec: ResolvedSpec,
}
