//! Configuration merge engine.
//!
//! Given the local opencode configuration, an optional destination-side
//! configuration, and a [`ConfigSyncMode`], produces the configuration
//! object that ships inside a bundle. Three modes:
//!
//! - `none`: nothing is emitted.
//! - `full`: the source object passes through unchanged.
//! - `merge`: a new object is synthesized: plugin list merged by base
//!   identity, provider blocks copied or deep-merged, model overridden,
//!   and the `extra` fragment deep-merged last.
//!
//! All functions are pure: inputs are never mutated.

use serde_json::{Map, Value};

use crate::config::types::{ConfigSyncMode, MergeSpec, ProviderSpec};

/// Build the configuration object to ship inside a bundle.
///
/// Returns `None` for `mode = none` (emit no configuration file at all), the
/// source unchanged for `mode = full`, and the synthesized merge result for
/// `mode = merge`.
#[must_use]
pub fn build_merged_config(
    source: &Value,
    destination: Option<&Value>,
    mode: &ConfigSyncMode,
) -> Option<Value> {
    match mode {
        ConfigSyncMode::None => None,
        ConfigSyncMode::Full => Some(source.clone()),
        ConfigSyncMode::Merge(spec) => Some(merge_config(source, destination, spec)),
    }
}

fn merge_config(source: &Value, destination: Option<&Value>, spec: &MergeSpec) -> Value {
    let mut result = destination.cloned().unwrap_or_else(|| Value::Object(Map::new()));
    if !result.is_object() {
        result = Value::Object(Map::new());
    }

    if !spec.plugins.is_empty() {
        merge_plugins(&mut result, &spec.plugins);
    }

    for (name, provider_spec) in &spec.providers {
        merge_provider(&mut result, source, name, provider_spec);
    }

    if let Some(model) = &spec.model
        && let Some(obj) = result.as_object_mut()
    {
        obj.insert("model".to_string(), Value::String(model.clone()));
    }

    if let Some(extra) = &spec.extra {
        deep_merge(&mut result, extra);
    }

    result
}

/// Merge plugin entries into the result's `plugin` list by base identity.
///
/// An entry whose base identity (the substring before an `@version` suffix)
/// matches an existing entry replaces it *in place*, preserving position; a
/// new identity is appended. There is no semantic version comparison; the
/// incoming entry always wins.
fn merge_plugins(result: &mut Value, plugins: &[String]) {
    let Some(obj) = result.as_object_mut() else {
        return;
    };
    let list = obj
        .entry("plugin")
        .or_insert_with(|| Value::Array(Vec::new()));
    let Some(entries) = list.as_array_mut() else {
        return;
    };

    for incoming in plugins {
        let base = plugin_base(incoming);
        let existing = entries
            .iter_mut()
            .find(|e| e.as_str().is_some_and(|s| plugin_base(s) == base));
        match existing {
            Some(slot) => *slot = Value::String(incoming.clone()),
            None => entries.push(Value::String(incoming.clone())),
        }
    }
}

/// The identity of a plugin entry: everything before the `@version` suffix.
///
/// A leading `@` (scoped package names) is not treated as a version
/// separator, so `@scope/pkg@1.0` and `@scope/pkg@2.0` share an identity.
fn plugin_base(entry: &str) -> &str {
    match entry.rfind('@') {
        Some(idx) if idx > 0 => entry.get(..idx).unwrap_or(entry),
        _ => entry,
    }
}

fn merge_provider(result: &mut Value, source: &Value, name: &str, spec: &ProviderSpec) {
    let source_block = source
        .get("provider")
        .and_then(|p| p.get(name))
        .cloned();

    match spec {
        ProviderSpec::Toggle(false) => {}
        ProviderSpec::Toggle(true) => {
            // Copy the entire block from the source, overwriting entirely.
            if let Some(block) = source_block {
                provider_slot(result, name, |slot| *slot = block);
            }
        }
        ProviderSpec::Overrides(overrides) => {
            let incoming = Value::Object(overrides.clone());
            provider_slot(result, name, |slot| {
                // Source fills unspecified values first; declared overrides win.
                if let Some(block) = &source_block {
                    deep_merge(slot, block);
                }
                deep_merge(slot, &incoming);
            });
        }
    }
}

/// Run `f` on the result's block for `name` under `provider`, creating the
/// intervening objects as needed.
fn provider_slot(result: &mut Value, name: &str, f: impl FnOnce(&mut Value)) {
    let Some(obj) = result.as_object_mut() else {
        return;
    };
    let providers = obj
        .entry("provider")
        .or_insert_with(|| Value::Object(Map::new()));
    if !providers.is_object() {
        *providers = Value::Object(Map::new());
    }
    if let Some(map) = providers.as_object_mut() {
        let slot = map
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        f(slot);
    }
}

/// Type-aware deep merge of `incoming` onto `base`.
///
/// Recurses only where both sides are JSON objects; any other pairing
/// (arrays included) replaces the base value wholesale; arrays are never
/// concatenated or element-merged.
pub fn deep_merge(base: &mut Value, incoming: &Value) {
    if let (Value::Object(base_map), Value::Object(incoming_map)) = (&mut *base, incoming) {
        for (key, value) in incoming_map {
            match base_map.get_mut(key) {
                Some(slot) if slot.is_object() && value.is_object() => deep_merge(slot, value),
                Some(slot) => *slot = value.clone(),
                None => {
                    base_map.insert(key.clone(), value.clone());
                }
            }
        }
    } else {
        *base = incoming.clone();
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merge_mode(spec: MergeSpec) -> ConfigSyncMode {
        ConfigSyncMode::Merge(spec)
    }

    // -----------------------------------------------------------------------
    // Modes
    // -----------------------------------------------------------------------

    #[test]
    fn none_mode_emits_nothing() {
        let source = json!({"model": "x", "plugin": ["a"]});
        assert_eq!(build_merged_config(&source, None, &ConfigSyncMode::None), None);
    }

    #[test]
    fn full_mode_is_identity() {
        let source = json!({
            "model": "anthropic/claude",
            "plugin": ["a@1"],
            "provider": {"anthropic": {"apiKey": "k"}}
        });
        let out = build_merged_config(&source, None, &ConfigSyncMode::Full).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn full_mode_ignores_destination() {
        let source = json!({"model": "a"});
        let dest = json!({"model": "b", "theme": "dark"});
        let out = build_merged_config(&source, Some(&dest), &ConfigSyncMode::Full).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn merge_mode_starts_from_destination() {
        let source = json!({});
        let dest = json!({"theme": "dark"});
        let out = build_merged_config(&source, Some(&dest), &merge_mode(MergeSpec::default()))
            .unwrap();
        assert_eq!(out, dest);
    }

    #[test]
    fn merge_mode_with_no_destination_starts_empty() {
        let out = build_merged_config(&json!({}), None, &merge_mode(MergeSpec::default())).unwrap();
        assert_eq!(out, json!({}));
    }

    // -----------------------------------------------------------------------
    // Plugin merge
    // -----------------------------------------------------------------------

    #[test]
    fn plugin_merge_is_idempotent() {
        let dest = json!({"plugin": ["a@1"]});
        let spec = MergeSpec {
            plugins: vec!["a@1".to_string()],
            ..MergeSpec::default()
        };
        let out = build_merged_config(&json!({}), Some(&dest), &merge_mode(spec)).unwrap();
        assert_eq!(out.get("plugin").unwrap(), &json!(["a@1"]));
    }

    #[test]
    fn plugin_version_replaced_in_place() {
        let dest = json!({"plugin": ["a@1", "b@1"]});
        let spec = MergeSpec {
            plugins: vec!["a@2".to_string()],
            ..MergeSpec::default()
        };
        let out = build_merged_config(&json!({}), Some(&dest), &merge_mode(spec)).unwrap();
        assert_eq!(out.get("plugin").unwrap(), &json!(["a@2", "b@1"]));
    }

    #[test]
    fn plugin_new_identity_appended() {
        let dest = json!({"plugin": ["a@1"]});
        let spec = MergeSpec {
            plugins: vec!["c".to_string()],
            ..MergeSpec::default()
        };
        let out = build_merged_config(&json!({}), Some(&dest), &merge_mode(spec)).unwrap();
        assert_eq!(out.get("plugin").unwrap(), &json!(["a@1", "c"]));
    }

    #[test]
    fn plugin_downgrade_still_wins() {
        // No semantic version comparison: the incoming entry always replaces.
        let dest = json!({"plugin": ["a@2.0"]});
        let spec = MergeSpec {
            plugins: vec!["a@1.0".to_string()],
            ..MergeSpec::default()
        };
        let out = build_merged_config(&json!({}), Some(&dest), &merge_mode(spec)).unwrap();
        assert_eq!(out.get("plugin").unwrap(), &json!(["a@1.0"]));
    }

    #[test]
    fn plugin_base_identity_ignores_leading_at() {
        assert_eq!(plugin_base("foo@1.0"), "foo");
        assert_eq!(plugin_base("foo"), "foo");
        assert_eq!(plugin_base("@scope/pkg@2"), "@scope/pkg");
        assert_eq!(plugin_base("@scope/pkg"), "@scope/pkg");
    }

    #[test]
    fn plugin_list_created_when_destination_lacks_one() {
        let spec = MergeSpec {
            plugins: vec!["a@1".to_string()],
            ..MergeSpec::default()
        };
        let out = build_merged_config(&json!({}), None, &merge_mode(spec)).unwrap();
        assert_eq!(out.get("plugin").unwrap(), &json!(["a@1"]));
    }

    // -----------------------------------------------------------------------
    // Provider merge
    // -----------------------------------------------------------------------

    #[test]
    fn provider_true_copies_whole_block() {
        let source = json!({"provider": {"anthropic": {"apiKey": "k", "options": {"x": 1}}}});
        let dest = json!({"provider": {"anthropic": {"stale": true}}});
        let mut providers = std::collections::BTreeMap::new();
        providers.insert("anthropic".to_string(), ProviderSpec::Toggle(true));
        let spec = MergeSpec {
            providers,
            ..MergeSpec::default()
        };
        let out = build_merged_config(&source, Some(&dest), &merge_mode(spec)).unwrap();
        // Overwritten entirely; the stale key is gone.
        assert_eq!(
            out.get("provider").unwrap().get("anthropic").unwrap(),
            &json!({"apiKey": "k", "options": {"x": 1}})
        );
    }

    #[test]
    fn provider_true_with_missing_source_block_copies_nothing() {
        let mut providers = std::collections::BTreeMap::new();
        providers.insert("openai".to_string(), ProviderSpec::Toggle(true));
        let spec = MergeSpec {
            providers,
            ..MergeSpec::default()
        };
        let out = build_merged_config(&json!({}), None, &merge_mode(spec)).unwrap();
        assert!(out.get("provider").is_none());
    }

    #[test]
    fn provider_overrides_layer_source_then_spec() {
        let source = json!({"provider": {"anthropic": {"apiKey": "from-source", "timeout": 30}}});
        let dest = json!({"provider": {"anthropic": {"region": "eu"}}});
        let mut providers = std::collections::BTreeMap::new();
        let overrides = match json!({"apiKey": "from-spec"}) {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        };
        providers.insert("anthropic".to_string(), ProviderSpec::Overrides(overrides));
        let spec = MergeSpec {
            providers,
            ..MergeSpec::default()
        };
        let out = build_merged_config(&source, Some(&dest), &merge_mode(spec)).unwrap();
        let block = out.get("provider").unwrap().get("anthropic").unwrap();
        // Existing destination value survives, source fills, spec wins.
        assert_eq!(block.get("region").unwrap(), "eu");
        assert_eq!(block.get("timeout").unwrap(), 30);
        assert_eq!(block.get("apiKey").unwrap(), "from-spec");
    }

    #[test]
    fn provider_false_is_skipped() {
        let source = json!({"provider": {"anthropic": {"apiKey": "k"}}});
        let mut providers = std::collections::BTreeMap::new();
        providers.insert("anthropic".to_string(), ProviderSpec::Toggle(false));
        let spec = MergeSpec {
            providers,
            ..MergeSpec::default()
        };
        let out = build_merged_config(&source, None, &merge_mode(spec)).unwrap();
        assert!(out.get("provider").is_none());
    }

    // -----------------------------------------------------------------------
    // Model + extra
    // -----------------------------------------------------------------------

    #[test]
    fn model_override_is_outright() {
        let dest = json!({"model": "old/model"});
        let spec = MergeSpec {
            model: Some("new/model".to_string()),
            ..MergeSpec::default()
        };
        let out = build_merged_config(&json!({}), Some(&dest), &merge_mode(spec)).unwrap();
        assert_eq!(out.get("model").unwrap(), "new/model");
    }

    #[test]
    fn extra_has_highest_precedence() {
        let source = json!({"provider": {"x": {"a": 1}}});
        let mut providers = std::collections::BTreeMap::new();
        providers.insert("x".to_string(), ProviderSpec::Toggle(true));
        let spec = MergeSpec {
            providers,
            model: Some("m1".to_string()),
            extra: Some(json!({"model": "m2", "provider": {"x": {"a": 9}}})),
            ..MergeSpec::default()
        };
        let out = build_merged_config(&source, None, &merge_mode(spec)).unwrap();
        assert_eq!(out.get("model").unwrap(), "m2");
        assert_eq!(
            out.get("provider").unwrap().get("x").unwrap().get("a").unwrap(),
            9
        );
    }

    // -----------------------------------------------------------------------
    // Deep merge
    // -----------------------------------------------------------------------

    #[test]
    fn deep_merge_recurses_into_objects() {
        let mut base = json!({"a": {"b": 1, "c": 2}});
        deep_merge(&mut base, &json!({"a": {"c": 3, "d": 4}}));
        assert_eq!(base, json!({"a": {"b": 1, "c": 3, "d": 4}}));
    }

    #[test]
    fn deep_merge_never_concatenates_arrays() {
        let mut base = json!({"providers": {"x": [1, 2]}});
        deep_merge(&mut base, &json!({"providers": {"x": [3]}}));
        assert_eq!(base, json!({"providers": {"x": [3]}}));
    }

    #[test]
    fn deep_merge_replaces_mismatched_types() {
        let mut base = json!({"a": {"b": 1}});
        deep_merge(&mut base, &json!({"a": "scalar"}));
        assert_eq!(base, json!({"a": "scalar"}));
    }

    // -----------------------------------------------------------------------
    // Immutability
    // -----------------------------------------------------------------------

    #[test]
    fn inputs_are_never_mutated() {
        let source = json!({"provider": {"x": {"a": 1}}});
        let dest = json!({"plugin": ["p@1"]});
        let source_before = source.clone();
        let dest_before = dest.clone();

        let mut providers = std::collections::BTreeMap::new();
        providers.insert("x".to_string(), ProviderSpec::Toggle(true));
        let spec = MergeSpec {
            plugins: vec!["p@2".to_string()],
            providers,
            ..MergeSpec::default()
        };
        let _ = build_merged_config(&source, Some(&dest), &merge_mode(spec));

        assert_eq!(source, source_before);
        assert_eq!(dest, dest_before);
    }
}
