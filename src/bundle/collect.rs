//! Expansion of a resolved target into the concrete files to bundle.
//!
//! Collection is resilient by design: an unknown preset name or a missing
//! source file produces a warning and is skipped, never an error. Steps
//! append in a fixed order; duplicate destination paths are kept (staging
//! applies a last-write-wins policy later).

use std::path::{Path, PathBuf};

use crate::config::ResolvedTarget;
use crate::logging::Log;
use crate::paths::{self, Category, Environment};
use crate::presets;

/// An ephemeral (source, bundle-relative destination, category) triple.
///
/// Produced transiently by collection and consumed by staging; never
/// persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    /// Absolute path of the file on the local system.
    pub source: PathBuf,
    /// Destination path relative to the category root.
    pub dest: PathBuf,
    /// Which local root the destination is relative to.
    pub category: Category,
}

/// Expand the resolved target's specification into concrete files.
///
/// Order: presets, agent definitions, command definitions, skills, whole
/// opencode directories, then includes. Every step appends; nothing is
/// deduplicated here.
#[must_use]
pub fn collect_bundle_files(
    target: &ResolvedTarget,
    env: &Environment,
    log: &dyn Log,
) -> Vec<BundleFile> {
    let mut files = Vec::new();
    let spec = &target.spec;

    collect_presets(&spec.auth.enabled_presets(), env, log, &mut files);

    if spec.agents {
        collect_markdown_dir(&paths::agents_dir(env), "agents", &mut files);
    }
    if spec.commands {
        collect_markdown_dir(&paths::commands_dir(env), "commands", &mut files);
    }
    if spec.skills {
        collect_skills(&paths::skills_dir(env), &mut files);
    }

    if spec.opencode_config_dir {
        collect_tree(&paths::config_root(env), Category::Config, &mut files);
    }
    if spec.opencode_data_dir {
        collect_tree(&paths::data_root(env), Category::Data, &mut files);
    }

    for entry in &spec.include {
        let source = dunce::simplified(&env.cwd.join(entry.source())).to_path_buf();
        if source.is_file() {
            files.push(BundleFile {
                source,
                dest: PathBuf::from(entry.dest()),
                category: Category::Root,
            });
        } else {
            log.warn(&format!(
                "include source not found, skipping: {}",
                source.display()
            ));
        }
    }

    files
}

/// Expand preset names into files. Unknown presets warn and are skipped;
/// presets whose underlying file does not exist are skipped silently.
fn collect_presets(
    names: &[String],
    env: &Environment,
    log: &dyn Log,
    files: &mut Vec<BundleFile>,
) {
    for name in names {
        let Some(preset) = presets::get_preset(name) else {
            log.warn(&format!("unknown preset '{name}', skipping"));
            continue;
        };
        for file in preset.files {
            let source = paths::category_root(env, file.category).join(file.path);
            if source.is_file() {
                files.push(BundleFile {
                    source,
                    dest: PathBuf::from(file.path),
                    category: file.category,
                });
            }
        }
    }
}

/// Markdown files directly inside `dir` (non-recursive), destined for the
/// project-local `.opencode/<kind>/` directory.
fn collect_markdown_dir(dir: &Path, kind: &str, files: &mut Vec<BundleFile>) {
    for path in sorted_entries(dir) {
        if path.is_file() && path.extension().is_some_and(|e| e == "md") {
            if let Some(name) = path.file_name() {
                files.push(BundleFile {
                    source: path.clone(),
                    dest: Path::new(".opencode").join(kind).join(name),
                    category: Category::Root,
                });
            }
        }
    }
}

/// Immediate subdirectories of the skills dir, each contributing its
/// `SKILL.md` if present.
fn collect_skills(dir: &Path, files: &mut Vec<BundleFile>) {
    for sub in sorted_entries(dir) {
        if !sub.is_dir() {
            continue;
        }
        let skill = sub.join("SKILL.md");
        if skill.is_file() {
            if let Some(name) = sub.file_name() {
                files.push(BundleFile {
                    source: skill,
                    dest: Path::new(".opencode").join("skills").join(name).join("SKILL.md"),
                    category: Category::Root,
                });
            }
        }
    }
}

/// Every file in the tree rooted at `root`, recursively, with destinations
/// relative to `root`.
fn collect_tree(root: &Path, category: Category, files: &mut Vec<BundleFile>) {
    fn walk(root: &Path, dir: &Path, category: Category, files: &mut Vec<BundleFile>) {
        for path in sorted_entries(dir) {
            if path.is_dir() {
                walk(root, &path, category, files);
            } else if path.is_file() {
                if let Ok(rel) = path.strip_prefix(root) {
                    files.push(BundleFile {
                        source: path.clone(),
                        dest: rel.to_path_buf(),
                        category,
                    });
                }
            }
        }
    }
    walk(root, root, category, files);
}

/// Immediate children of `dir`, sorted by name for deterministic collection
/// order. A missing or unreadable directory yields nothing.
fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let Ok(read) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut entries: Vec<PathBuf> = read.filter_map(|e| e.ok().map(|e| e.path())).collect();
    entries.sort();
    entries
}
