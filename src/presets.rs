//! Static registry of named file presets.
//!
//! A preset maps a short name to a fixed set of `(category, relative path)`
//! pairs so that a sync specification can pull in well-known credential
//! files without enumerating paths. Presets reference single files only,
//! never directories, and are resolved against category-appropriate roots
//! at collection time.

use crate::paths::{
    ACCOUNTS_FILE_NAME, AUTH_FILE_NAME, Category, LEGACY_CREDENTIALS_FILE_NAME, SESSION_FILE_NAME,
};

/// One file referenced by a preset.
#[derive(Debug, Clone, Copy)]
pub struct PresetFile {
    /// Which local root the path is relative to.
    pub category: Category,
    /// Path relative to the category root.
    pub path: &'static str,
}

/// An immutable named set of files eligible for bundling.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    /// The short name used in sync specifications.
    pub name: &'static str,
    /// The files this preset expands to, in order.
    pub files: &'static [PresetFile],
}

/// All built-in presets.
static PRESETS: &[Preset] = &[
    Preset {
        name: "credentials",
        files: &[
            PresetFile {
                category: Category::Data,
                path: AUTH_FILE_NAME,
            },
            // Legacy location, kept for installs that predate auth.json.
            PresetFile {
                category: Category::Config,
                path: LEGACY_CREDENTIALS_FILE_NAME,
            },
        ],
    },
    Preset {
        name: "antigravity-accounts",
        files: &[PresetFile {
            category: Category::Config,
            path: ACCOUNTS_FILE_NAME,
        }],
    },
    Preset {
        name: "sessions",
        files: &[PresetFile {
            category: Category::Data,
            path: SESSION_FILE_NAME,
        }],
    },
];

/// Look up a preset by name. Unknown names return `None`; the caller treats
/// that as a non-fatal warning, not an error.
#[must_use]
pub fn get_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// All registered presets, in registry order.
#[must_use]
pub fn all_presets() -> &'static [Preset] {
    PRESETS
}
