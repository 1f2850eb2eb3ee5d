use serde::{Deserialize, Serialize};

/// The configuration bitset the manager and regex adapter share.
///
/// Modeled as named booleans rather than a raw integer bitset - this is a small,
/// user-facing configuration surface, and named fields let `serde`/`toml` round-trip
/// it directly as session defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameFlags {
    /// Regex operates on the stem of the filename only.
    pub name_only: bool,
    /// Regex operates on the extension (without leading dot) only.
    pub extension_only: bool,
    /// Disambiguate collisions within a parent directory with a numeric counter.
    pub enumerate_items: bool,
    /// Skip folders when computing `should_rename` / committing.
    pub exclude_folders: bool,
    /// Skip files when computing `should_rename` / committing.
    pub exclude_files: bool,
    /// Skip items nested under a renamed subfolder.
    pub exclude_subfolder_items: bool,
    /// Regex matching ignores ASCII case.
    pub case_insensitive: bool,
}

impl Default for RenameFlags {
    fn default() -> Self {
        Self {
            name_only: false,
            extension_only: false,
            enumerate_items: false,
            exclude_folders: false,
            exclude_files: false,
            exclude_subfolder_items: false,
            case_insensitive: false,
        }
    }
}

impl RenameFlags {
    /// Which portion of `original_name` the regex source string is drawn from.
    pub fn source_scope(self) -> SourceScope {
        if self.name_only {
            SourceScope::NameOnly
        } else if self.extension_only {
            SourceScope::ExtensionOnly
        } else {
            SourceScope::Whole
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceScope {
    NameOnly,
    ExtensionOnly,
    Whole,
}
