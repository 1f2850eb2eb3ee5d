use crate::flags::RenameFlags;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Loadable defaults for a fresh session.
///
/// This is strictly an initial-value convenience: once a [`crate::manager::Manager`]
/// is constructed, all state transitions go through its public API, never through
/// re-reading this file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: RenameFlags,
}

impl Config {
    /// Load from `.rename-engine/config.toml` in the current directory, falling
    /// back to built-in defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::load_from_dir(&cwd)
    }

    /// Same as [`Self::load`], but with the base directory passed in rather than
    /// read from the process, so the fallback path can be exercised without
    /// mutating global process state in tests.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(".rename-engine").join("config.toml");
        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
