//! Optional settings file for the command line tool.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::debug;

use foldermap_core::EngineConfig;

/// Settings file looked for in the root folder.
pub const SETTINGS_FILE_NAME: &str = "foldermap.toml";

/// Catalog file used when none is configured.
pub const CATALOG_FILE_NAME: &str = ".foldermap.json";

/// Values read from `foldermap.toml`. Anything left out keeps its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catalog file, relative to the root unless absolute.
    pub catalog: Option<PathBuf>,
    /// Folder names never shown or enumerated.
    pub excluded_folders: Option<Vec<String>>,
    /// Extensions moved by `extract`.
    pub media_extensions: Option<Vec<String>>,
    /// Name given to new folders.
    pub new_folder_name: Option<String>,
    /// Follow symbolic links while enumerating.
    pub follow_symlinks: Option<bool>,
}

impl Settings {
    /// Per-user settings file.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("foldermap").join(SETTINGS_FILE_NAME))
    }

    /// Load settings for `root`.
    ///
    /// An explicit path must exist. Otherwise `foldermap.toml` in the root is
    /// used, then the per-user file, then the defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        let candidates = std::iter::once(root.join(SETTINGS_FILE_NAME)).chain(Self::user_config_path());
        for path in candidates {
            if path.is_file() {
                return Self::read(&path);
            }
        }

        debug!("No settings file found, using defaults");
        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Could not read settings from {}", path.display()))?;
        let settings = toml::from_str(&content)
            .wrap_err_with(|| format!("Invalid settings in {}", path.display()))?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Build the engine configuration for `root`.
    pub fn engine_config(&self, root: &Path) -> Result<EngineConfig> {
        let mut builder = EngineConfig::builder();
        builder.root(root);
        if let Some(excluded) = &self.excluded_folders {
            builder.excluded_folders(excluded.clone());
        }
        if let Some(extensions) = &self.media_extensions {
            builder.media_extensions(extensions.clone());
        }
        if let Some(name) = &self.new_folder_name {
            builder.new_folder_name(name.clone());
        }
        if let Some(follow) = self.follow_symlinks {
            builder.follow_symlinks(follow);
        }
        builder.build().wrap_err("Invalid settings")
    }

    /// Where the catalog lives. `explicit` wins over the settings file.
    pub fn catalog_path(&self, root: &Path, explicit: Option<&Path>) -> PathBuf {
        let configured = explicit.or(self.catalog.as_deref());
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => root.join(path),
            None => root.join(CATALOG_FILE_NAME),
        }
    }
}
