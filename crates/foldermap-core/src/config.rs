//! Engine configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration shared by the reconciler and the mutation engine.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Root folder all relative paths are resolved against.
    pub root: PathBuf,

    /// Folder names skipped at every level when enumerating.
    #[builder(default = "default_excluded_folders()")]
    #[serde(default = "default_excluded_folders")]
    pub excluded_folders: Vec<String>,

    /// File extensions (with the leading dot) treated as media files.
    #[builder(default = "default_media_extensions()")]
    #[serde(default = "default_media_extensions")]
    pub media_extensions: Vec<String>,

    /// Name used for newly created folders.
    #[builder(default = "default_new_folder_name()")]
    #[serde(default = "default_new_folder_name")]
    pub new_folder_name: String,

    /// Follow symbolic links while enumerating.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_excluded_folders() -> Vec<String> {
    vec![
        "Backups".to_string(),
        "DeletedFiles".to_string(),
        ".vthumb".to_string(),
    ]
}

fn default_media_extensions() -> Vec<String> {
    [".jpg", ".avi", ".mp4", ".mov", ".asf"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_new_folder_name() -> String {
    "New folder".to_string()
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }

        if let Some(ref name) = self.new_folder_name {
            crate::relpath::validate_folder_name(name).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Create a new engine config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Create a config with defaults for the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded_folders: default_excluded_folders(),
            media_extensions: default_media_extensions(),
            new_folder_name: default_new_folder_name(),
            follow_symlinks: false,
        }
    }

    /// Check if a folder name is excluded from enumeration.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_folders
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(name))
    }

    /// Check if a file name looks like an image or video we manage.
    pub fn is_media_file(&self, name: &str) -> bool {
        if name.starts_with("._") {
            return false;
        }
        let lower = name.to_lowercase();
        self.media_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()) && lower.len() > ext.len())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
