use crate::error::{PagenoteError, Result};
use crate::store::fs_backend::is_reserved_key;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_STORAGE_KEY: &str = "pagenote-pages";
const DEFAULT_SIDEBAR_BREAKPOINT: usize = 80;
const DEFAULT_FILE_EXT: &str = ".md";

/// Configuration for pagenote, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PagenoteConfig {
    /// Key of the storage slot holding the page collection
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Terminal width (columns) below which the sidebar collapses
    #[serde(default = "default_sidebar_breakpoint")]
    pub sidebar_breakpoint: usize,

    /// Extension of the temporary buffer handed to the editor
    #[serde(default = "default_file_ext")]
    pub file_ext: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_sidebar_breakpoint() -> usize {
    DEFAULT_SIDEBAR_BREAKPOINT
}

fn default_file_ext() -> String {
    DEFAULT_FILE_EXT.to_string()
}

impl Default for PagenoteConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            sidebar_breakpoint: default_sidebar_breakpoint(),
            file_ext: default_file_ext(),
        }
    }
}

/// Keys accepted by `pagenote config`.
pub const CONFIG_KEYS: &[&str] = &["storage-key", "sidebar-breakpoint", "file-ext"];

impl PagenoteConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(PagenoteError::Io)?;
        let config: PagenoteConfig =
            serde_json::from_str(&content).map_err(PagenoteError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(PagenoteError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(PagenoteError::Serialization)?;
        fs::write(config_path, content).map_err(PagenoteError::Io)?;
        Ok(())
    }

    /// Current value of a user-facing key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "storage-key" => Some(self.storage_key.clone()),
            "sidebar-breakpoint" => Some(self.sidebar_breakpoint.to_string()),
            "file-ext" => Some(self.file_ext.clone()),
            _ => None,
        }
    }

    /// Sets a user-facing key, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "storage-key" => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(PagenoteError::Api("storage-key cannot be empty".into()));
                }
                if is_reserved_key(value) {
                    return Err(PagenoteError::Api(format!(
                        "storage-key cannot be '{}': that name is taken by the config file",
                        value
                    )));
                }
                self.storage_key = value.to_string();
            }
            "sidebar-breakpoint" => {
                self.sidebar_breakpoint = value.trim().parse().map_err(|_| {
                    PagenoteError::Api(format!("Invalid sidebar-breakpoint: {}", value))
                })?;
            }
            "file-ext" => self.set_file_ext(value),
            other => return Err(PagenoteError::Api(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }

    /// Set the file extension (normalizes to start with a dot)
    pub fn set_file_ext(&mut self, ext: &str) {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
    }
}
