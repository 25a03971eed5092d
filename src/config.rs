use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{BmError, Result};

const QUALIFIER: &str = "";
const ORGANIZATION: &str = "";
const APPLICATION: &str = "bookmarkhub";

fn default_data_file() -> String {
    "bookmarks.json".to_string()
}

fn default_list_limit() -> usize {
    20
}

fn default_confirm_deletes() -> bool {
    true
}

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Directory where the bookmark file is stored
    pub data_dir: PathBuf,

    /// Name of the bookmark file inside `data_dir`
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// How many bookmarks `list` shows when no limit is given
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Whether deletes ask for confirmation unless forced
    #[serde(default = "default_confirm_deletes")]
    pub confirm_deletes: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".bookmarkhub"));

        Self {
            data_dir,
            data_file: default_data_file(),
            list_limit: default_list_limit(),
            confirm_deletes: default_confirm_deletes(),
        }
    }
}

impl Config {
    /// Full path of the bookmark file
    pub fn data_file_path(&self) -> PathBuf {
        self.data_dir.join(&self.data_file)
    }

    /// Platform config file location, e.g. `~/.config/bookmarkhub/config.json`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads the configuration file.
    ///
    /// An explicitly given path must exist. When no path is given the
    /// platform location is used, and defaults apply if nothing is there yet.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(BmError::ConfigError {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!("Reading config from {}", path.display());
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| BmError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Writes the configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|_| BmError::DirectoryError {
                    path: parent.to_path_buf(),
                })?;
            }
        }

        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Updates one setting from a `key=value` string
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or_else(|| BmError::ConfigError {
                message: format!("expected key=value, got '{}'", assignment),
            })?;

        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "data_file" => {
                if value.is_empty() {
                    return Err(BmError::ConfigError {
                        message: "data_file cannot be empty".to_string(),
                    });
                }
                self.data_file = value.to_string();
            }
            "list_limit" => {
                self.list_limit = value.parse().map_err(|_| BmError::ConfigError {
                    message: format!("list_limit must be a number, got '{}'", value),
                })?
            }
            "confirm_deletes" => {
                self.confirm_deletes = value.parse().map_err(|_| BmError::ConfigError {
                    message: format!("confirm_deletes must be true or false, got '{}'", value),
                })?
            }
            other => {
                return Err(BmError::ConfigError {
                    message: format!("unknown setting '{}'", other),
                })
            }
        }
        Ok(())
    }
}
