use crate::error::{OrphanError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "orphanmd";
const CONFIG_FILE: &str = "config.json";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// File name globs selecting corpus documents (matched case-insensitively)
    #[serde(default = "default_document_patterns")]
    pub document_patterns: Vec<String>,

    /// Documents larger than this many bytes are refused at ingestion
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Worker threads for candidate classification
    /// If 0, uses the number of CPU cores
    #[serde(default)]
    pub jobs: usize,
}

fn default_document_patterns() -> Vec<String> {
    vec!["*.md".to_string()]
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            document_patterns: default_document_patterns(),
            max_file_size: default_max_file_size(),
            jobs: 0,
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from an explicit file; a missing file yields the defaults
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            OrphanError::Configuration(format!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            OrphanError::Configuration(format!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run can work with
    pub fn validate(&self) -> Result<()> {
        if self.document_patterns.is_empty() {
            return Err(OrphanError::Configuration(
                "at least one document pattern is required".to_string(),
            ));
        }
        if self.max_file_size == 0 {
            return Err(OrphanError::Configuration(
                "max_file_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the effective worker count (resolves 0 to CPU count)
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 { num_cpus() } else { self.jobs }
    }
}

/// Get the number of CPUs available
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Get the path to the config file
pub fn get_config_path() -> Option<PathBuf> {
    get_app_data_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Option<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    base.map(|b| b.join(APP_NAME))
}
