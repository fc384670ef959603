//! Search configuration
//!
//! Stored as pretty JSON. A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{CorrelationError, CorrelationResult};

/// Config file name inside the application data directory
pub const CONFIG_FILE_NAME: &str = "common_attribute_search.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Only match files whose MIME type is a picture, video or audio type
    #[serde(default)]
    pub filter_by_media: bool,
    /// Only match files whose MIME type is a document type
    #[serde(default)]
    pub filter_by_documents: bool,
    /// Hide values present in more than this percentage of central
    /// repository data sources
    #[serde(default)]
    pub percentage_threshold: Option<u8>,
    /// Central repository database; the application data directory when unset
    #[serde(default)]
    pub central_repo_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            filter_by_media: false,
            filter_by_documents: false,
            percentage_threshold: None,
            central_repo_path: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> CorrelationResult<()> {
        if let Some(threshold) = self.percentage_threshold {
            if threshold > 100 {
                return Err(CorrelationError::Config(format!(
                    "percentage_threshold must be between 0 and 100, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }

    /// Central repository path from the config, or the platform default
    pub fn central_repo_path(&self) -> PathBuf {
        self.central_repo_path
            .clone()
            .unwrap_or_else(crate::database::default_central_repo_path)
    }
}

/// Default config location under the platform local data directory
pub fn default_config_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("com.ffxcheck.app")
        .join(CONFIG_FILE_NAME)
}

/// Load and validate a config file; a missing file yields defaults
pub fn load_config(path: &Path) -> CorrelationResult<SearchConfig> {
    if !path.exists() {
        info!("No config at {:?}, using defaults", path);
        return Ok(SearchConfig::default());
    }

    let json = fs::read_to_string(path)?;
    let config: SearchConfig = serde_json::from_str(&json).map_err(|e| {
        warn!("Failed to parse config file: {}", e);
        CorrelationError::Serialization(e)
    })?;
    config.validate()?;

    info!("Config loaded from {:?}", path);
    Ok(config)
}

pub fn save_config(config: &SearchConfig, path: &Path) -> CorrelationResult<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, &json)?;
    info!("Config saved: {} bytes", json.len());
    Ok(())
}
