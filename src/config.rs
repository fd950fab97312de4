//! Service configuration file handling
//!
//! Loads and manages the ~/.config/transport-frames/config.yaml file.
//! Covers the base data directory, the server listen address, the external
//! territory/POI data service URL (overridable via the URBAN_API environment
//! variable), and the region reference table.

use crate::region::{default_regions, Region};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the data service base URL
pub const URBAN_API_ENV: &str = "URBAN_API";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base directory for matrices, frames, and graph blobs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Address the HTTP server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Base URL of the external territory/POI data service
    #[serde(default = "default_urban_api_url")]
    pub urban_api_url: String,

    /// Timeout for outbound data-service calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Region reference table (id, name, local CRS)
    #[serde(default = "default_regions")]
    pub regions: Vec<Region>,
}

fn default_data_dir() -> PathBuf {
    // Always use the home directory for consistency across platforms
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".local");
    path.push("share");
    path.push("transport-frames");
    path
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_urban_api_url() -> String {
    "https://urban-api.idu.kanootoko.org".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            listen_addr: default_listen_addr(),
            urban_api_url: default_urban_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            regions: default_regions(),
        }
    }
}

impl AppConfig {
    /// Default config file path (~/.config/transport-frames/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("transport-frames");
        path.push("config.yaml");
        path
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent,
    /// and apply the URBAN_API environment override.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        let mut config = if path.exists() {
            tracing::info!(path = %path.display(), "Loading configuration");
            Self::load(&path)?
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        if let Ok(url) = std::env::var(URBAN_API_ENV) {
            tracing::info!(url = %url, "Overriding data service URL from {}", URBAN_API_ENV);
            config.urban_api_url = url;
        }

        Ok(config)
    }

    /// Timeout for outbound data-service calls
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Create the directories the service persists into, logging which ones
    /// already existed.
    pub fn ensure_data_layout(&self) -> Result<()> {
        for dir_name in ["matrices", "frames", "graphs"] {
            let dir_path = self.data_dir.join(dir_name);
            if dir_path.exists() {
                tracing::info!(path = %dir_path.display(), "Folder already exists");
            } else {
                fs::create_dir_all(&dir_path)?;
                tracing::info!(path = %dir_path.display(), "Folder created");
            }
        }
        Ok(())
    }
}
