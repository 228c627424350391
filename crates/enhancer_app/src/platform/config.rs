//! Optional RON configuration for enhancer_app.
//!
//! Read from `./enhancer.ron`, or from the path in `ENHANCER_CONFIG`.
//! Every field is optional; a missing file means defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use enhancer_engine::{ChannelSettings, EngineConfig, UploadSettings};
use log::LevelFilter;
use serde::Deserialize;

use super::logging::LogDestination;

pub const CONFIG_ENV_VAR: &str = "ENHANCER_CONFIG";
const DEFAULT_CONFIG_FILENAME: &str = "enhancer.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub processing_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub upload_chunk_bytes: usize,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            server_url: engine.server_url,
            output_dir: engine.output_dir,
            processing_timeout_secs: engine.channel.processing_timeout.as_secs(),
            connect_timeout_secs: engine.upload.connect_timeout.as_secs(),
            upload_timeout_secs: engine.upload.request_timeout.as_secs(),
            upload_chunk_bytes: engine.upload.chunk_size,
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        let connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        EngineConfig {
            server_url: self.server_url.clone(),
            upload: UploadSettings {
                connect_timeout,
                request_timeout: Duration::from_secs(self.upload_timeout_secs),
                chunk_size: self.upload_chunk_bytes.max(1),
            },
            channel: ChannelSettings {
                processing_timeout: Duration::from_secs(self.processing_timeout_secs),
                connect_timeout,
            },
            output_dir: self.output_dir.clone(),
        }
    }

    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME))
}
