use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub connect_timeout: Duration,
    /// Whole-request limit, sized for the largest accepted upload.
    pub request_timeout: Duration,
    pub chunk_size: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30 * 60),
            chunk_size: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    /// Deadline for the completion frame, counted from the moment the channel is opened.
    pub processing_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            processing_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_url: String,
    pub upload: UploadSettings,
    pub channel: ChannelSettings,
    /// Where downloaded results are saved.
    pub output_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            upload: UploadSettings::default(),
            channel: ChannelSettings::default(),
            output_dir: PathBuf::from("downloads"),
        }
    }
}
