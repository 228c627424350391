use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

pub type JobId = u64;

/// Structured metadata carried by a completion frame.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub filename: String,
    pub media_type: String,
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub video_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Progress { enhancement: bool, metadata: bool },
    Completion {
        metadata: Metadata,
        enhanced_video_url: Option<String>,
    },
    Error(ChannelError),
    /// Always the last event of a channel.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("no completion before the processing deadline")]
    Timeout,
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadProgress {
        job_id: JobId,
        sent: u64,
        total: u64,
    },
    UploadFinished {
        job_id: JobId,
        result: Result<UploadReceipt, TransferError>,
    },
    Channel {
        job_id: JobId,
        event: ChannelEvent,
    },
    DownloadFinished {
        job_id: JobId,
        filename: String,
        result: Result<PathBuf, TransferError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransferError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransferError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidRequest,
    HttpStatus(u16),
    Timeout,
    InvalidResponse,
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
