use crate::{CandidateFile, JobId, Metadata};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked or dropped a file. `submitted_at` is the display timestamp.
    FileSubmitted {
        file: CandidateFile,
        submitted_at: String,
    },
    /// Transport progress for the upload request.
    UploadProgress { job_id: JobId, sent: u64, total: u64 },
    /// Server accepted the upload and assigned a video id.
    UploadCompleted { job_id: JobId, video_id: String },
    UploadFailed { job_id: JobId, message: String },
    /// Status frame from the push channel.
    StatusReceived {
        job_id: JobId,
        enhancement: bool,
        metadata: bool,
    },
    /// Completion frame from the push channel.
    ProcessingCompleted {
        job_id: JobId,
        metadata: Metadata,
        enhanced_video_url: Option<String>,
        completed_at: String,
    },
    ChannelFailed {
        job_id: JobId,
        failure: ChannelFailure,
    },
    /// The push channel for `job_id` is gone.
    ChannelClosed { job_id: JobId },
    /// User clicked "process another video".
    ResetClicked,
    /// User picked an entry from the recent uploads list.
    HistorySelected { id: String },
    /// User asked to save the current result.
    DownloadClicked,
    /// Outcome of a result download: saved path or failure detail.
    DownloadFinished {
        job_id: JobId,
        filename: String,
        result: Result<String, String>,
    },
    /// User dismissed the error banner.
    ErrorDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelFailure {
    Timeout,
    Transport(String),
}
