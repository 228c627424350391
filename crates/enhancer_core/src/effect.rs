use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartUpload {
        job_id: crate::JobId,
        path: PathBuf,
        filename: String,
        media_type: String,
    },
    CancelUpload { job_id: crate::JobId },
    OpenChannel {
        job_id: crate::JobId,
        video_id: String,
    },
    CloseChannel { job_id: crate::JobId },
    DownloadResult {
        job_id: crate::JobId,
        filename: String,
    },
}
