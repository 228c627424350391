use crate::{JobId, JobState, Metadata, ProgressSnapshot};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: JobState,
    pub progress: ProgressSnapshot,
    pub job: Option<JobView>,
    pub result: Option<ResultView>,
    pub error: Option<String>,
    pub history: Vec<HistoryRowView>,
    pub downloading: Option<String>,
    pub last_download: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub job_id: JobId,
    pub video_id: Option<String>,
    pub filename: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub video_id: String,
    pub filename: String,
    pub metadata: Metadata,
    pub video_url: Option<String>,
    /// Trailing file name of `video_url`, used for the download and video endpoints.
    pub media_filename: Option<String>,
    pub from_history: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub id: String,
    pub filename: String,
    pub timestamp: String,
}

/// Portion of `url` after the last `/`, with query and fragment stripped.
pub fn media_filename(url: &str) -> Option<String> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let name = url[..end].rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::media_filename;

    #[test]
    fn media_filename_takes_last_segment() {
        assert_eq!(
            media_filename("http://localhost:8000/static/storage/enhanced_abc.mp4").as_deref(),
            Some("enhanced_abc.mp4")
        );
        assert_eq!(
            media_filename("/static/storage/enhanced_abc.mp4?v=2#t=10").as_deref(),
            Some("enhanced_abc.mp4")
        );
        assert_eq!(media_filename("plain.webm").as_deref(), Some("plain.webm"));
    }

    #[test]
    fn media_filename_rejects_empty_segments() {
        assert_eq!(media_filename(""), None);
        assert_eq!(media_filename("http://host/videos/"), None);
        assert_eq!(media_filename("/a/?x=1"), None);
    }
}
