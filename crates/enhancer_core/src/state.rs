use enhancer_logging::{enhancer_debug, enhancer_info};

use crate::error_slot::ErrorSlot;
use crate::history::{HistoryCache, HistoryEntry};
use crate::progress::ProgressSnapshot;
use crate::view_model::{media_filename, AppViewModel, HistoryRowView, JobView, ResultView};
use crate::{CandidateFile, Effect};

/// Local, monotonically increasing id of a submission. The server-assigned
/// video id only exists once the upload has been accepted.
pub type JobId = u64;

/// Structured metadata reported by the service for a finished video.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_live(self) -> bool {
        matches!(self, JobState::Uploading | JobState::Processing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOrigin {
    /// Submitted in this session and driven by upload/channel events.
    Live,
    /// Synthesized from a history entry; never touches the network.
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub job_id: JobId,
    pub video_id: Option<String>,
    pub filename: String,
    pub state: JobState,
    pub metadata: Option<Metadata>,
    pub enhanced_video_url: Option<String>,
    pub created_at: String,
    pub origin: JobOrigin,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    job: Option<Job>,
    progress: ProgressSnapshot,
    history: HistoryCache,
    error: ErrorSlot,
    /// Job whose push channel is still held open by the engine.
    channel: Option<JobId>,
    /// Job whose upload request is still in flight.
    upload: Option<JobId>,
    downloading: Option<String>,
    last_download: Option<String>,
    next_job_id: JobId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> JobState {
        self.job.as_ref().map_or(JobState::Idle, |job| job.state)
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn error(&self) -> Option<&str> {
        self.error.current()
    }

    pub fn channel_job(&self) -> Option<JobId> {
        self.channel
    }

    pub fn view(&self) -> AppViewModel {
        let job = self.job.as_ref().map(|job| JobView {
            job_id: job.job_id,
            video_id: job.video_id.clone(),
            filename: job.filename.clone(),
            created_at: job.created_at.clone(),
        });
        let result = self
            .job
            .as_ref()
            .filter(|job| job.state == JobState::Completed)
            .map(|job| ResultView {
                video_id: job.video_id.clone().unwrap_or_default(),
                filename: job.filename.clone(),
                metadata: job.metadata.clone().unwrap_or_default(),
                video_url: job.enhanced_video_url.clone(),
                media_filename: job.enhanced_video_url.as_deref().and_then(media_filename),
                from_history: job.origin == JobOrigin::History,
            });

        AppViewModel {
            phase: self.phase(),
            progress: self.progress,
            job,
            result,
            error: self.error.current().map(ToOwned::to_owned),
            history: self
                .history
                .entries()
                .map(|entry| HistoryRowView {
                    id: entry.id.clone(),
                    filename: entry.filename.clone(),
                    timestamp: entry.timestamp.clone(),
                })
                .collect(),
            downloading: self.downloading.clone(),
            last_download: self.last_download.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn report_error(&mut self, message: impl Into<String>) {
        self.error.set(message);
        self.mark_dirty();
    }

    pub(crate) fn dismiss_error(&mut self) {
        if self.error.clear() {
            self.mark_dirty();
        }
    }

    /// Drops the current job, releasing whatever the engine still holds for it.
    pub(crate) fn discard_job(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(job_id) = self.upload.take() {
            effects.push(Effect::CancelUpload { job_id });
        }
        if let Some(job_id) = self.channel.take() {
            effects.push(Effect::CloseChannel { job_id });
        }
        if let Some(job) = self.job.take() {
            enhancer_debug!("discarding job {} in state {:?}", job.job_id, job.state);
            self.mark_dirty();
        }
        if self.progress != ProgressSnapshot::default() {
            self.progress = ProgressSnapshot::default();
            self.mark_dirty();
        }
        self.downloading = None;
        self.last_download = None;
        effects
    }

    pub(crate) fn begin_job(
        &mut self,
        file: &CandidateFile,
        media_type: &str,
        submitted_at: String,
    ) -> Effect {
        self.next_job_id += 1;
        let job_id = self.next_job_id;
        self.job = Some(Job {
            job_id,
            video_id: None,
            filename: file.filename.clone(),
            state: JobState::Uploading,
            metadata: None,
            enhanced_video_url: None,
            created_at: submitted_at,
            origin: JobOrigin::Live,
        });
        self.progress = ProgressSnapshot::upload_started();
        self.upload = Some(job_id);
        self.mark_dirty();
        enhancer_info!(
            "job {} uploading {} ({} bytes, {})",
            job_id,
            file.filename,
            file.size_bytes,
            media_type
        );
        Effect::StartUpload {
            job_id,
            path: file.path.clone(),
            filename: file.filename.clone(),
            media_type: media_type.to_string(),
        }
    }

    pub(crate) fn apply_upload_progress(&mut self, job_id: JobId, sent: u64, total: u64) {
        if self.live_job(job_id, JobState::Uploading).is_none() {
            return;
        }
        if self.progress.record_upload(sent, total) {
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_upload_complete(&mut self, job_id: JobId, video_id: String) -> Vec<Effect> {
        let Some(job) = self.live_job(job_id, JobState::Uploading) else {
            return Vec::new();
        };
        job.state = JobState::Processing;
        job.video_id = Some(video_id.clone());
        self.upload = None;
        self.progress.upload_finished();
        self.channel = Some(job_id);
        self.mark_dirty();
        enhancer_info!("job {} accepted as video {}", job_id, video_id);
        vec![Effect::OpenChannel { job_id, video_id }]
    }

    pub(crate) fn apply_status(&mut self, job_id: JobId, enhancement: bool, metadata: bool) {
        if self.live_job(job_id, JobState::Processing).is_none() {
            return;
        }
        if self.progress.record_status(enhancement, metadata) {
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_completion(
        &mut self,
        job_id: JobId,
        metadata: Metadata,
        enhanced_video_url: Option<String>,
        completed_at: String,
    ) {
        let Some(job) = self.live_job(job_id, JobState::Processing) else {
            return;
        };
        job.state = JobState::Completed;
        job.metadata = Some(metadata.clone());
        job.enhanced_video_url = enhanced_video_url.clone();
        let entry = HistoryEntry {
            id: job.video_id.clone().unwrap_or_default(),
            filename: job.filename.clone(),
            timestamp: completed_at,
            video_url: enhanced_video_url,
            metadata,
        };
        // The engine tears the channel down itself after a completion frame.
        self.channel = None;
        self.progress.complete();
        self.history.push(entry);
        self.mark_dirty();
        enhancer_info!("job {} completed; {} in history", job_id, self.history.len());
    }

    /// Moves a live job to `Failed`. `channel_gone` is set when the failure came
    /// from the channel itself, which the engine has already torn down.
    pub(crate) fn fail(&mut self, job_id: JobId, message: String, channel_gone: bool) -> Vec<Effect> {
        let Some(job) = self.job.as_mut().filter(|job| job.job_id == job_id) else {
            return Vec::new();
        };
        if !job.state.is_live() || job.origin != JobOrigin::Live {
            return Vec::new();
        }
        job.state = JobState::Failed;
        self.upload = None;
        self.progress.halt();
        let mut effects = Vec::new();
        if let Some(channel_job) = self.channel.take() {
            if !channel_gone {
                effects.push(Effect::CloseChannel { job_id: channel_job });
            }
        }
        enhancer_info!("job {} failed: {}", job_id, message);
        self.report_error(message);
        effects
    }

    /// Returns whether the closed channel still belonged to the job.
    pub(crate) fn release_channel(&mut self, job_id: JobId) -> bool {
        if self.channel == Some(job_id) {
            self.channel = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_processing(&self, job_id: JobId) -> bool {
        self.job
            .as_ref()
            .is_some_and(|job| job.job_id == job_id && job.state == JobState::Processing)
    }

    pub(crate) fn reset(&mut self) -> Vec<Effect> {
        let effects = self.discard_job();
        self.dismiss_error();
        effects
    }

    /// Replaces the current view with a completed job rebuilt from history.
    pub(crate) fn show_history(&mut self, id: &str) -> Option<Vec<Effect>> {
        let entry = self.history.select(id)?.clone();
        let effects = self.discard_job();
        self.next_job_id += 1;
        self.job = Some(Job {
            job_id: self.next_job_id,
            video_id: Some(entry.id),
            filename: entry.filename,
            state: JobState::Completed,
            metadata: Some(entry.metadata),
            enhanced_video_url: entry.video_url,
            created_at: entry.timestamp,
            origin: JobOrigin::History,
        });
        self.progress = ProgressSnapshot::finished();
        self.error.clear();
        self.mark_dirty();
        Some(effects)
    }

    /// Media filename of the result on display, if there is one.
    pub(crate) fn result_filename(&self) -> Option<Option<String>> {
        self.job
            .as_ref()
            .filter(|job| job.state == JobState::Completed)
            .map(|job| job.enhanced_video_url.as_deref().and_then(media_filename))
    }

    pub(crate) fn start_download(&mut self, filename: String) -> Option<Effect> {
        let job_id = self.job.as_ref()?.job_id;
        if self.downloading.is_some() {
            return None;
        }
        self.downloading = Some(filename.clone());
        self.mark_dirty();
        Some(Effect::DownloadResult { job_id, filename })
    }

    /// Applies a download outcome. Results for a job no longer on display are dropped.
    pub(crate) fn finish_download(
        &mut self,
        job_id: JobId,
        filename: &str,
        result: Result<String, String>,
    ) {
        if self.job.as_ref().map(|job| job.job_id) != Some(job_id) {
            enhancer_debug!("ignoring download of {} for stale job {}", filename, job_id);
            return;
        }
        if self.downloading.as_deref() == Some(filename) {
            self.downloading = None;
        }
        match result {
            Ok(saved_to) => {
                enhancer_info!("saved {} to {}", filename, saved_to);
                self.last_download = Some(saved_to);
                self.mark_dirty();
            }
            Err(detail) => self.report_error(format!("Download failed: {detail}")),
        }
    }

    fn live_job(&mut self, job_id: JobId, expected: JobState) -> Option<&mut Job> {
        let job = self
            .job
            .as_mut()
            .filter(|job| job.origin == JobOrigin::Live && job.job_id == job_id);
        match job {
            Some(job) if job.state == expected => Some(job),
            Some(job) => {
                enhancer_debug!(
                    "ignoring event for job {} in state {:?} (expected {:?})",
                    job_id,
                    job.state,
                    expected
                );
                None
            }
            None => {
                enhancer_debug!("ignoring stale event for job {}", job_id);
                None
            }
        }
    }
}
