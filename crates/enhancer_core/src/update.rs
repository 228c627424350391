use enhancer_logging::{enhancer_debug, enhancer_info};

use crate::{validate, AppState, ChannelFailure, Effect, Msg, Validation};

pub const TIMEOUT_MESSAGE: &str = "Processing timeout — please try again";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSubmitted { file, submitted_at } => match validate(&file) {
            Validation::Rejected(rejection) => {
                // A bad pick never disturbs the job already on screen.
                enhancer_info!("rejected {}: {:?}", file.filename, rejection);
                state.report_error(rejection.reason());
                Vec::new()
            }
            Validation::Accepted { media_type } => {
                let mut effects = state.discard_job();
                state.dismiss_error();
                effects.push(state.begin_job(&file, media_type, submitted_at));
                effects
            }
        },
        Msg::UploadProgress {
            job_id,
            sent,
            total,
        } => {
            state.apply_upload_progress(job_id, sent, total);
            Vec::new()
        }
        Msg::UploadCompleted { job_id, video_id } => state.apply_upload_complete(job_id, video_id),
        Msg::UploadFailed { job_id, message } => {
            state.fail(job_id, format!("Upload failed: {message}"), false)
        }
        Msg::StatusReceived {
            job_id,
            enhancement,
            metadata,
        } => {
            state.apply_status(job_id, enhancement, metadata);
            Vec::new()
        }
        Msg::ProcessingCompleted {
            job_id,
            metadata,
            enhanced_video_url,
            completed_at,
        } => {
            state.apply_completion(job_id, metadata, enhanced_video_url, completed_at);
            Vec::new()
        }
        Msg::ChannelFailed { job_id, failure } => {
            let message = match failure {
                ChannelFailure::Timeout => TIMEOUT_MESSAGE.to_string(),
                ChannelFailure::Transport(detail) => format!("Connection error: {detail}"),
            };
            state.fail(job_id, message, true)
        }
        Msg::ChannelClosed { job_id } => {
            let held = state.release_channel(job_id);
            if held && state.is_processing(job_id) {
                state.fail(
                    job_id,
                    "Connection error: channel closed before processing finished".to_string(),
                    true,
                )
            } else {
                Vec::new()
            }
        }
        Msg::ResetClicked => state.reset(),
        Msg::HistorySelected { id } => match state.show_history(&id) {
            Some(effects) => effects,
            None => {
                enhancer_debug!("history entry {} not found", id);
                Vec::new()
            }
        },
        Msg::DownloadClicked => match state.result_filename() {
            Some(Some(filename)) => state.start_download(filename).into_iter().collect(),
            Some(None) => {
                state.report_error("Download failed: result has no video file");
                Vec::new()
            }
            None => Vec::new(),
        },
        Msg::DownloadFinished {
            job_id,
            filename,
            result,
        } => {
            state.finish_download(job_id, &filename, result);
            Vec::new()
        }
        Msg::ErrorDismissed => {
            state.dismiss_error();
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
