use std::path::PathBuf;
use std::sync::Once;

use enhancer_core::{
    update, AppState, CandidateFile, ChannelFailure, Effect, JobState, Msg, ProgressSnapshot,
    FORMAT_REJECTION, SIZE_REJECTION,
};
use pretty_assertions::assert_eq;

const MIB: u64 = 1024 * 1024;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(enhancer_logging::initialize_for_tests);
}

fn candidate(filename: &str, size_bytes: u64, content_type: &str) -> CandidateFile {
    CandidateFile {
        path: PathBuf::from("/videos").join(filename),
        filename: filename.to_string(),
        size_bytes,
        content_type: Some(content_type.to_string()),
    }
}

fn submit(state: AppState, file: CandidateFile) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::FileSubmitted {
            file,
            submitted_at: "2026-10-18 09:00:00".to_string(),
        },
    )
}

fn submit_and_accept(state: AppState, video_id: &str) -> AppState {
    let (state, effects) = submit(state, candidate("clip.mp4", 5 * MIB, "video/mp4"));
    let job_id = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartUpload { job_id, .. } => Some(*job_id),
            _ => None,
        })
        .expect("upload effect");
    let (state, _) = update(
        state,
        Msg::UploadCompleted {
            job_id,
            video_id: video_id.to_string(),
        },
    );
    state
}

#[test]
fn oversized_file_is_rejected_without_upload() {
    init_logging();
    let (mut state, effects) = submit(AppState::new(), candidate("big.mp4", 600 * MIB, "video/mp4"));

    assert!(effects.is_empty());
    assert_eq!(state.phase(), JobState::Idle);
    assert_eq!(state.error(), Some(SIZE_REJECTION));
    assert!(state.history().is_empty());
    assert_eq!(state.progress().progress, 0);
    assert!(state.consume_dirty());
}

#[test]
fn unsupported_format_is_rejected() {
    init_logging();
    let (state, effects) = submit(AppState::new(), candidate("movie.mkv", MIB, "video/x-matroska"));

    assert!(effects.is_empty());
    assert_eq!(state.phase(), JobState::Idle);
    assert_eq!(state.error(), Some(FORMAT_REJECTION));
}

#[test]
fn accepted_file_starts_upload() {
    init_logging();
    let (state, effects) = submit(AppState::new(), candidate("clip.mov", 50 * MIB, "video/quicktime"));

    assert_eq!(
        effects,
        vec![Effect::StartUpload {
            job_id: 1,
            path: PathBuf::from("/videos/clip.mov"),
            filename: "clip.mov".to_string(),
            media_type: "video/quicktime".to_string(),
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, JobState::Uploading);
    assert!(view.progress.uploading);
    assert_eq!(view.progress.progress, 10);
    assert_eq!(view.job.as_ref().map(|job| job.created_at.as_str()), Some("2026-10-18 09:00:00"));
    assert_eq!(view.error, None);
}

#[test]
fn accepted_file_clears_previous_error() {
    init_logging();
    let (state, _) = submit(AppState::new(), candidate("big.mp4", 600 * MIB, "video/mp4"));
    assert!(state.error().is_some());

    let (state, _) = submit(state, candidate("clip.mp4", MIB, "video/mp4"));
    assert_eq!(state.error(), None);
    assert_eq!(state.phase(), JobState::Uploading);
}

#[test]
fn rejected_file_leaves_live_job_running() {
    init_logging();
    let state = submit_and_accept(AppState::new(), "abc123");
    let (state, effects) = submit(state, candidate("notes.txt", 10, "text/plain"));

    assert!(effects.is_empty());
    assert_eq!(state.phase(), JobState::Processing);
    assert_eq!(state.channel_job(), Some(1));
    assert_eq!(state.error(), Some(FORMAT_REJECTION));
}

#[test]
fn reset_during_upload_cancels_request() {
    init_logging();
    let (state, _) = submit(AppState::new(), candidate("clip.mp4", MIB, "video/mp4"));
    let (state, effects) = update(state, Msg::ResetClicked);

    assert_eq!(effects, vec![Effect::CancelUpload { job_id: 1 }]);
    assert_eq!(state.phase(), JobState::Idle);
    assert_eq!(state.progress().progress, 0);
    assert!(state.job().is_none());
}

#[test]
fn reset_during_processing_closes_channel() {
    init_logging();
    let state = submit_and_accept(AppState::new(), "abc123");
    let (state, effects) = update(state, Msg::ResetClicked);

    assert_eq!(effects, vec![Effect::CloseChannel { job_id: 1 }]);
    assert_eq!(state.phase(), JobState::Idle);
    assert_eq!(state.channel_job(), None);

    // Late frames from the torn-down channel are ignored.
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            job_id: 1,
            enhancement: true,
            metadata: true,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), JobState::Idle);
    assert_eq!(state.progress().progress, 0);
}

#[test]
fn reset_after_failure_clears_error_and_progress() {
    init_logging();
    let state = submit_and_accept(AppState::new(), "abc123");
    let (state, _) = update(
        state,
        Msg::ChannelFailed {
            job_id: 1,
            failure: ChannelFailure::Transport("reset by peer".to_string()),
        },
    );
    assert_eq!(state.phase(), JobState::Failed);
    assert_eq!(state.progress().progress, 50);

    let (state, effects) = update(state, Msg::ResetClicked);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), JobState::Idle);
    assert_eq!(state.error(), None);
    assert_eq!(state.progress(), ProgressSnapshot::default());
}

#[test]
fn new_submission_tears_down_previous_job() {
    init_logging();
    let state = submit_and_accept(AppState::new(), "abc123");
    let (state, effects) = submit(state, candidate("second.webm", MIB, "video/webm"));

    assert_eq!(
        effects,
        vec![
            Effect::CloseChannel { job_id: 1 },
            Effect::StartUpload {
                job_id: 2,
                path: PathBuf::from("/videos/second.webm"),
                filename: "second.webm".to_string(),
                media_type: "video/webm".to_string(),
            },
        ]
    );
    assert_eq!(state.phase(), JobState::Uploading);
    assert_eq!(state.progress().progress, 10);

    // Completion for the discarded job must not leak into the new one.
    let (state, _) = update(
        state,
        Msg::UploadCompleted {
            job_id: 1,
            video_id: "stale".to_string(),
        },
    );
    assert_eq!(state.phase(), JobState::Uploading);
    assert_eq!(state.job().and_then(|job| job.video_id.clone()), None);
}

#[test]
fn dismiss_clears_only_the_error() {
    init_logging();
    let (state, _) = submit(AppState::new(), candidate("big.mp4", 600 * MIB, "video/mp4"));
    let before_phase = state.phase();
    let (mut state, effects) = update(state, Msg::ErrorDismissed);

    assert!(effects.is_empty());
    assert_eq!(state.error(), None);
    assert_eq!(state.phase(), before_phase);
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::ErrorDismissed);
    assert!(!state.consume_dirty());
}
