//! Enhancer core: pure upload/processing state machine and view-model helpers.
mod effect;
mod error_slot;
mod history;
mod msg;
mod progress;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::Effect;
pub use error_slot::ErrorSlot;
pub use history::{HistoryCache, HistoryEntry, HISTORY_CAPACITY};
pub use msg::{ChannelFailure, Msg};
pub use progress::{
    upload_band_percent, ProgressSnapshot, COMPLETE_PROGRESS, PARTIAL_STATUS_PROGRESS,
    UPLOAD_BAND_END, UPLOAD_BAND_START,
};
pub use state::{AppState, Job, JobId, JobOrigin, JobState, Metadata};
pub use update::{update, TIMEOUT_MESSAGE};
pub use validate::{
    validate, CandidateFile, Rejection, Validation, ACCEPTED_MEDIA_TYPES, FORMAT_REJECTION,
    MAX_UPLOAD_BYTES, SIZE_REJECTION,
};
pub use view_model::{media_filename, AppViewModel, HistoryRowView, JobView, ResultView};
