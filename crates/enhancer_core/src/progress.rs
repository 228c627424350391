/// Start of the band reserved for the upload itself.
pub const UPLOAD_BAND_START: u8 = 10;
/// Progress once the upload has been acknowledged by the server.
pub const UPLOAD_BAND_END: u8 = 50;
/// Indeterminate mid-point while the server reports partial status.
pub const PARTIAL_STATUS_PROGRESS: u8 = 75;
pub const COMPLETE_PROGRESS: u8 = 100;

/// Derived progress view. `progress` only moves up; the single way back down
/// is replacing the snapshot with `ProgressSnapshot::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub uploading: bool,
    pub processing: bool,
    pub enhancement_done: bool,
    pub metadata_done: bool,
    pub progress: u8,
}

impl ProgressSnapshot {
    pub fn upload_started() -> Self {
        Self {
            uploading: true,
            progress: UPLOAD_BAND_START,
            ..Self::default()
        }
    }

    /// Snapshot shown for a finished result replayed from history.
    pub fn finished() -> Self {
        Self {
            enhancement_done: true,
            metadata_done: true,
            progress: COMPLETE_PROGRESS,
            ..Self::default()
        }
    }

    pub(crate) fn record_upload(&mut self, sent: u64, total: u64) -> bool {
        self.raise(upload_band_percent(sent, total))
    }

    pub(crate) fn upload_finished(&mut self) {
        self.uploading = false;
        self.processing = true;
        self.raise(UPLOAD_BAND_END);
    }

    pub(crate) fn record_status(&mut self, enhancement: bool, metadata: bool) -> bool {
        let before = *self;
        self.enhancement_done |= enhancement;
        self.metadata_done |= metadata;
        let target = if self.enhancement_done && self.metadata_done {
            COMPLETE_PROGRESS
        } else {
            PARTIAL_STATUS_PROGRESS
        };
        self.raise(target);
        *self != before
    }

    pub(crate) fn complete(&mut self) {
        *self = Self::finished();
    }

    /// Failure stops the activity flags but keeps the reached percentage.
    pub(crate) fn halt(&mut self) {
        self.uploading = false;
        self.processing = false;
    }

    fn raise(&mut self, target: u8) -> bool {
        let target = target.min(COMPLETE_PROGRESS);
        if target > self.progress {
            self.progress = target;
            true
        } else {
            false
        }
    }
}

/// Maps raw upload bytes into `[UPLOAD_BAND_START, UPLOAD_BAND_END)`.
pub fn upload_band_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return UPLOAD_BAND_START;
    }
    let span = u128::from(UPLOAD_BAND_END - UPLOAD_BAND_START);
    let scaled = span * u128::from(sent.min(total)) / u128::from(total);
    let percent = u128::from(UPLOAD_BAND_START) + scaled;
    // Anything up to the server acknowledgement stays below the band end.
    percent.min(u128::from(UPLOAD_BAND_END - 1)) as u8
}
