pub const PROMPT: &str = "> ";
pub const PROGRESS_BAR_WIDTH: usize = 40;

/// Interval between render ticks. Upload progress arrives per chunk, so
/// redraws are coalesced on this beat.
pub const RENDER_INTERVAL_MS: u64 = 100;

pub const HELP_TEXT: &str = "\
commands:
  upload <path>   upload a video for enhancement
  reset           cancel the current job or clear its result
  history         list recent uploads
  select <id>     show a recent upload by video id
  download        save the enhanced video to the output directory
  dismiss         clear the error message
  help            show this text
  quit            exit";
