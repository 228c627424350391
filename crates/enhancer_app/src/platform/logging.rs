//! Log sinks for the enhancer client.
//!
//! Stdout belongs to the status display and the command prompt, so log lines
//! go to `./enhancer.log` unless the config asks for the terminal as well.
//! Terminal logging uses stderr only, which keeps it out of redirected output.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use serde::Deserialize;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILENAME: &str = "./enhancer.log";

/// Dependency crates whose chatter would bury the per-job lines.
const QUIET_TARGETS: [&str; 4] = ["hyper", "reqwest", "tungstenite", "tokio_tungstenite"];

/// Where log lines go, as selected by `log_destination` in the config.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LogDestination {
    /// `./enhancer.log` only.
    #[default]
    File,
    /// Stderr only. Lines interleave with the status display.
    Terminal,
    /// Log file plus stderr.
    Both,
}

impl LogDestination {
    fn writes_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }

    fn writes_terminal(self) -> bool {
        matches!(self, Self::Terminal | Self::Both)
    }
}

/// Installs the global logger. A log file that cannot be created is reported
/// once on stderr and the client runs on without it.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if destination.writes_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if destination.writes_file() {
        match open_log_file(Path::new(LOG_FILENAME)) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => eprintln!("Warning: logging disabled, cannot create {LOG_FILENAME}: {err}"),
        }
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

fn build_config() -> Config {
    let mut builder = ConfigBuilder::new();
    builder
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error);
    for target in QUIET_TARGETS {
        builder.add_filter_ignore_str(target);
    }
    builder.build()
}

/// Each run starts a fresh log.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    File::create(path)
}
