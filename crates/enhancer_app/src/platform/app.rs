use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use enhancer_core::{update, AppState, Msg};
use enhancer_logging::{clear_job_context, enhancer_info, enhancer_warn, set_job_context};

use super::config::{self, AppConfig};
use super::effects::{timestamp, EffectRunner};
use super::input::{parse_command, probe_candidate, Command};
use super::logging;
use super::ui::constants::{HELP_TEXT, PROMPT, RENDER_INTERVAL_MS};
use super::ui::render::{render, render_history};

/// Everything the main loop reacts to.
pub(crate) enum LoopEvent {
    Core(Msg),
    ShowHistory,
    ShowHelp,
    Quit,
}

impl From<Msg> for LoopEvent {
    fn from(msg: Msg) -> Self {
        LoopEvent::Core(msg)
    }
}

pub fn run_app() -> anyhow::Result<()> {
    let config_path = config::config_path();
    let (config, config_error) = match AppConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    logging::initialize(config.log_destination, config.level_filter());
    if let Some(err) = config_error {
        enhancer_warn!("{}; using defaults", err);
        eprintln!("Warning: {err}; using defaults");
    }

    let (loop_tx, loop_rx) = mpsc::channel::<LoopEvent>();
    let runner = EffectRunner::new(config.engine_config(), loop_tx.clone())
        .with_context(|| format!("cannot start engine for {}", config.server_url))?;
    enhancer_info!(
        "enhancer_app started against {}, saving results to {:?}",
        runner.endpoints().base(),
        config.output_dir
    );

    spawn_stdin_reader(loop_tx.clone());

    // Background tick to throttle rendering.
    thread::spawn(move || {
        let interval = Duration::from_millis(RENDER_INTERVAL_MS);
        while loop_tx.send(LoopEvent::Core(Msg::Tick)).is_ok() {
            thread::sleep(interval);
        }
    });

    println!("{HELP_TEXT}");
    let mut state = AppState::new();
    show(render(&state.view(), runner.endpoints()));

    for event in loop_rx {
        match event {
            LoopEvent::Core(Msg::Tick) => {
                if state.consume_dirty() {
                    show(render(&state.view(), runner.endpoints()));
                }
            }
            LoopEvent::Core(msg) => {
                let (next, effects) = update(state, msg);
                state = next;
                match state.job() {
                    Some(job) => set_job_context(job.job_id),
                    None => clear_job_context(),
                }
                runner.enqueue(effects);
            }
            LoopEvent::ShowHistory => show(render_history(&state.view())),
            LoopEvent::ShowHelp => show(HELP_TEXT.lines().map(str::to_string).collect()),
            LoopEvent::Quit => break,
        }
    }

    enhancer_info!("enhancer_app exiting");
    Ok(())
}

fn show(lines: Vec<String>) {
    let mut out = io::stdout().lock();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    let _ = write!(out, "{PROMPT}");
    let _ = out.flush();
}

fn spawn_stdin_reader(loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let event = match parse_command(&line) {
                Ok(Some(command)) => command_event(command),
                Ok(None) => None,
                Err(err) => {
                    eprintln!("{err}");
                    None
                }
            };
            if let Some(event) = event {
                let quit = matches!(event, LoopEvent::Quit);
                if loop_tx.send(event).is_err() || quit {
                    return;
                }
            }
        }
        // End of input ends the session.
        let _ = loop_tx.send(LoopEvent::Quit);
    });
}

fn command_event(command: Command) -> Option<LoopEvent> {
    let msg = match command {
        Command::Upload(path) => match probe_candidate(&path) {
            Ok(file) => Msg::FileSubmitted {
                file,
                submitted_at: timestamp(),
            },
            Err(err) => {
                eprintln!("cannot read {}: {}", path.display(), err);
                return None;
            }
        },
        Command::Reset => Msg::ResetClicked,
        Command::Select(id) => Msg::HistorySelected { id },
        Command::Download => Msg::DownloadClicked,
        Command::Dismiss => Msg::ErrorDismissed,
        Command::History => return Some(LoopEvent::ShowHistory),
        Command::Help => return Some(LoopEvent::ShowHelp),
        Command::Quit => return Some(LoopEvent::Quit),
    };
    Some(LoopEvent::Core(msg))
}
