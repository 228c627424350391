#![deny(missing_docs)]
//! Shared logging utilities for the enhancer workspace.
//!
//! This crate provides the `enhancer_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the job context of the calling thread, so a log line emitted
//! while a job is live reads `[job 3] ...` and one emitted outside of any job
//! reads `[-] ...`.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

thread_local! {
    /// Thread-local storage for the job currently being handled on this thread.
    static JOB_CONTEXT: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Sets the job context for the current thread.
/// The app loop calls this whenever the live job changes.
pub fn set_job_context(job_id: u64) {
    JOB_CONTEXT.with(|v| v.set(Some(job_id)));
}

/// Clears the job context for the current thread.
pub fn clear_job_context() {
    JOB_CONTEXT.with(|v| v.set(None));
}

/// Retrieves the job context for the current thread, if any.
pub fn job_context() -> Option<u64> {
    JOB_CONTEXT.with(|v| v.get())
}

/// Renders the log prefix for the current job context.
pub fn job_context_label() -> String {
    match job_context() {
        Some(job_id) => format!("[job {job_id}]"),
        None => "[-]".to_string(),
    }
}

/// Scoped job context: sets the context on creation and restores the previous
/// one when dropped.
pub struct JobContextGuard {
    previous: Option<u64>,
}

impl JobContextGuard {
    /// Enters the context of `job_id` until the guard is dropped.
    pub fn enter(job_id: u64) -> Self {
        let previous = job_context();
        set_job_context(job_id);
        Self { previous }
    }
}

impl Drop for JobContextGuard {
    fn drop(&mut self) {
        JOB_CONTEXT.with(|v| v.set(self.previous));
    }
}

/// Future that runs every poll of `inner` inside the context of one job.
///
/// Async tasks hop between runtime worker threads, so the thread-local context
/// set by whoever spawned them does not follow. Wrapping the task restores it
/// on each poll.
pub struct InJobContext<F> {
    job_id: u64,
    inner: Pin<Box<F>>,
}

impl<F: Future> Future for InJobContext<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _guard = JobContextGuard::enter(self.job_id);
        self.inner.as_mut().poll(cx)
    }
}

/// Adds [`JobContextExt::in_job_context`] to every future.
pub trait JobContextExt: Future + Sized {
    /// Tags everything logged while this future runs with `job_id`.
    fn in_job_context(self, job_id: u64) -> InJobContext<Self> {
        InJobContext {
            job_id,
            inner: Box::pin(self),
        }
    }
}

impl<F: Future> JobContextExt for F {}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! enhancer_trace {
    ($($arg:tt)*) => {{
        log::trace!("{} {}", $crate::job_context_label(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! enhancer_info {
    ($($arg:tt)*) => {{
        log::info!("{} {}", $crate::job_context_label(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! enhancer_debug {
    ($($arg:tt)*) => {{
        log::debug!("{} {}", $crate::job_context_label(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! enhancer_warn {
    ($($arg:tt)*) => {{
        log::warn!("{} {}", $crate::job_context_label(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! enhancer_error {
    ($($arg:tt)*) => {{
        log::error!("{} {}", $crate::job_context_label(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
