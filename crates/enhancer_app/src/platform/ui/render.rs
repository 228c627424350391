use enhancer_core::{AppViewModel, JobState, ProgressSnapshot, ResultView};
use enhancer_engine::ServiceEndpoints;

use super::constants::PROGRESS_BAR_WIDTH;

/// Status block for the current view.
pub fn render(view: &AppViewModel, endpoints: &ServiceEndpoints) -> Vec<String> {
    let mut lines = Vec::new();

    let subject = view
        .job
        .as_ref()
        .map(|job| format!("  {} (job {})", job.filename, job.job_id))
        .unwrap_or_default();
    lines.push(format!(
        "{:<10} {} {:>3}%{}",
        phase_label(view.phase),
        progress_bar(view.progress.progress),
        view.progress.progress,
        subject
    ));

    if view.phase == JobState::Processing {
        lines.push(stage_line(&view.progress));
    }

    if let Some(result) = &view.result {
        lines.extend(render_result(result, endpoints));
    }
    if let Some(filename) = &view.downloading {
        lines.push(format!("Saving {filename} ..."));
    }
    if let Some(path) = &view.last_download {
        lines.push(format!("Saved to {path}"));
    }
    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}  (type `dismiss` to clear)"));
    }
    if view.phase.is_terminal() {
        lines.push("Type `upload <path>` for another video or `reset` to clear.".to_string());
    }
    if !view.history.is_empty() {
        lines.push(format!(
            "History: {} recent upload(s) (type `history` to list)",
            view.history.len()
        ));
    }
    lines
}

/// Recent uploads, newest first.
pub fn render_history(view: &AppViewModel) -> Vec<String> {
    if view.history.is_empty() {
        return vec!["No recent uploads.".to_string()];
    }
    view.history
        .iter()
        .map(|row| format!("{}  {}  {}", row.id, row.timestamp, row.filename))
        .collect()
}

fn render_result(result: &ResultView, endpoints: &ServiceEndpoints) -> Vec<String> {
    let origin = if result.from_history {
        " (from history)"
    } else {
        ""
    };
    let mut lines = vec![format!(
        "Enhanced {} [{}]{}",
        result.filename, result.video_id, origin
    )];

    if let Some(url) = result
        .video_url
        .as_deref()
        .and_then(|url| endpoints.playback_url(url))
    {
        lines.push(format!("  play:     {url}"));
    }
    if let Some(name) = &result.media_filename {
        lines.push(format!("  video:    {}", endpoints.video_url(name)));
        lines.push(format!("  download: {}", endpoints.download_url(name)));
    }
    if !result.metadata.is_empty() {
        let fields: Vec<String> = result
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        lines.push(format!("  metadata: {}", fields.join(", ")));
    }
    lines
}

fn phase_label(phase: JobState) -> &'static str {
    match phase {
        JobState::Idle => "Ready",
        JobState::Uploading => "Uploading",
        JobState::Processing => "Processing",
        JobState::Completed => "Completed",
        JobState::Failed => "Failed",
    }
}

fn stage_line(progress: &ProgressSnapshot) -> String {
    let mark = |done: bool| if done { "done" } else { "pending" };
    format!(
        "  enhancement: {}  metadata: {}",
        mark(progress.enhancement_done),
        mark(progress.metadata_done)
    )
}

fn progress_bar(percent: u8) -> String {
    let filled = PROGRESS_BAR_WIDTH * usize::from(percent.min(100)) / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}
