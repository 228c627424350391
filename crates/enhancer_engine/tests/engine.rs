use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use enhancer_engine::{
    ChannelError, ChannelEvent, EndpointError, EngineConfig, EngineError, EngineEvent,
    EngineHandle, UploadRequest,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, output_dir: PathBuf) -> EngineConfig {
    let mut config = EngineConfig {
        server_url: server.uri(),
        output_dir,
        ..EngineConfig::default()
    };
    config.channel.connect_timeout = Duration::from_secs(2);
    config
}

/// Drains events on a blocking thread until `done` matches one or `limit` passes.
async fn collect_events(
    events: mpsc::Receiver<EngineEvent>,
    limit: Duration,
    done: fn(&EngineEvent) -> bool,
) -> (mpsc::Receiver<EngineEvent>, Vec<EngineEvent>) {
    tokio::task::spawn_blocking(move || {
        let started = Instant::now();
        let mut seen = Vec::new();
        while let Some(left) = limit.checked_sub(started.elapsed()) {
            match events.recv_timeout(left) {
                Ok(event) => {
                    let finished = done(&event);
                    seen.push(event);
                    if finished {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        (events, seen)
    })
    .await
    .unwrap()
}

fn sample_video(dir: &TempDir) -> UploadRequest {
    let path = dir.path().join("clip.mp4");
    std::fs::write(&path, vec![7u8; 100 * 1024]).unwrap();
    UploadRequest {
        path,
        filename: "clip.mp4".to_string(),
        media_type: "video/mp4".to_string(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_reports_progress_then_video_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "video_id": "abc123" })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let (engine, events) = EngineHandle::spawn(config(&server, dir.path().join("out"))).unwrap();

    engine.upload(1, sample_video(&dir));
    let (_events, seen) = collect_events(events, Duration::from_secs(5), |event| {
        matches!(event, EngineEvent::UploadFinished { .. })
    })
    .await;

    let (last, progress) = seen.split_last().unwrap();
    assert!(!progress.is_empty());
    assert!(progress.iter().all(|event| matches!(
        event,
        EngineEvent::UploadProgress { job_id: 1, total, .. } if *total == 100 * 1024
    )));
    let EngineEvent::UploadFinished { job_id, result } = last else {
        panic!("expected upload result, got {last:?}");
    };
    assert_eq!(*job_id, 1);
    assert_eq!(result.as_ref().unwrap().video_id, "abc123");
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_upload_never_reports_a_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "video_id": "late" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let (engine, events) = EngineHandle::spawn(config(&server, dir.path().join("out"))).unwrap();

    engine.upload(2, sample_video(&dir));
    tokio::time::sleep(Duration::from_millis(200)).await;
    engine.cancel_upload(2);

    let (_events, seen) = collect_events(events, Duration::from_secs(3), |event| {
        matches!(event, EngineEvent::UploadFinished { .. })
    })
    .await;
    assert!(seen
        .iter()
        .all(|event| !matches!(event, EngineEvent::UploadFinished { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn channel_to_a_plain_http_server_fails_then_closes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (engine, events) = EngineHandle::spawn(config(&server, dir.path().join("out"))).unwrap();

    engine.open_channel(3, "abc123");
    let (_events, seen) = collect_events(events, Duration::from_secs(5), |event| {
        matches!(
            event,
            EngineEvent::Channel {
                event: ChannelEvent::Closed,
                ..
            }
        )
    })
    .await;

    assert_eq!(seen.len(), 2);
    assert!(matches!(
        &seen[0],
        EngineEvent::Channel {
            job_id: 3,
            event: ChannelEvent::Error(ChannelError::Transport(_))
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn download_saves_into_output_dir() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/enhanced_abc123.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"enhanced bytes".to_vec()))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("saved");
    let (engine, events) = EngineHandle::spawn(config(&server, output_dir.clone())).unwrap();

    engine.download(6, "enhanced_abc123.mp4");
    let (_events, seen) = collect_events(events, Duration::from_secs(5), |event| {
        matches!(event, EngineEvent::DownloadFinished { .. })
    })
    .await;

    let Some(EngineEvent::DownloadFinished {
        job_id,
        filename,
        result,
    }) = seen.last()
    else {
        panic!("no download result in {seen:?}");
    };
    assert_eq!(*job_id, 6);
    assert_eq!(filename, "enhanced_abc123.mp4");
    let saved = result.as_ref().unwrap();
    assert_eq!(saved, &output_dir.join("enhanced_abc123.mp4"));
    assert_eq!(std::fs::read(saved).unwrap(), b"enhanced bytes");
}

#[test]
fn rejects_non_http_server_urls() {
    let config = EngineConfig {
        server_url: "ftp://example.com".to_string(),
        ..EngineConfig::default()
    };
    let err = EngineHandle::spawn(config).err().unwrap();
    assert!(matches!(
        err,
        EngineError::Endpoint(EndpointError::UnsupportedScheme(scheme)) if scheme == "ftp"
    ));
}
