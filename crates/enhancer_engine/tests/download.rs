use std::fs;

use enhancer_engine::{FailureKind, ReqwestDownloader, ServiceEndpoints, UploadSettings};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn downloader(server: &MockServer, dir: &TempDir) -> ReqwestDownloader {
    ReqwestDownloader::new(
        UploadSettings::default(),
        ServiceEndpoints::parse(&server.uri()).unwrap(),
        dir.path().join("downloads"),
    )
}

#[tokio::test]
async fn saves_result_into_output_dir() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/enhanced_abc123.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"enhanced-bytes".to_vec(), "video/mp4"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let saved = downloader(&server, &dir)
        .download("enhanced_abc123.mp4")
        .await
        .expect("download ok");

    assert_eq!(saved, dir.path().join("downloads").join("enhanced_abc123.mp4"));
    assert_eq!(fs::read(&saved).unwrap(), b"enhanced-bytes");
}

#[tokio::test]
async fn missing_result_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/missing.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader(&server, &dir)
        .download("missing.mp4")
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    let leftovers = fs::read_dir(dir.path().join("downloads")).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn unsafe_filename_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader(&server, &dir).download("..").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidRequest);
}
