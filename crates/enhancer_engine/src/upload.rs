use std::sync::mpsc;
use std::sync::Arc;

use enhancer_logging::{enhancer_debug, enhancer_info};
use bytes::Bytes;
use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use crate::{
    EngineEvent, FailureKind, JobId, ServiceEndpoints, TransferError, UploadReceipt,
    UploadRequest, UploadSettings,
};

/// Receives engine events as they happen.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    /// Sends the file and returns the server-assigned video id. Emits
    /// `EngineEvent::UploadProgress` as bytes leave the process.
    async fn upload(
        &self,
        job_id: JobId,
        request: &UploadRequest,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<UploadReceipt, TransferError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    settings: UploadSettings,
    endpoints: ServiceEndpoints,
}

impl ReqwestUploader {
    pub fn new(settings: UploadSettings, endpoints: ServiceEndpoints) -> Self {
        Self {
            settings,
            endpoints,
        }
    }
}

pub(crate) fn build_client(settings: &UploadSettings) -> Result<reqwest::Client, TransferError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| TransferError::new(FailureKind::Network, err.to_string()))
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(
        &self,
        job_id: JobId,
        request: &UploadRequest,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<UploadReceipt, TransferError> {
        let client = build_client(&self.settings)?;
        let file = tokio::fs::File::open(&request.path)
            .await
            .map_err(|err| TransferError::new(FailureKind::Io, err.to_string()))?;
        let total = file
            .metadata()
            .await
            .map_err(|err| TransferError::new(FailureKind::Io, err.to_string()))?
            .len();

        sink.emit(EngineEvent::UploadProgress {
            job_id,
            sent: 0,
            total,
        });

        let progress_sink = sink.clone();
        let mut sent = 0u64;
        let body = ReaderStream::with_capacity(file, self.settings.chunk_size).inspect_ok(
            move |chunk: &Bytes| {
                sent += chunk.len() as u64;
                progress_sink.emit(EngineEvent::UploadProgress { job_id, sent, total });
            },
        );

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(request.filename.clone())
            .mime_str(&request.media_type)
            .map_err(|err| TransferError::new(FailureKind::InvalidRequest, err.to_string()))?;
        let form = Form::new().part("file", part);

        let url = self.endpoints.upload_url();
        enhancer_info!(
            "job {} uploading {} ({} bytes) to {}",
            job_id,
            request.filename,
            total,
            url
        );
        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let receipt: UploadReceipt = serde_json::from_slice(&body)
            .map_err(|err| TransferError::new(FailureKind::InvalidResponse, err.to_string()))?;
        if receipt.video_id.is_empty() {
            return Err(TransferError::new(
                FailureKind::InvalidResponse,
                "empty video_id",
            ));
        }
        enhancer_debug!("job {} received video id {}", job_id, receipt.video_id);
        Ok(receipt)
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransferError {
    if err.is_timeout() {
        return TransferError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return TransferError::new(FailureKind::InvalidRequest, err.to_string());
    }
    TransferError::new(FailureKind::Network, err.to_string())
}
