use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use enhancer_logging::{enhancer_debug, enhancer_info, JobContextExt, JobContextGuard};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use crate::upload::ChannelProgressSink;
use crate::{
    ChannelSettings, ChannelSlot, EndpointError, EngineConfig, EngineEvent, JobId, ProgressSink,
    ReqwestDownloader, ReqwestUploader, ServiceEndpoints, Uploader, UploadRequest,
};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] io::Error),
}

enum EngineCommand {
    Upload { job_id: JobId, request: UploadRequest },
    CancelUpload { job_id: JobId },
    OpenChannel { job_id: JobId, video_id: String },
    CloseChannel { job_id: JobId },
    Download { job_id: JobId, filename: String },
}

/// Front door of the IO engine. Commands run on a dedicated thread that owns
/// the tokio runtime, the in-flight upload and the single push channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    endpoints: ServiceEndpoints,
}

impl EngineHandle {
    /// Starts the engine thread. Events arrive on the returned receiver.
    pub fn spawn(config: EngineConfig) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let endpoints = ServiceEndpoints::parse(&config.server_url)?;
        let runtime = Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(event_tx));
        let uploader: Arc<dyn Uploader> = Arc::new(ReqwestUploader::new(
            config.upload.clone(),
            endpoints.clone(),
        ));
        let downloader = Arc::new(ReqwestDownloader::new(
            config.upload.clone(),
            endpoints.clone(),
            config.output_dir.clone(),
        ));
        let mut worker = EngineWorker {
            runtime: runtime.handle().clone(),
            endpoints: endpoints.clone(),
            channel_settings: config.channel.clone(),
            uploader,
            downloader,
            sink,
            upload: None,
            channel: ChannelSlot::default(),
        };

        thread::Builder::new()
            .name("enhancer-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    worker.handle(command);
                }
                worker.shutdown();
                drop(worker);
                runtime.shutdown_background();
            })?;

        Ok((Self { cmd_tx, endpoints }, event_rx))
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    pub fn upload(&self, job_id: JobId, request: UploadRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { job_id, request });
    }

    pub fn cancel_upload(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::CancelUpload { job_id });
    }

    pub fn open_channel(&self, job_id: JobId, video_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::OpenChannel {
            job_id,
            video_id: video_id.into(),
        });
    }

    pub fn close_channel(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::CloseChannel { job_id });
    }

    /// Saves the result file of `job_id` into the output directory.
    pub fn download(&self, job_id: JobId, filename: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            job_id,
            filename: filename.into(),
        });
    }
}

struct EngineWorker {
    runtime: Handle,
    endpoints: ServiceEndpoints,
    channel_settings: ChannelSettings,
    uploader: Arc<dyn Uploader>,
    downloader: Arc<ReqwestDownloader>,
    sink: Arc<dyn ProgressSink>,
    upload: Option<(JobId, JoinHandle<()>)>,
    channel: ChannelSlot,
}

impl EngineWorker {
    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Upload { job_id, request } => {
                let _context = JobContextGuard::enter(job_id);
                // One job at a time: a new upload supersedes any earlier one.
                if let Some((previous, task)) = self.upload.take() {
                    enhancer_debug!("aborting upload of job {}", previous);
                    task.abort();
                }
                let uploader = self.uploader.clone();
                let sink = self.sink.clone();
                let task = self.runtime.spawn(
                    async move {
                        let result = uploader.upload(job_id, &request, sink.clone()).await;
                        sink.emit(EngineEvent::UploadFinished { job_id, result });
                    }
                    .in_job_context(job_id),
                );
                self.upload = Some((job_id, task));
            }
            EngineCommand::CancelUpload { job_id } => {
                let _context = JobContextGuard::enter(job_id);
                match self.upload.take() {
                    Some((current, task)) if current == job_id => {
                        enhancer_info!("cancelling upload of job {}", job_id);
                        task.abort();
                    }
                    other => self.upload = other,
                }
            }
            EngineCommand::OpenChannel { job_id, video_id } => {
                let _context = JobContextGuard::enter(job_id);
                let url = self.endpoints.channel_url(&video_id);
                self.channel.open(
                    &self.runtime,
                    job_id,
                    url,
                    self.channel_settings.clone(),
                    self.sink.clone(),
                );
            }
            EngineCommand::CloseChannel { job_id } => {
                let _context = JobContextGuard::enter(job_id);
                if self.channel.close(job_id) {
                    enhancer_info!("closed channel of job {}", job_id);
                }
            }
            EngineCommand::Download { job_id, filename } => {
                let downloader = self.downloader.clone();
                let sink = self.sink.clone();
                self.runtime.spawn(
                    async move {
                        let result = downloader.download(&filename).await;
                        sink.emit(EngineEvent::DownloadFinished {
                            job_id,
                            filename,
                            result,
                        });
                    }
                    .in_job_context(job_id),
                );
            }
        }
    }

    fn shutdown(&mut self) {
        enhancer_debug!("engine shutting down");
        if let Some((_, task)) = self.upload.take() {
            task.abort();
        }
        self.channel.close_all();
    }
}
