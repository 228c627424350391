use std::sync::mpsc;
use std::thread;

use chrono::Local;
use enhancer_core::{ChannelFailure, Effect, Msg};
use enhancer_engine::{
    ChannelError, ChannelEvent, EngineConfig, EngineError, EngineEvent, EngineHandle,
    ServiceEndpoints, UploadRequest,
};
use enhancer_logging::{enhancer_info, enhancer_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    /// Starts the engine and forwards its events to `msg_tx` as core messages.
    pub fn new<T>(config: EngineConfig, msg_tx: mpsc::Sender<T>) -> Result<Self, EngineError>
    where
        T: From<Msg> + Send + 'static,
    {
        let (engine, events) = EngineHandle::spawn(config)?;
        spawn_event_loop(events, msg_tx);
        Ok(Self { engine })
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        self.engine.endpoints()
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartUpload {
                    job_id,
                    path,
                    filename,
                    media_type,
                } => {
                    enhancer_info!("StartUpload job_id={} file={}", job_id, filename);
                    self.engine.upload(
                        job_id,
                        UploadRequest {
                            path,
                            filename,
                            media_type,
                        },
                    );
                }
                Effect::CancelUpload { job_id } => self.engine.cancel_upload(job_id),
                Effect::OpenChannel { job_id, video_id } => {
                    enhancer_info!("OpenChannel job_id={} video_id={}", job_id, video_id);
                    self.engine.open_channel(job_id, video_id);
                }
                Effect::CloseChannel { job_id } => self.engine.close_channel(job_id),
                Effect::DownloadResult { job_id, filename } => {
                    self.engine.download(job_id, filename)
                }
            }
        }
    }
}

fn spawn_event_loop<T>(events: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<T>)
where
    T: From<Msg> + Send + 'static,
{
    thread::spawn(move || {
        for event in events {
            let msg = map_event(event, timestamp);
            if msg_tx.send(T::from(msg)).is_err() {
                break;
            }
        }
    });
}

pub(crate) fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Translates an engine event into the message the core understands.
pub(crate) fn map_event(event: EngineEvent, now: impl Fn() -> String) -> Msg {
    match event {
        EngineEvent::UploadProgress {
            job_id,
            sent,
            total,
        } => Msg::UploadProgress {
            job_id,
            sent,
            total,
        },
        EngineEvent::UploadFinished { job_id, result } => match result {
            Ok(receipt) => Msg::UploadCompleted {
                job_id,
                video_id: receipt.video_id,
            },
            Err(err) => {
                enhancer_warn!("Upload of job {} failed: {}", job_id, err);
                Msg::UploadFailed {
                    job_id,
                    message: err.to_string(),
                }
            }
        },
        EngineEvent::Channel { job_id, event } => match event {
            ChannelEvent::Progress {
                enhancement,
                metadata,
            } => Msg::StatusReceived {
                job_id,
                enhancement,
                metadata,
            },
            ChannelEvent::Completion {
                metadata,
                enhanced_video_url,
            } => Msg::ProcessingCompleted {
                job_id,
                metadata,
                enhanced_video_url,
                completed_at: now(),
            },
            ChannelEvent::Error(err) => Msg::ChannelFailed {
                job_id,
                failure: match err {
                    ChannelError::Timeout => ChannelFailure::Timeout,
                    ChannelError::Transport(detail) => ChannelFailure::Transport(detail),
                },
            },
            ChannelEvent::Closed => Msg::ChannelClosed { job_id },
        },
        EngineEvent::DownloadFinished {
            job_id,
            filename,
            result,
        } => Msg::DownloadFinished {
            job_id,
            filename,
            result: result
                .map(|path| path.display().to_string())
                .map_err(|err| err.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use enhancer_engine::{FailureKind, TransferError, UploadReceipt};
    use serde_json::json;

    use super::*;

    fn fixed_clock() -> String {
        "2026-01-02 03:04:05".to_string()
    }

    #[test]
    fn upload_outcomes_map_to_core_messages() {
        let done = map_event(
            EngineEvent::UploadFinished {
                job_id: 4,
                result: Ok(UploadReceipt {
                    video_id: "abc123".to_string(),
                }),
            },
            fixed_clock,
        );
        assert_eq!(
            done,
            Msg::UploadCompleted {
                job_id: 4,
                video_id: "abc123".to_string()
            }
        );

        let failed = map_event(
            EngineEvent::UploadFinished {
                job_id: 4,
                result: Err(TransferError {
                    kind: FailureKind::HttpStatus(413),
                    message: "Payload Too Large".to_string(),
                }),
            },
            fixed_clock,
        );
        assert_eq!(
            failed,
            Msg::UploadFailed {
                job_id: 4,
                message: "http status 413: Payload Too Large".to_string()
            }
        );
    }

    #[test]
    fn channel_events_map_to_core_messages() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("fps".to_string(), json!(30));

        let completed = map_event(
            EngineEvent::Channel {
                job_id: 2,
                event: ChannelEvent::Completion {
                    metadata: metadata.clone(),
                    enhanced_video_url: Some("/static/out.mp4".to_string()),
                },
            },
            fixed_clock,
        );
        assert_eq!(
            completed,
            Msg::ProcessingCompleted {
                job_id: 2,
                metadata,
                enhanced_video_url: Some("/static/out.mp4".to_string()),
                completed_at: fixed_clock(),
            }
        );

        let timeout = map_event(
            EngineEvent::Channel {
                job_id: 2,
                event: ChannelEvent::Error(ChannelError::Timeout),
            },
            fixed_clock,
        );
        assert_eq!(
            timeout,
            Msg::ChannelFailed {
                job_id: 2,
                failure: ChannelFailure::Timeout
            }
        );

        let closed = map_event(
            EngineEvent::Channel {
                job_id: 2,
                event: ChannelEvent::Closed,
            },
            fixed_clock,
        );
        assert_eq!(closed, Msg::ChannelClosed { job_id: 2 });
    }

    #[test]
    fn download_outcome_carries_path_or_detail() {
        let saved = map_event(
            EngineEvent::DownloadFinished {
                job_id: 9,
                filename: "out.mp4".to_string(),
                result: Ok(PathBuf::from("downloads/out.mp4")),
            },
            fixed_clock,
        );
        assert_eq!(
            saved,
            Msg::DownloadFinished {
                job_id: 9,
                filename: "out.mp4".to_string(),
                result: Ok("downloads/out.mp4".to_string()),
            }
        );
    }
}
