use std::sync::Arc;

use enhancer_logging::{enhancer_debug, enhancer_info, enhancer_warn, JobContextExt};
use futures_util::{Stream, StreamExt};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::frame::parse_frame;
use crate::{ChannelError, ChannelEvent, ChannelSettings, EngineEvent, JobId, ProgressSink};

/// Handle to the push channel of one job. Dropping the handle closes it.
pub struct JobChannel {
    job_id: JobId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl JobChannel {
    /// Connects to `url` on `runtime` and forwards parsed frames to `sink`
    /// until completion, failure, the processing deadline, or [`JobChannel::close`].
    pub fn open(
        runtime: &Handle,
        job_id: JobId,
        url: Url,
        settings: ChannelSettings,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = runtime.spawn(
            run_channel(job_id, url, settings, cancel.clone(), sink).in_job_context(job_id),
        );
        Self {
            job_id,
            cancel,
            task,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for JobChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The single channel the engine keeps open at any time.
#[derive(Default)]
pub struct ChannelSlot {
    active: Option<JobChannel>,
}

impl ChannelSlot {
    /// Opens a channel for `job_id`, closing whatever channel was open before.
    pub fn open(
        &mut self,
        runtime: &Handle,
        job_id: JobId,
        url: Url,
        settings: ChannelSettings,
        sink: Arc<dyn ProgressSink>,
    ) {
        if let Some(previous) = self.active.take() {
            enhancer_debug!(
                "closing channel of job {} before opening job {}",
                previous.job_id(),
                job_id
            );
            previous.close();
        }
        self.active = Some(JobChannel::open(runtime, job_id, url, settings, sink));
    }

    /// Closes the channel if it still belongs to `job_id`.
    pub fn close(&mut self, job_id: JobId) -> bool {
        match self.active.take() {
            Some(channel) if channel.job_id() == job_id => {
                channel.close();
                true
            }
            other => {
                self.active = other;
                false
            }
        }
    }

    pub fn close_all(&mut self) {
        if let Some(channel) = self.active.take() {
            channel.close();
        }
    }

    /// Job whose channel is still running.
    pub fn active_job(&self) -> Option<JobId> {
        self.active
            .as_ref()
            .filter(|channel| !channel.is_finished())
            .map(JobChannel::job_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PumpOutcome {
    Completed,
    Cancelled,
    Failed(ChannelError),
}

async fn run_channel(
    job_id: JobId,
    url: Url,
    settings: ChannelSettings,
    cancel: CancellationToken,
    sink: Arc<dyn ProgressSink>,
) {
    // The deadline covers connecting as well as waiting for frames.
    let deadline = Instant::now() + settings.processing_timeout;
    enhancer_info!("job {} opening channel {}", job_id, url);

    let connect = tokio::time::timeout(
        settings.connect_timeout,
        tokio_tungstenite::connect_async(url.as_str()),
    );
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => PumpOutcome::Cancelled,
        _ = tokio::time::sleep_until(deadline) => PumpOutcome::Failed(ChannelError::Timeout),
        connected = connect => match connected {
            Ok(Ok((mut stream, _response))) => {
                enhancer_debug!("job {} channel connected", job_id);
                let outcome = pump(job_id, &mut stream, deadline, &cancel, sink.as_ref()).await;
                let _ = stream.close(None).await;
                outcome
            }
            Ok(Err(err)) => PumpOutcome::Failed(ChannelError::Transport(err.to_string())),
            Err(_) => PumpOutcome::Failed(ChannelError::Transport(
                "timed out connecting to push channel".to_string(),
            )),
        },
    };

    match outcome {
        PumpOutcome::Completed => enhancer_info!("job {} channel finished", job_id),
        PumpOutcome::Cancelled => enhancer_debug!("job {} channel closed on request", job_id),
        PumpOutcome::Failed(err) => {
            enhancer_warn!("job {} channel failed: {}", job_id, err);
            sink.emit(EngineEvent::Channel {
                job_id,
                event: ChannelEvent::Error(err),
            });
        }
    }
    sink.emit(EngineEvent::Channel {
        job_id,
        event: ChannelEvent::Closed,
    });
}

/// Reads frames until a completion arrives or the channel has to stop.
/// Nothing is read after the completion frame.
pub(crate) async fn pump<S>(
    job_id: JobId,
    stream: &mut S,
    deadline: Instant,
    cancel: &CancellationToken,
    sink: &dyn ProgressSink,
) -> PumpOutcome
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let expiry = tokio::time::sleep_until(deadline);
    tokio::pin!(expiry);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PumpOutcome::Cancelled,
            _ = &mut expiry => return PumpOutcome::Failed(ChannelError::Timeout),
            next = stream.next() => match next {
                Some(Ok(message)) => {
                    let Some(event) = decode_message(job_id, message) else {
                        continue;
                    };
                    let completed = matches!(event, ChannelEvent::Completion { .. });
                    sink.emit(EngineEvent::Channel { job_id, event });
                    if completed {
                        return PumpOutcome::Completed;
                    }
                }
                Some(Err(err)) => {
                    return PumpOutcome::Failed(ChannelError::Transport(err.to_string()));
                }
                None => {
                    return PumpOutcome::Failed(ChannelError::Transport(
                        "channel closed by server before processing finished".to_string(),
                    ));
                }
            },
        }
    }
}

fn decode_message(job_id: JobId, message: Message) -> Option<ChannelEvent> {
    let text = match &message {
        Message::Text(text) => text.as_str(),
        Message::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                enhancer_warn!("job {} dropped non-UTF-8 binary frame", job_id);
                return None;
            }
        },
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => {
            return None;
        }
    };

    match parse_frame(text) {
        Ok(Some(event)) => Some(event),
        Ok(None) => {
            enhancer_debug!("job {} ignored frame {}", job_id, text);
            None
        }
        Err(err) => {
            enhancer_warn!("job {} dropped malformed frame ({}): {}", job_id, err, text);
            None
        }
    }
}
