//! Enhancer engine: upload, push channel and download IO for the enhancement service.
mod channel;
mod config;
mod download;
mod endpoints;
mod engine;
mod frame;
mod persist;
mod types;
mod upload;

pub use channel::{ChannelSlot, JobChannel};
pub use config::{ChannelSettings, EngineConfig, UploadSettings};
pub use download::ReqwestDownloader;
pub use endpoints::{EndpointError, ServiceEndpoints};
pub use engine::{EngineError, EngineHandle};
pub use frame::{parse_frame, COMPLETION_SENTINEL};
pub use persist::{ensure_output_dir, AtomicFileWriter, PendingFile, PersistError};
pub use types::{
    ChannelError, ChannelEvent, EngineEvent, FailureKind, JobId, Metadata, TransferError,
    UploadReceipt, UploadRequest,
};
pub use upload::{ChannelProgressSink, ProgressSink, ReqwestUploader, Uploader};
