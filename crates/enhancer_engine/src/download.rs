use std::path::PathBuf;

use enhancer_logging::enhancer_info;
use futures_util::StreamExt;

use crate::upload::{build_client, map_reqwest_error};
use crate::{
    AtomicFileWriter, FailureKind, PersistError, ServiceEndpoints, TransferError, UploadSettings,
};

/// Saves enhanced videos from `GET /download/{filename}` into the output directory.
#[derive(Debug, Clone)]
pub struct ReqwestDownloader {
    settings: UploadSettings,
    endpoints: ServiceEndpoints,
    output_dir: PathBuf,
}

impl ReqwestDownloader {
    pub fn new(settings: UploadSettings, endpoints: ServiceEndpoints, output_dir: PathBuf) -> Self {
        Self {
            settings,
            endpoints,
            output_dir,
        }
    }

    pub async fn download(&self, filename: &str) -> Result<PathBuf, TransferError> {
        let writer = AtomicFileWriter::new(self.output_dir.clone());
        let mut pending = writer.begin(filename).map_err(persist_error)?;

        let client = build_client(&self.settings)?;
        let url = self.endpoints.download_url(filename);
        let response = client.get(url.clone()).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            pending.write_chunk(&chunk).map_err(persist_error)?;
            written += chunk.len() as u64;
        }

        let saved = pending.commit().map_err(persist_error)?;
        enhancer_info!("downloaded {} ({} bytes) to {:?}", url, written, saved);
        Ok(saved)
    }
}

fn persist_error(err: PersistError) -> TransferError {
    let kind = match err {
        PersistError::InvalidFilename(_) => FailureKind::InvalidRequest,
        PersistError::OutputDir(_) | PersistError::Io(_) => FailureKind::Io,
    };
    TransferError::new(kind, err.to_string())
}
