//! Job file endpoints
//!
//! Each job owns a file namespace at `{machine}/{jobId}/`. Files are streamed
//! in both directions so large meshes and textures never sit in memory.

use std::path::Path;

use futures::StreamExt;
use reqwest::{Body, Url};
use reqwest::header::CONTENT_LENGTH;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::MachineClient;
use crate::error::{ClientError, Result};

impl MachineClient {
    /// Upload a local file into the job's namespace as `remote_name`
    pub async fn upload_file(&self, job_id: &str, remote_name: &str, local_path: &Path) -> Result<()> {
        let file = File::open(local_path)
            .await
            .map_err(|e| ClientError::io(local_path, e))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| ClientError::io(local_path, e))?
            .len();

        debug!(job_id, remote_name, bytes = length, "Uploading file");

        let response = self
            .client
            .put(self.file_url(job_id, remote_name)?)
            .header(CONTENT_LENGTH, length)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    /// Download `remote_name` from the job's namespace to `local_path`
    ///
    /// Missing parent directories are created.
    pub async fn download_file(&self, job_id: &str, remote_name: &str, local_path: &Path) -> Result<()> {
        let response = self
            .client
            .get(self.file_url(job_id, remote_name)?)
            .send()
            .await?;
        let response = self.ensure_success(response).await?;

        if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::io(parent, e))?;
        }

        let mut file = File::create(local_path)
            .await
            .map_err(|e| ClientError::io(local_path, e))?;

        let mut written = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ClientError::io(local_path, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| ClientError::io(local_path, e))?;

        debug!(job_id, remote_name, bytes = written, "Downloaded file");
        Ok(())
    }

    /// `{machine}/{jobId}/{path...}` with every segment percent-encoded
    fn file_url(&self, job_id: &str, remote_name: &str) -> Result<Url> {
        let invalid = || {
            ClientError::InvalidRequest(format!(
                "cannot build a file URL from '{}' for job {}",
                self.base_url, job_id
            ))
        };

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(job_id)
            .extend(remote_name.split('/').filter(|part| !part.is_empty()));
        Ok(url)
    }
}
