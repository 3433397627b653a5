//! Concurrent file transfers
//!
//! Every file gets its own task. The joint wait fails with the first error
//! to arrive; remaining tasks are detached, not aborted, and may still
//! finish in the background.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::JobOrchestrator;
use crate::api::MachineApi;
use crate::error::{ClientError, Result};

/// What [`JobOrchestrator::upload_files`] did with each path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Paths now present in the job's namespace, in request order
    pub uploaded: Vec<PathBuf>,
    /// Paths that did not exist locally
    pub skipped: Vec<PathBuf>,
}

impl<A> JobOrchestrator<A>
where
    A: MachineApi + ?Sized + 'static,
{
    /// Upload local files into the job's namespace, all at once
    ///
    /// Each file is stored under its own file name. A path that does not
    /// exist is logged and skipped rather than treated as an error. A path
    /// listed twice is uploaded once; two different paths sharing a file
    /// name are rejected before any upload starts.
    pub async fn upload_files<P: AsRef<Path>>(
        &self,
        job_id: &str,
        paths: &[P],
    ) -> Result<UploadReport> {
        let mut report = UploadReport::default();
        let mut pending = Vec::with_capacity(paths.len());
        let mut claimed: HashMap<String, PathBuf> = HashMap::new();

        for path in paths {
            let path = path.as_ref().to_path_buf();

            let exists = fs::try_exists(&path)
                .await
                .map_err(|e| ClientError::io(&path, e))?;
            if !exists {
                warn!(job_id, path = %path.display(), "Skipping upload of missing file");
                report.skipped.push(path);
                continue;
            }

            let remote_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
                .ok_or_else(|| {
                    ClientError::InvalidRequest(format!(
                        "cannot derive an upload name from '{}'",
                        path.display()
                    ))
                })?;

            match claimed.get(&remote_name) {
                Some(previous) if *previous == path => continue,
                Some(previous) => {
                    return Err(ClientError::InvalidRequest(format!(
                        "'{}' and '{}' would both be uploaded as '{}'",
                        previous.display(),
                        path.display(),
                        remote_name
                    )));
                }
                None => {
                    claimed.insert(remote_name.clone(), path.clone());
                    pending.push((path, remote_name));
                }
            }
        }

        let tasks = pending.into_iter().map(|(path, remote_name)| {
            let api = Arc::clone(&self.api);
            let job_id = job_id.to_string();
            tokio::spawn(async move {
                api.upload_file(&job_id, &remote_name, &path).await?;
                debug!(job_id = %job_id, remote_name = %remote_name, "Uploaded file");
                Ok::<_, ClientError>(path)
            })
        });

        report.uploaded = try_join_all(tasks.map(settle)).await?;

        info!(
            job_id,
            uploaded = report.uploaded.len(),
            skipped = report.skipped.len(),
            "Uploads finished"
        );
        Ok(report)
    }

    /// Download files from the job's namespace into `target_dir`, all at once
    ///
    /// `names` are paths relative to the namespace and keep their layout
    /// under `target_dir`. Returns the local paths in the order of `names`.
    pub async fn download_files(
        &self,
        job_id: &str,
        names: &[String],
        target_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        // Checked up front so a bad name starts no transfer at all.
        for name in names {
            ensure_relative(name)?;
        }

        let tasks = names.iter().map(|name| {
            let api = Arc::clone(&self.api);
            let job_id = job_id.to_string();
            let name = name.clone();
            let local_path = target_dir.join(&name);
            tokio::spawn(async move {
                api.download_file(&job_id, &name, &local_path).await?;
                debug!(job_id = %job_id, name = %name, "Downloaded file");
                Ok::<_, ClientError>(local_path)
            })
        });

        let fetched = try_join_all(tasks.map(settle)).await?;
        info!(job_id, files = fetched.len(), target = %target_dir.display(), "Downloads finished");
        Ok(fetched)
    }
}

/// Wait for a transfer task, passing its panic on to the caller
async fn settle<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(ClientError::protocol(format!("transfer task stopped: {e}"))),
    }
}

/// Reject remote names that would land outside the target directory
fn ensure_relative(name: &str) -> Result<()> {
    let mut named = false;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            _ => {
                named = false;
                break;
            }
        }
    }

    if named {
        Ok(())
    } else {
        Err(ClientError::protocol(format!(
            "refusing to download '{name}' outside the target directory"
        )))
    }
}
