//! Result file retrieval

use std::path::{Path, PathBuf};

use tracing::info;

use super::JobOrchestrator;
use crate::api::MachineApi;
use crate::error::Result;

impl<A> JobOrchestrator<A>
where
    A: MachineApi + ?Sized + 'static,
{
    /// Download every file listed by the job's delivery step
    ///
    /// Fails with a protocol error when the job is not `done`, has no
    /// delivery step, or the delivery lists no files.
    pub async fn fetch_result_files(&self, job_id: &str, target_dir: &Path) -> Result<Vec<PathBuf>> {
        let report = self.api.job_report(job_id).await?;
        let names = report.delivery_files()?;

        info!(job_id, files = names.len(), "Fetching result files");
        self.download_files(job_id, &names, target_dir).await
    }

    /// Wait for the job to finish, then fetch its result files
    ///
    /// A job that ends in `error` or `cancelled` is not `done`, so the fetch
    /// reports that as a protocol error.
    pub async fn wait_fetch_result_files(
        &self,
        job_id: &str,
        target_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        self.wait_done(job_id).await?;
        self.fetch_result_files(job_id, target_dir).await
    }
}
