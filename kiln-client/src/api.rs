//! Machine API abstraction
//!
//! The job orchestrator only needs a handful of machine operations. They are
//! behind a trait so the lifecycle logic can run against [`MachineClient`]
//! or an in-memory double.

use std::path::Path;

use async_trait::async_trait;
use kiln_core::{JobInfo, JobOrder, JobReport};

use crate::MachineClient;
use crate::error::Result;

/// Operations the job orchestrator performs against a machine
#[async_trait]
pub trait MachineApi: Send + Sync {
    /// Identity under which jobs are looked up
    fn client_id(&self) -> &str;

    /// Submits a job order
    async fn create_job(&self, order: &JobOrder) -> Result<()>;

    /// Fetches the current job summary
    async fn job_info(&self, job_id: &str) -> Result<JobInfo>;

    /// Fetches the job's execution report
    async fn job_report(&self, job_id: &str) -> Result<JobReport>;

    async fn run_job(&self, job_id: &str) -> Result<()>;

    async fn cancel_job(&self, job_id: &str) -> Result<()>;

    async fn delete_job(&self, job_id: &str) -> Result<()>;

    /// Uploads `local_path` into the job's namespace as `remote_name`
    async fn upload_file(&self, job_id: &str, remote_name: &str, local_path: &Path) -> Result<()>;

    /// Downloads `remote_name` from the job's namespace to `local_path`
    async fn download_file(&self, job_id: &str, remote_name: &str, local_path: &Path)
    -> Result<()>;
}

#[async_trait]
impl MachineApi for MachineClient {
    fn client_id(&self) -> &str {
        MachineClient::client_id(self)
    }

    async fn create_job(&self, order: &JobOrder) -> Result<()> {
        MachineClient::create_job(self, order).await
    }

    async fn job_info(&self, job_id: &str) -> Result<JobInfo> {
        self.get_job(job_id).await
    }

    async fn job_report(&self, job_id: &str) -> Result<JobReport> {
        self.get_job_report(job_id).await
    }

    async fn run_job(&self, job_id: &str) -> Result<()> {
        MachineClient::run_job(self, job_id).await
    }

    async fn cancel_job(&self, job_id: &str) -> Result<()> {
        MachineClient::cancel_job(self, job_id).await
    }

    async fn delete_job(&self, job_id: &str) -> Result<()> {
        MachineClient::delete_job(self, job_id).await
    }

    async fn upload_file(&self, job_id: &str, remote_name: &str, local_path: &Path) -> Result<()> {
        MachineClient::upload_file(self, job_id, remote_name, local_path).await
    }

    async fn download_file(
        &self,
        job_id: &str,
        remote_name: &str,
        local_path: &Path,
    ) -> Result<()> {
        MachineClient::download_file(self, job_id, remote_name, local_path).await
    }
}
