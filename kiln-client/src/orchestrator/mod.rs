//! Job orchestration
//!
//! Drives a job through its lifecycle against a [`MachineApi`]:
//! - `submit`: validate → extract file parameters → create → wait until
//!   created → upload files
//! - `wait_done`, then `fetch_result_files` to collect the delivery
//!
//! The machine is the source of truth for job state; the orchestrator only
//! observes it by polling. Stages of a pipeline run strictly one after the
//! other, since files can only be uploaded once the job exists.

mod delivery;
mod poll;
mod transfer;

pub use transfer::UploadReport;

use std::path::PathBuf;
use std::sync::Arc;

use kiln_core::{JobInfo, JobOrder, JobReport, Recipe, file_parameters};
use tracing::info;

use crate::api::MachineApi;
use crate::config::PollConfig;
use crate::error::{ClientError, Result};

/// Outcome of a successful [`JobOrchestrator::submit`]
#[derive(Debug, Clone)]
pub struct Submission {
    pub job_id: String,
    /// Local files now present in the job's namespace
    pub uploaded: Vec<PathBuf>,
    /// File parameters naming files that do not exist locally
    pub skipped: Vec<PathBuf>,
}

/// Job lifecycle driver
pub struct JobOrchestrator<A: ?Sized> {
    api: Arc<A>,
    poll: PollConfig,
}

impl<A: ?Sized> Clone for JobOrchestrator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            poll: self.poll,
        }
    }
}

impl<A> JobOrchestrator<A>
where
    A: MachineApi + ?Sized + 'static,
{
    /// Fails with [`ClientError::InvalidRequest`] when `poll` has a zero
    /// interval or a creation deadline shorter than one interval
    pub fn new(api: Arc<A>, poll: PollConfig) -> Result<Self> {
        poll.validate().map_err(ClientError::InvalidRequest)?;
        Ok(Self { api, poll })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Draft an order for `recipe_id` under this client's identity
    pub fn new_order(&self, recipe_id: &str) -> JobOrder {
        JobOrder::new(self.api.client_id(), recipe_id)
    }

    // =============================================================================
    // Submission Pipeline
    // =============================================================================

    /// Validate, create and provision a job
    ///
    /// Validation happens before any request, so a bad parameter set has no
    /// effect on the machine. Once the job exists, the first failure of a
    /// later stage is returned unchanged. The job is left `created`; start it
    /// with [`run_job`](Self::run_job).
    pub async fn submit(&self, recipe: &Recipe, order: JobOrder) -> Result<Submission> {
        if order.recipe_id != recipe.id {
            return Err(ClientError::InvalidRequest(format!(
                "order is for recipe '{}' but was checked against '{}'",
                order.recipe_id, recipe.id
            )));
        }
        if order.client_id != self.api.client_id() {
            return Err(ClientError::InvalidRequest(format!(
                "order belongs to client '{}', not '{}'",
                order.client_id,
                self.api.client_id()
            )));
        }

        recipe.parameter_schema.validate(&order.parameters)?;
        let files = file_parameters(&recipe.parameter_schema, &order.parameters);

        let order = order.stamp();
        let job_id = order.id.clone();

        self.create_job(&order).await?;
        self.wait_created(&job_id).await?;
        let report = self.upload_files(&job_id, &files).await?;

        info!(
            job_id = %job_id,
            recipe = %recipe.id,
            uploaded = report.uploaded.len(),
            skipped = report.skipped.len(),
            "Job submitted"
        );

        Ok(Submission {
            job_id,
            uploaded: report.uploaded,
            skipped: report.skipped,
        })
    }

    // =============================================================================
    // One-shot Operations
    // =============================================================================

    /// Send a job order to the machine
    pub async fn create_job(&self, order: &JobOrder) -> Result<()> {
        self.api.create_job(order).await?;
        info!(job_id = %order.id, recipe = %order.recipe_id, "Job order sent");
        Ok(())
    }

    pub async fn run_job(&self, job_id: &str) -> Result<()> {
        self.api.run_job(job_id).await?;
        info!(job_id, "Job started");
        Ok(())
    }

    pub async fn cancel_job(&self, job_id: &str) -> Result<()> {
        self.api.cancel_job(job_id).await?;
        info!(job_id, "Job cancelled");
        Ok(())
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        self.api.delete_job(job_id).await?;
        info!(job_id, "Job deleted");
        Ok(())
    }

    pub async fn job_info(&self, job_id: &str) -> Result<JobInfo> {
        self.api.job_info(job_id).await
    }

    pub async fn job_report(&self, job_id: &str) -> Result<JobReport> {
        self.api.job_report(job_id).await
    }
}
