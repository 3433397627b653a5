//! Job-related API endpoints

use crate::MachineClient;
use crate::error::Result;
use kiln_core::{JobInfo, JobOrder, JobReport};

impl MachineClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a job order (`POST /job`)
    ///
    /// The machine acknowledges asynchronously; poll [`get_job`](Self::get_job)
    /// until the job reports `created` before touching its files.
    ///
    /// # Example
    /// ```no_run
    /// # use kiln_client::MachineClient;
    /// # use kiln_core::JobOrder;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = MachineClient::new("http://localhost:8000", "client-a");
    /// let order = JobOrder::new(client.client_id(), "inspect-mesh");
    /// client.create_job(&order).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_job(&self, order: &JobOrder) -> Result<()> {
        let url = format!("{}/job", self.base_url);
        let response = self.client.post(&url).json(order).send().await?;

        self.handle_empty_response(response).await
    }

    /// Get the current summary of a job
    pub async fn get_job(&self, job_id: &str) -> Result<JobInfo> {
        let response = self.client.get(self.job_url(job_id)).send().await?;

        self.handle_response(response).await
    }

    /// Get the execution report of a job
    ///
    /// Only complete once the job reached a terminal state.
    pub async fn get_job_report(&self, job_id: &str) -> Result<JobReport> {
        let url = format!("{}/report", self.job_url(job_id));
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Start a created job
    pub async fn run_job(&self, job_id: &str) -> Result<()> {
        let url = format!("{}/run", self.job_url(job_id));
        let response = self.client.patch(&url).send().await?;

        self.handle_empty_response(response).await
    }

    /// Cancel a waiting or running job
    pub async fn cancel_job(&self, job_id: &str) -> Result<()> {
        let url = format!("{}/cancel", self.job_url(job_id));
        let response = self.client.patch(&url).send().await?;

        self.handle_empty_response(response).await
    }

    /// Delete a job and its files
    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        let response = self.client.delete(self.job_url(job_id)).send().await?;

        self.handle_empty_response(response).await
    }

    fn job_url(&self, job_id: &str) -> String {
        format!("{}/clients/{}/jobs/{}", self.base_url, self.client_id, job_id)
    }
}
