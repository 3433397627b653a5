//! Kiln HTTP Client
//!
//! A type-safe client for a recipe machine: a remote service that runs
//! parameterized recipes as asynchronous jobs.
//!
//! The crate has two layers:
//! - [`MachineClient`]: one method per machine endpoint, no policy
//! - [`JobOrchestrator`]: the job lifecycle on top of any [`MachineApi`]
//!   (validate, create, wait, transfer files, resolve deliveries)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use kiln_client::{ClientConfig, JobOrchestrator, MachineClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::new("http://localhost:8000", "my-client");
//!     let client = MachineClient::from_config(&config);
//!
//!     let recipe = client.get_recipe("inspect-mesh").await?;
//!     let orchestrator = JobOrchestrator::new(Arc::new(client), config.poll)?;
//!
//!     let order = orchestrator
//!         .new_order(&recipe.id)
//!         .with_parameter("meshFile", "bunny.obj".into());
//!     let submission = orchestrator.submit(&recipe, order).await?;
//!
//!     orchestrator.run_job(&submission.job_id).await?;
//!     let files = orchestrator
//!         .wait_fetch_result_files(&submission.job_id, "results".as_ref())
//!         .await?;
//!     println!("Downloaded {} file(s)", files.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
mod files;
mod jobs;
mod machine;
pub mod orchestrator;
mod recipes;

// Re-export commonly used types
pub use api::MachineApi;
pub use config::{ClientConfig, PollConfig};
pub use error::{ClientError, ErrorKind, Result};
pub use orchestrator::{JobOrchestrator, Submission, UploadReport};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for a recipe machine
///
/// Methods are organized into logical groups:
/// - Jobs (create, inspect, report, run, cancel, delete)
/// - Recipes (catalog and detail)
/// - Machine status
/// - Job files (streamed upload and download)
#[derive(Debug, Clone)]
pub struct MachineClient {
    /// Base URL of the machine (e.g., "http://localhost:8000")
    base_url: String,
    /// Identity scoping job visibility
    client_id: String,
    /// HTTP client instance
    client: Client,
}

impl MachineClient {
    /// Create a new machine client
    ///
    /// # Example
    /// ```
    /// use kiln_client::MachineClient;
    ///
    /// let client = MachineClient::new("http://localhost:8000", "client-a");
    /// assert_eq!(client.client_id(), "client-a");
    /// ```
    pub fn new(base_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self::with_client(base_url, client_id, Client::new())
    }

    /// Create a new machine client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client,
        }
    }

    pub fn from_config(config: &config::ClientConfig) -> Self {
        Self::new(config.machine_url.clone(), config.client_id.clone())
    }

    /// Get the base URL of the machine
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Turn a non-2xx response into [`ClientError::ApiError`]
    async fn ensure_success(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown Status");
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), reason, error_text));
        }

        Ok(response)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.ensure_success(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.ensure_success(response).await?;
        Ok(())
    }
}
