//! Job report types
//!
//! The report is the full execution record of a job. It is only complete
//! once the job reached a terminal state.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::job::{JobInfo, TaskState, optional_timestamp};

/// Name of the final step whose result lists the output files
pub const DELIVERY_STEP: &str = "delivery";

/// Full execution record of a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    #[serde(flatten)]
    pub job: JobInfo,
    #[serde(default)]
    pub steps: IndexMap<String, TaskReport>,
}

/// Execution record of a single recipe step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    #[serde(default)]
    pub tool: String,
    pub state: TaskState,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

/// Step output. Only `files` is interpreted; everything else is kept as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskResult {
    /// Logical name → file path relative to the job's file namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<IndexMap<String, String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Reasons a report cannot yield delivery files
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("can only fetch files after job is done (state: {0})")]
    NotDone(TaskState),

    #[error("job has no delivery step")]
    NoDeliveryStep,

    #[error("job delivery contains no files")]
    NoFiles,
}

impl JobReport {
    pub fn state(&self) -> TaskState {
        self.job.state
    }

    pub fn step(&self, name: &str) -> Option<&TaskReport> {
        self.steps.get(name)
    }

    /// Paths of the files listed by the delivery step, in document order
    ///
    /// The logical names are dropped. Requires the job to be done and the
    /// delivery step to list at least one file.
    pub fn delivery_files(&self) -> Result<Vec<String>, DeliveryError> {
        if self.job.state != TaskState::Done {
            return Err(DeliveryError::NotDone(self.job.state));
        }

        let delivery = self
            .step(DELIVERY_STEP)
            .ok_or(DeliveryError::NoDeliveryStep)?;

        match delivery.result.as_ref().and_then(|r| r.files.as_ref()) {
            Some(files) if !files.is_empty() => Ok(files.values().cloned().collect()),
            _ => Err(DeliveryError::NoFiles),
        }
    }
}
