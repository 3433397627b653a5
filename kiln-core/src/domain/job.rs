//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle state of a job (or of a single step within a job)
///
/// States are ordered: `Created < Waiting < Running < {Done, Error, Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Created,
    Waiting,
    Running,
    Done,
    Error,
    Cancelled,
}

impl TaskState {
    /// True for `Done`, `Error` and `Cancelled`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error | Self::Cancelled)
    }

    /// Position in the lifecycle. All terminal states share the last rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Waiting => 1,
            Self::Running => 2,
            Self::Done | Self::Error | Self::Cancelled => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Waiting => "waiting",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling priority of a job order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority '{}' (expected low, normal or high)", other)),
        }
    }
}

/// Recipe reference embedded in job summaries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Server-observed summary of a job
///
/// Only the machine mutates this; the client polls it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub recipe: RecipeRef,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub submission: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub end: Option<DateTime<Utc>>,
    /// Run time in seconds
    #[serde(default)]
    pub duration: f64,
    pub state: TaskState,
    /// Name of the step currently executing
    #[serde(default)]
    pub step: String,
    #[serde(default)]
    pub error: String,
}

/// Accepts a missing value, `null`, an empty string or an RFC 3339 timestamp.
///
/// The machine reports `""` for steps that have not started yet.
pub(crate) fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}
