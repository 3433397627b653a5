//! Machine status as reported by `GET /machine`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineInfo {
    #[serde(default)]
    pub version: Option<String>,
    /// Seconds since the machine started
    #[serde(default)]
    pub uptime: Option<f64>,
    #[serde(default)]
    pub jobs: Option<JobCounts>,
    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub waiting: u64,
    #[serde(default)]
    pub running: u64,
}
