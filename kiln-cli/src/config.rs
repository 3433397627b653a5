//! Configuration module
//!
//! Machine URL and client identity come from the command line (or their
//! environment fallbacks); poll timings come from the environment.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use kiln_client::{ClientConfig, JobOrchestrator, MachineClient, PollConfig};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub client: ClientConfig,
}

impl Config {
    pub fn load(machine_url: String, client_id: String) -> Result<Self> {
        let client = ClientConfig::new(machine_url, client_id).with_poll(PollConfig::from_env());
        client
            .validate()
            .map_err(|e| anyhow!("invalid configuration: {e}"))?;
        Ok(Self { client })
    }

    pub fn machine(&self) -> MachineClient {
        MachineClient::from_config(&self.client)
    }

    pub fn orchestrator(&self) -> Result<JobOrchestrator<MachineClient>> {
        Ok(JobOrchestrator::new(
            Arc::new(self.machine()),
            self.client.poll,
        )?)
    }
}
