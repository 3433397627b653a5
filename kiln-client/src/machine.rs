//! Machine status endpoint

use crate::MachineClient;
use crate::error::Result;
use kiln_core::MachineInfo;

impl MachineClient {
    /// Get the machine's status
    pub async fn machine_info(&self) -> Result<MachineInfo> {
        let url = format!("{}/machine", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
