//! Recipe catalog endpoints

use crate::MachineClient;
use crate::error::Result;
use kiln_core::{Recipe, RecipeSummary};

impl MachineClient {
    /// List the recipes the machine offers
    pub async fn list_recipes(&self) -> Result<Vec<RecipeSummary>> {
        let url = format!("{}/recipes", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get a recipe with its parameter schema
    ///
    /// The schema is checked while decoding; a recipe whose schema is
    /// inconsistent fails here with [`ClientError::ParseError`](crate::ClientError::ParseError).
    pub async fn get_recipe(&self, recipe_id: &str) -> Result<Recipe> {
        let url = format!("{}/recipes/{}", self.base_url, recipe_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
