//! Job DTOs sent to the machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::job::Priority;

/// Parameter name → scalar JSON value
pub type Parameters = HashMap<String, serde_json::Value>;

/// Request to create a job (`POST /job`)
///
/// The wire shape is exactly `id, name, clientId, recipeId, parameters,
/// priority, submission`. A draft can be edited freely; submitting takes it
/// by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOrder {
    pub id: String,
    pub name: String,
    pub client_id: String,
    pub recipe_id: String,
    pub parameters: Parameters,
    pub priority: Priority,
    pub submission: DateTime<Utc>,
}

impl JobOrder {
    /// Draft a new order with a fresh id and default priority
    pub fn new(client_id: impl Into<String>, recipe_id: impl Into<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            name: format!("job-{}", &id[..8]),
            id,
            client_id: client_id.into(),
            recipe_id: recipe_id.into(),
            parameters: Parameters::new(),
            priority: Priority::default(),
            submission: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Refresh the submission timestamp right before sending
    pub fn stamp(mut self) -> Self {
        self.submission = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let order = JobOrder::new("client-a", "inspect")
            .with_id("job-1")
            .with_name("Scan 1")
            .with_parameter("meshFile", json!("bunny.obj"));

        let value = serde_json::to_value(&order).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["clientId", "id", "name", "parameters", "priority", "recipeId", "submission"]
        );
        assert_eq!(value["priority"], json!("normal"));
        assert_eq!(value["parameters"]["meshFile"], json!("bunny.obj"));
    }

    #[test]
    fn test_new_orders_get_distinct_ids() {
        let a = JobOrder::new("client-a", "inspect");
        let b = JobOrder::new("client-a", "inspect");
        assert_ne!(a.id, b.id);
        assert!(a.name.starts_with("job-"));
    }
}
