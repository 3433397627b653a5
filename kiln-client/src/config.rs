//! Client configuration
//!
//! Everything the client needs to know about the machine and its own
//! identity is passed in explicitly through [`ClientConfig`].

use std::time::Duration;

/// Polling cadence and deadlines for job state waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between polls while waiting for a job to be created
    pub create_interval: Duration,

    /// Give up waiting for creation after this long
    pub create_timeout: Duration,

    /// Delay between polls while waiting for a job to finish
    pub done_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            create_interval: Duration::from_millis(1000),
            create_timeout: Duration::from_millis(5000),
            done_interval: Duration::from_millis(2000),
        }
    }
}

impl PollConfig {
    /// Checks that both intervals are non-zero and the creation deadline
    /// allows at least one poll
    pub fn validate(&self) -> Result<(), String> {
        if self.create_interval.is_zero() || self.done_interval.is_zero() {
            return Err("poll intervals must be greater than 0".to_string());
        }

        if self.create_timeout < self.create_interval {
            return Err("create_timeout must be at least one create_interval".to_string());
        }

        Ok(())
    }

    /// Reads `KILN_CREATE_POLL_MS`, `KILN_CREATE_TIMEOUT_MS` and
    /// `KILN_DONE_POLL_MS`, keeping the default for any that is unset or
    /// not a number
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            create_interval: millis_from_env("KILN_CREATE_POLL_MS")
                .unwrap_or(defaults.create_interval),
            create_timeout: millis_from_env("KILN_CREATE_TIMEOUT_MS")
                .unwrap_or(defaults.create_timeout),
            done_interval: millis_from_env("KILN_DONE_POLL_MS").unwrap_or(defaults.done_interval),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Machine base URL (e.g., "http://localhost:8000")
    pub machine_url: String,

    /// Identity under which jobs are submitted and looked up
    pub client_id: String,

    pub poll: PollConfig,
}

impl ClientConfig {
    /// Creates a new configuration with default polling
    pub fn new(machine_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            machine_url: machine_url.into(),
            client_id: client_id.into(),
            poll: PollConfig::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - KILN_MACHINE_URL (required)
    /// - KILN_CLIENT_ID (required)
    /// - KILN_CREATE_POLL_MS (optional, default: 1000)
    /// - KILN_CREATE_TIMEOUT_MS (optional, default: 5000)
    /// - KILN_DONE_POLL_MS (optional, default: 2000)
    pub fn from_env() -> Result<Self, String> {
        let machine_url = std::env::var("KILN_MACHINE_URL")
            .map_err(|_| "KILN_MACHINE_URL environment variable not set".to_string())?;

        let client_id = std::env::var("KILN_CLIENT_ID")
            .map_err(|_| "KILN_CLIENT_ID environment variable not set".to_string())?;

        Ok(Self {
            machine_url,
            client_id,
            poll: PollConfig::from_env(),
        })
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.trim().is_empty() {
            return Err("client_id cannot be empty".to_string());
        }

        if !self.machine_url.starts_with("http://") && !self.machine_url.starts_with("https://") {
            return Err("machine_url must start with http:// or https://".to_string());
        }

        self.poll.validate()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000", uuid::Uuid::new_v4().to_string())
    }
}

fn millis_from_env(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.poll.create_interval, Duration::from_secs(1));
        assert_eq!(config.poll.create_timeout, Duration::from_secs(5));
        assert_eq!(config.poll.done_interval, Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.client_id = String::new();
        assert!(config.validate().is_err());

        config.client_id = "client-a".to_string();
        config.machine_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        config.machine_url = "https://machine.example.org".to_string();
        assert!(config.validate().is_ok());

        config.poll.done_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_shorter_than_interval_rejected() {
        let config = ClientConfig::default().with_poll(PollConfig {
            create_timeout: Duration::from_millis(500),
            ..PollConfig::default()
        });
        assert!(config.validate().is_err());
    }
}
