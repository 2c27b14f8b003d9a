//! Code for the configuration of the console.

use std::{path::Path, time::Duration};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The configuration of the console. Every section, and every field within
/// a section, may be omitted.
#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Where the print host lives.
    pub backend: BackendConfig,
    /// Cadence of the device status poll.
    pub status: StatusConfig,
    /// Cadence of the job-progress loop.
    pub job: JobConfig,
    /// Upload tuning.
    pub upload: UploadConfig,
    /// Catalog behavior.
    pub catalog: CatalogConfig,
}

impl Config {
    /// Parse a configuration from a toml file.
    pub fn from_file(file: &Path) -> Result<Self> {
        let config = std::fs::read_to_string(file)?;
        Self::from_str(&config)
    }

    /// Parse a configuration from a toml string.
    pub fn from_str(config: &str) -> Result<Self> {
        Ok(toml::from_str(config)?)
    }
}

/// The configuration for the print-host backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// HTTP URL of the print host.
    pub url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5001".to_owned(),
        }
    }
}

/// The configuration for the device status poll.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Delay between polls while the backend answers, in milliseconds.
    pub interval_ms: u64,
    /// Growth of the delay per consecutive failed poll. `1.0` keeps the
    /// cadence fixed no matter how many polls fail.
    pub backoff_factor: f64,
    /// Upper bound on the delay between polls, in milliseconds.
    pub max_interval_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            backoff_factor: 1.0,
            max_interval_ms: 60_000,
        }
    }
}

impl StatusConfig {
    /// Delay before the next poll, after `consecutive_failures` polls in a
    /// row have failed.
    pub fn delay(&self, consecutive_failures: u32) -> Duration {
        let interval = self.interval_ms as f64;
        let factor = self.backoff_factor.max(1.0);
        let exponent = consecutive_failures.min(i32::MAX as u32) as i32;
        let delay = interval * factor.powi(exponent);
        let cap = self.max_interval_ms.max(self.interval_ms) as f64;
        Duration::from_millis(delay.min(cap) as u64)
    }
}

/// The configuration for the job-progress loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct JobConfig {
    /// Delay between progress requests, in milliseconds.
    pub poll_interval_ms: u64,
    /// How long a finished or failed job stays on the indicator, in
    /// milliseconds.
    pub linger_ms: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            linger_ms: 1000,
        }
    }
}

impl JobConfig {
    /// Delay between progress requests.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// How long a finished or failed job stays on the indicator.
    pub fn linger(&self) -> Duration {
        Duration::from_millis(self.linger_ms)
    }
}

/// The configuration for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Bytes streamed per chunk; progress is reported once per chunk.
    pub chunk_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { chunk_size: 64 * 1024 }
    }
}

/// The configuration for the catalog.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Clear the selection when a refreshed catalog no longer lists the
    /// selected file. Off by default: a stale selection is kept.
    pub clear_stale_selection: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_from_str_empty() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend.url, "http://127.0.0.1:5001");
        assert_eq!(config.status.interval_ms, 5000);
        assert_eq!(config.job.poll_interval(), Duration::from_secs(1));
        assert!(!config.catalog.clear_stale_selection);
    }

    #[test]
    fn test_config_from_str_partial() {
        let config = r#"
            [backend]
            url = "http://192.168.1.20:5001"

            [status]
            backoff_factor = 2.0

            [catalog]
            clear_stale_selection = true
        "#;
        let config = Config::from_str(config).unwrap();
        assert_eq!(config.backend.url, "http://192.168.1.20:5001");
        assert_eq!(config.status.interval_ms, 5000);
        assert_eq!(config.status.backoff_factor, 2.0);
        assert_eq!(config.job, JobConfig::default());
        assert!(config.catalog.clear_stale_selection);
    }

    #[test]
    fn test_config_rejects_bad_types() {
        assert!(Config::from_str("[job]\npoll_interval_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_status_delay_fixed_by_default() {
        let status = StatusConfig::default();
        assert_eq!(status.delay(0), Duration::from_secs(5));
        assert_eq!(status.delay(7), Duration::from_secs(5));
    }

    #[test]
    fn test_status_delay_backs_off_and_caps() {
        let status = StatusConfig {
            interval_ms: 1000,
            backoff_factor: 2.0,
            max_interval_ms: 5000,
        };
        assert_eq!(status.delay(0), Duration::from_secs(1));
        assert_eq!(status.delay(1), Duration::from_secs(2));
        assert_eq!(status.delay(2), Duration::from_secs(4));
        assert_eq!(status.delay(3), Duration::from_secs(5));
        assert_eq!(status.delay(40), Duration::from_secs(5));
    }
}
