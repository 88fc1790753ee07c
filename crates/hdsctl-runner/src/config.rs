//! Runner configuration, loaded from YAML.

use std::fs;
use std::path::Path;
use std::time::Duration;

use hdsctl_link::ExecutorConfig;
use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

/// Configuration of the live-view stream server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Poll cadence per subscriber (milliseconds).
    pub poll_interval_ms: u64,

    /// Address the stream server listens on.
    pub listen_addr: String,

    /// Outgoing messages buffered per subscriber before the poll loop waits.
    pub channel_buffer: usize,

    /// Address of the HTTP field API; the API is off when unset.
    pub api_addr: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            poll_interval_ms: 150,
            listen_addr: "0.0.0.0:8080".to_string(),
            channel_buffer: 64,
            api_addr: None,
        }
    }
}

impl StreamConfig {
    /// Poll cadence as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Set the listen address.
    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    /// Enable the HTTP field API on `addr`.
    pub fn with_api_addr(mut self, addr: impl Into<String>) -> Self {
        self.api_addr = Some(addr.into());
        self
    }

    /// Set the poll cadence.
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }
}

/// Top-level configuration file.
///
/// ```yaml
/// executor:
///   min_interval_ms: 10
///   cache_ttl_ms: 500
/// stream:
///   poll_interval_ms: 150
///   listen_addr: "127.0.0.1:8080"
///   api_addr: "127.0.0.1:8081"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdsctlConfig {
    /// Executor settings.
    pub executor: ExecutorConfig,
    /// Stream server settings.
    pub stream: StreamConfig,
}

impl HdsctlConfig {
    /// Parse a YAML document.
    pub fn from_yaml(text: &str) -> RunnerResult<Self> {
        serde_yaml::from_str(text).map_err(|e| RunnerError::Config(e.to_string()))
    }

    /// Load a YAML file.
    pub fn load(path: &Path) -> RunnerResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| RunnerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&text)
    }
}
