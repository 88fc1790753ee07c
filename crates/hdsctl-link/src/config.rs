//! Executor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the cached executor.
///
/// The defaults match the HDS2000-series instruments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Minimum spacing between physical transfers.
    #[serde(with = "duration_ms", rename = "min_interval_ms")]
    pub min_interval: Duration,

    /// How long a cached query result stays valid.
    #[serde(with = "duration_ms", rename = "cache_ttl_ms")]
    pub cache_ttl: Duration,

    /// Size of the buffer offered to each link read.
    pub read_buffer_size: usize,

    /// Mnemonic prefix of the bulk waveform data family.
    pub bulk_data_prefix: String,

    /// Shortest plausible response to a bulk-data query.
    pub min_bulk_response_len: usize,

    /// Mnemonic of the query that returns the status block.
    pub status_head_path: String,

    /// Length of the framing prefix in front of bulk responses.
    pub frame_prefix_len: usize,

    /// Pixels per vertical division, used to rescale channel offsets.
    pub offset_divisor: f64,

    /// Mnemonic of the identity query.
    pub identity_path: String,

    /// Required prefix of the identity string (case-insensitive).
    pub identity_prefix: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            min_interval: Duration::from_millis(10),
            cache_ttl: Duration::from_millis(500),
            read_buffer_size: 10_000,
            bulk_data_prefix: ":DATa:WAVe:SCReen:".to_string(),
            min_bulk_response_len: 100,
            status_head_path: ":DATa:WAVe:SCReen:HEAD".to_string(),
            frame_prefix_len: 4,
            offset_divisor: 25.0,
            identity_path: "*IDN".to_string(),
            identity_prefix: "OWON,HDS2".to_string(),
        }
    }
}

impl ExecutorConfig {
    /// Set the minimum spacing between physical transfers.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Set the cache validity window.
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Set the required identity prefix.
    pub fn with_identity_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.identity_prefix = prefix.into();
        self
    }

    /// Whether a mnemonic belongs to the bulk waveform data family.
    pub fn is_bulk_data(&self, path: &str) -> bool {
        path.starts_with(&self.bulk_data_prefix)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.min_interval, Duration::from_millis(10));
        assert_eq!(config.cache_ttl, Duration::from_millis(500));
        assert!(config.is_bulk_data(":DATa:WAVe:SCReen:CH1"));
        assert!(config.is_bulk_data(&config.status_head_path));
        assert!(!config.is_bulk_data(":CH1:DISPlay"));
    }

    #[test]
    fn test_partial_json_config() {
        let config: ExecutorConfig =
            serde_json::from_str(r#"{"min_interval_ms": 25, "cache_ttl_ms": 0}"#).unwrap();
        assert_eq!(config.min_interval, Duration::from_millis(25));
        assert_eq!(config.cache_ttl, Duration::ZERO);
        assert_eq!(config.read_buffer_size, 10_000);
    }
}
