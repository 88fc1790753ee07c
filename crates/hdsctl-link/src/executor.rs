//! The cached, throttled executor.

use std::time::Instant;

use bytes::Bytes;
use hdsctl_metrics::metric_defs;
use hdsctl_scpi::{Request, QUERY_MARKER};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::cache::{CacheEntry, ResponseCache};
use crate::config::ExecutorConfig;
use crate::error::{ExecError, ExecResult};
use crate::link::DeviceLink;
use crate::status::decode_status_block;
use crate::throttle::Throttle;

/// Executes parsed requests against an instrument.
///
/// Queries return `Some(response)`, sets return `None`.
pub trait Executor: Send + Sync {
    /// Execute one request.
    fn execute(&self, request: &Request) -> ExecResult<Option<Bytes>>;
}

struct LinkState<L> {
    link: L,
    cache: ResponseCache,
    throttle: Throttle,
}

/// Executor that owns the device link exclusively.
///
/// Every request runs under one lock: the cache lookup, the throttle wait,
/// the write and the read happen as a unit, so two callers never interleave
/// on the wire.
pub struct CachedExecutor<L> {
    state: Mutex<LinkState<L>>,
    config: ExecutorConfig,
    identity: String,
}

impl<L: DeviceLink> CachedExecutor<L> {
    /// Take ownership of a link and check the instrument identity.
    ///
    /// Fails with [`ExecError::UnsupportedDevice`] when the identity string
    /// does not start with the configured prefix.
    pub fn connect(link: L, config: ExecutorConfig) -> ExecResult<Self> {
        let state = LinkState {
            link,
            cache: ResponseCache::new(),
            throttle: Throttle::new(config.min_interval),
        };
        let mut executor = CachedExecutor {
            state: Mutex::new(state),
            config,
            identity: String::new(),
        };

        let response = executor.run(&executor.config.identity_path, None)?;
        let identity = String::from_utf8_lossy(&response.unwrap_or_default())
            .trim()
            .to_string();
        if !identity
            .to_ascii_uppercase()
            .starts_with(&executor.config.identity_prefix.to_ascii_uppercase())
        {
            return Err(ExecError::UnsupportedDevice(identity));
        }

        info!(identity = %identity, "Connected to instrument");
        executor.identity = identity;
        Ok(executor)
    }

    /// Identity string reported at connect time.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The executor configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Snapshot of the cache entry for a path, fresh or not.
    pub fn cached(&self, path: &str) -> Option<CacheEntry> {
        self.state.lock().cache.get(path).cloned()
    }

    fn run(&self, path: &str, argument: Option<&str>) -> ExecResult<Option<Bytes>> {
        let mut state = self.state.lock();
        let labels = metric_defs::CACHE_HITS.label_values(&[path]);

        let command = match argument {
            None => {
                if let Some(entry) = state.cache.fresh(path, self.config.cache_ttl, Instant::now()) {
                    trace!(command = %path, "Cache hit");
                    metrics::counter!(metric_defs::CACHE_HITS.name, &labels).increment(1);
                    return Ok(Some(self.strip_status_frame(path, entry.value.clone())));
                }
                metrics::counter!(metric_defs::CACHE_MISSES.name, &labels).increment(1);
                format!("{}{}", path, QUERY_MARKER)
            }
            Some(value) => format!("{} {}", path, value),
        };

        let waited = state.throttle.wait();
        metrics::histogram!(metric_defs::THROTTLE_WAIT.name).record(waited.as_micros() as f64);

        let result = self.exchange(&mut state, path, &command, argument.is_none());
        state.throttle.mark();
        if let Err(e) = &result {
            debug!(command = %command, error = %e, "Command failed");
            metrics::counter!(metric_defs::LINK_ERRORS.name, &labels).increment(1);
        }
        result
    }

    fn exchange(
        &self,
        state: &mut LinkState<L>,
        path: &str,
        command: &str,
        is_query: bool,
    ) -> ExecResult<Option<Bytes>> {
        let labels = metric_defs::LINK_WRITES.label_values(&[path]);
        let written = state.link.write(command.as_bytes())?;
        metrics::counter!(metric_defs::LINK_WRITES.name, &labels).increment(1);
        if written != command.len() {
            return Err(ExecError::ShortWrite {
                written,
                expected: command.len(),
            });
        }

        if !is_query {
            trace!(command = %command, "Set sent");
            state.cache.supersede(path);
            return Ok(None);
        }

        let response = Bytes::from(state.link.read(self.config.read_buffer_size)?);
        metrics::counter!(metric_defs::LINK_READS.name, &labels).increment(1);
        metrics::counter!(metric_defs::LINK_BYTES_READ.name).increment(response.len() as u64);
        trace!(command = %command, len = response.len(), "Response received");

        if self.config.is_bulk_data(path) && response.len() < self.config.min_bulk_response_len {
            return Err(ExecError::UnexpectedResponseLength {
                length: response.len(),
                command: command.to_string(),
            });
        }

        let captured_at = Instant::now();
        state.cache.insert(path, response.clone(), captured_at);

        if path != self.config.status_head_path {
            return Ok(Some(response));
        }

        let block = self.strip_status_frame(path, response);
        match decode_status_block(&block, self.config.offset_divisor, captured_at) {
            Ok(entries) => {
                debug!(fields = entries.len(), "Cache warmed from status block");
                state.cache.extend(entries);
                metrics::counter!(metric_defs::STATUS_BLOCKS_DECODED.name).increment(1);
            }
            Err(e) => {
                warn!(error = %e, "Discarding status block");
                metrics::counter!(metric_defs::STATUS_BLOCKS_DISCARDED.name).increment(1);
            }
        }
        Ok(Some(block))
    }

    fn strip_status_frame(&self, path: &str, response: Bytes) -> Bytes {
        if path != self.config.status_head_path {
            return response;
        }
        let start = self.config.frame_prefix_len.min(response.len());
        response.slice(start..)
    }
}

impl<L: DeviceLink> Executor for CachedExecutor<L> {
    fn execute(&self, request: &Request) -> ExecResult<Option<Bytes>> {
        self.run(request.path(), request.arguments.first().map(String::as_str))
    }
}
