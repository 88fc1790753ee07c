//! Metrics for the HDS instrument controller.
//!
//! Every metric is declared as a structured [`Metric`] constant in
//! [`metric_defs`], so call sites cannot misspell names and exporters get
//! descriptions and units. The `metrics` facade is re-exported; installing a
//! recorder is left to the binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use hdsctl_metrics::{metric_defs, describe_metrics};
//!
//! describe_metrics();
//! let labels = metric_defs::CACHE_HITS.label_values(&[":CH1:DISPlay"]);
//! metrics::counter!(metric_defs::CACHE_HITS.name, &labels).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// # Example
///
/// ```rust
/// use hdsctl_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const TRANSFERS: Metric = Metric::counter("hdsctl.link.writes")
///     .with_description("Commands written to the link")
///     .with_unit(Unit::Count)
///     .with_labels(&["command"]);
///
/// assert_eq!(TRANSFERS.name, "hdsctl.link.writes");
/// assert_eq!(TRANSFERS.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "hdsctl.cache.hits").
    pub name: &'static str,
    /// The kind of metric (counter, gauge, histogram).
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Counter)
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Gauge)
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self::with_kind(name, MetricKind::Histogram)
    }

    const fn with_kind(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Pairs the declared label keys with `values`, in declaration order.
    pub fn label_values(&self, values: &[&str]) -> Vec<(&'static str, String)> {
        debug_assert_eq!(self.labels.len(), values.len(), "label arity of {}", self.name);
        self.labels
            .iter()
            .zip(values)
            .map(|(key, value)| (*key, value.to_string()))
            .collect()
    }

    /// Registers this metric's description with the metrics recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Label carrying the mnemonic path of the command.
    pub const COMMAND_LABELS: &[&str] = &["command"];

    // ========================================================================
    // Device Link
    // ========================================================================

    /// Commands written to the device link.
    pub const LINK_WRITES: Metric = Metric::counter("hdsctl.link.writes")
        .with_description("Commands written to the device link")
        .with_unit(Unit::Count)
        .with_labels(COMMAND_LABELS);

    /// Responses read from the device link.
    pub const LINK_READS: Metric = Metric::counter("hdsctl.link.reads")
        .with_description("Responses read from the device link")
        .with_unit(Unit::Count)
        .with_labels(COMMAND_LABELS);

    /// Bytes received from the device link.
    pub const LINK_BYTES_READ: Metric = Metric::counter("hdsctl.link.bytes_read")
        .with_description("Bytes received from the device link")
        .with_unit(Unit::Bytes);

    /// Failed link transfers (short writes, timeouts, truncated reads).
    pub const LINK_ERRORS: Metric = Metric::counter("hdsctl.link.errors")
        .with_description("Failed link transfers")
        .with_unit(Unit::Count)
        .with_labels(COMMAND_LABELS);

    /// Time spent waiting for the inter-command throttle.
    pub const THROTTLE_WAIT: Metric = Metric::histogram("hdsctl.link.throttle_wait_us")
        .with_description("Time spent waiting for the inter-command throttle")
        .with_unit(Unit::Microseconds);

    // ========================================================================
    // Result Cache
    // ========================================================================

    /// Queries answered from the cache.
    pub const CACHE_HITS: Metric = Metric::counter("hdsctl.cache.hits")
        .with_description("Queries answered from the cache")
        .with_unit(Unit::Count)
        .with_labels(COMMAND_LABELS);

    /// Queries that went to the device.
    pub const CACHE_MISSES: Metric = Metric::counter("hdsctl.cache.misses")
        .with_description("Queries that went to the device")
        .with_unit(Unit::Count)
        .with_labels(COMMAND_LABELS);

    /// Status blocks decoded into the cache.
    pub const STATUS_BLOCKS_DECODED: Metric = Metric::counter("hdsctl.status.decoded")
        .with_description("Status blocks decoded into the cache")
        .with_unit(Unit::Count);

    /// Status blocks discarded as malformed.
    pub const STATUS_BLOCKS_DISCARDED: Metric = Metric::counter("hdsctl.status.discarded")
        .with_description("Status blocks discarded as malformed")
        .with_unit(Unit::Count);

    // ========================================================================
    // Live Stream
    // ========================================================================

    /// Connected live-view subscribers.
    pub const STREAM_SUBSCRIBERS: Metric = Metric::gauge("hdsctl.stream.subscribers")
        .with_description("Connected live-view subscribers")
        .with_unit(Unit::Count);

    /// Delta updates pushed to subscribers.
    pub const STREAM_UPDATES: Metric = Metric::counter("hdsctl.stream.updates")
        .with_description("Delta updates pushed to subscribers")
        .with_unit(Unit::Count);

    /// Fields carried per delta update.
    pub const STREAM_UPDATE_FIELDS: Metric = Metric::histogram("hdsctl.stream.update_fields")
        .with_description("Fields carried per delta update")
        .with_unit(Unit::Count);

    /// Per-field fetch failures during a poll cycle.
    pub const STREAM_FIELD_ERRORS: Metric = Metric::counter("hdsctl.stream.field_errors")
        .with_description("Per-field fetch failures during a poll cycle")
        .with_unit(Unit::Count);

    /// Duration of one poll cycle.
    pub const STREAM_CYCLE_TIME: Metric = Metric::histogram("hdsctl.stream.cycle_time_us")
        .with_description("Duration of one poll cycle")
        .with_unit(Unit::Microseconds);

    /// All metrics, for bulk description.
    pub const ALL: &[&Metric] = &[
        &LINK_WRITES,
        &LINK_READS,
        &LINK_BYTES_READ,
        &LINK_ERRORS,
        &THROTTLE_WAIT,
        &CACHE_HITS,
        &CACHE_MISSES,
        &STATUS_BLOCKS_DECODED,
        &STATUS_BLOCKS_DISCARDED,
        &STREAM_SUBSCRIBERS,
        &STREAM_UPDATES,
        &STREAM_UPDATE_FIELDS,
        &STREAM_FIELD_ERRORS,
        &STREAM_CYCLE_TIME,
    ];
}

/// Describes all metrics.
///
/// Call once at startup, after the recorder is installed.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
