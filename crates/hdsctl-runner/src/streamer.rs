//! State-diff streaming.
//!
//! Each poll cycle builds a full [`Snapshot`] of the live-view fields; only the
//! entries that differ from the previous cycle are pushed to the subscriber.
//! Waveforms are always pushed.

use std::collections::BTreeMap;
use std::time::Instant;

use hdsctl_metrics::metric_defs;
use hdsctl_scpi::{Field, HDS_CHANNELS};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{RunnerError, RunnerResult};
use crate::instrument::Instrument;

/// Key prefix of per-channel waveform entries (`wave1`, `wave2`).
pub const WAVE_KEY_PREFIX: &str = "wave";

/// Suffix of the entry carrying a field's legal values.
pub const RANGE_SUFFIX: &str = ".range";

/// Separator between field id and value in subscriber messages.
pub const MESSAGE_DELIMITER: char = ':';

/// Display value that enables a channel.
const DISPLAY_ON: &str = "ON";

/// One snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A scalar value or a rendered waveform.
    Text(String),
    /// The legal values of a field.
    Range(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Field id to value, ordered for stable output.
pub type Snapshot = BTreeMap<String, FieldValue>;

/// Whether a snapshot key holds waveform data.
pub fn is_wave_key(key: &str) -> bool {
    key.strip_prefix(WAVE_KEY_PREFIX)
        .map_or(false, |ch| !ch.is_empty() && ch.bytes().all(|b| b.is_ascii_digit()))
}

/// Render samples as space-separated signed integers.
pub fn render_wave(samples: &[i8]) -> String {
    samples
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entries of `current` that a subscriber holding `previous` has not seen.
pub fn compute_delta(previous: &Snapshot, current: &Snapshot) -> Snapshot {
    current
        .iter()
        .filter(|(key, value)| is_wave_key(key) || previous.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Poll the instrument once and build a full snapshot.
///
/// Blocks on the executor. Fields that fail to fetch are logged and left out.
pub fn poll_snapshot(instrument: &Instrument) -> Snapshot {
    let mut snapshot = Snapshot::new();

    if let Err(e) = instrument.get_field(Field::StatusHead) {
        debug!(error = %e, "Status head query failed");
    }

    for channel in HDS_CHANNELS {
        let Some(display) = Field::channel_display(channel) else {
            continue;
        };
        match instrument.get_field(display) {
            Ok(value) if value == DISPLAY_ON => {}
            Ok(_) => continue,
            Err(e) => {
                record_field_error(display.id(), &e);
                continue;
            }
        }
        match instrument.get_wave(channel) {
            Ok(samples) => {
                snapshot.insert(
                    format!("{}{}", WAVE_KEY_PREFIX, channel),
                    FieldValue::Text(render_wave(&samples)),
                );
            }
            Err(e) => record_field_error(&format!("{}{}", WAVE_KEY_PREFIX, channel), &e),
        }
    }

    for field in Field::STREAMED {
        let id = field.id();
        let Some(definition) = instrument.catalog().field(*field) else {
            warn!(field = id, "Streamed field missing from catalog");
            continue;
        };
        match instrument.get_field(*field) {
            Ok(value) => {
                snapshot.insert(id.to_string(), FieldValue::Text(value));
            }
            Err(e) => record_field_error(id, &e),
        }
        if let Some(domain) = &definition.domain {
            if field.surfaces_domain() {
                snapshot.insert(format!("{}{}", id, RANGE_SUFFIX), FieldValue::Range(domain.clone()));
            }
        }
    }

    snapshot
}

fn record_field_error(field: &str, error: &RunnerError) {
    warn!(field = field, error = %error, "Field fetch failed");
    metrics::counter!(metric_defs::STREAM_FIELD_ERRORS.name).increment(1);
}

/// Per-subscriber diff state.
pub struct DiffStreamer {
    instrument: Instrument,
    previous: Snapshot,
}

impl DiffStreamer {
    /// Create a streamer with an empty previous snapshot.
    pub fn new(instrument: Instrument) -> Self {
        DiffStreamer {
            instrument,
            previous: Snapshot::new(),
        }
    }

    /// Run one poll cycle and return the update to push, if any.
    pub fn next_update(&mut self) -> Option<Snapshot> {
        let started = Instant::now();
        let current = poll_snapshot(&self.instrument);
        let update = self.advance(current);
        metrics::histogram!(metric_defs::STREAM_CYCLE_TIME.name)
            .record(started.elapsed().as_micros() as f64);
        update
    }

    /// Diff a freshly polled snapshot against the previous one and retain it.
    pub fn advance(&mut self, current: Snapshot) -> Option<Snapshot> {
        let delta = compute_delta(&self.previous, &current);
        self.previous = current;
        if delta.is_empty() {
            return None;
        }
        metrics::counter!(metric_defs::STREAM_UPDATES.name).increment(1);
        metrics::histogram!(metric_defs::STREAM_UPDATE_FIELDS.name).record(delta.len() as f64);
        Some(delta)
    }

    /// The snapshot retained from the last cycle.
    pub fn previous(&self) -> &Snapshot {
        &self.previous
    }
}

/// Apply a subscriber message of the form `id:value`.
///
/// The write is attempted and then the field is read back, so the reply
/// carries the instrument's own value even when the write was refused.
pub fn handle_inbound(instrument: &Instrument, message: &str) -> RunnerResult<Snapshot> {
    let (id, value) = message
        .split_once(MESSAGE_DELIMITER)
        .ok_or_else(|| RunnerError::InvalidMessage(message.to_string()))?;
    let (id, value) = (id.trim(), value.trim());

    if let Err(e) = instrument.set_field_by_id(id, value) {
        warn!(field = id, value = value, error = %e, "Subscriber write failed");
    }
    let actual = instrument.get_field_by_id(id)?;
    debug!(field = id, requested = value, actual = %actual, "Echoing field");

    Ok(Snapshot::from([(id.to_string(), FieldValue::Text(actual))]))
}
