//! An in-memory instrument.
//!
//! [`SimulatedScope`] answers the same command set as the hardware: it stores
//! set values, answers queries with them, and synthesizes the status block and
//! screen waveforms from its state. A [`SimMonitor`] shares the state so tests
//! can inspect the transfer log and inject faults after the link has been
//! handed to an executor.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use bytes::{BufMut, BytesMut};
use hdsctl_scpi::{expand, HDS_CHANNELS, HDS_COMMANDS, QUERY_MARKER};
use parking_lot::Mutex;
use serde_json::json;

use crate::error::{LinkError, LinkResult};
use crate::link::DeviceLink;

/// Identity reported by default.
pub const SIM_IDENTITY: &str = "OWON,HDS2202S,2024001,V3.0.0";

/// Samples per screen waveform.
pub const SIM_WAVE_SAMPLES: usize = 300;

/// Pixels per vertical division on the simulated screen.
const PIXELS_PER_DIVISION: f64 = 25.0;

const WAVE_AMPLITUDE: f64 = 100.0;
const WAVE_PERIOD: f64 = 50.0;

const HEAD_PATH: &str = ":DATA:WAVE:SCREEN:HEAD";
const WAVE_PATH_PREFIX: &str = ":DATA:WAVE:SCREEN:CH";

/// A fault applied to the next exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    /// The next write transfers only half of the command.
    ShortWrite,
    /// The next read times out.
    Timeout,
    /// The next response is cut to a few bytes.
    TruncatedRead,
    /// The next response is a status block without a timebase section.
    MalformedStatus,
}

/// One command received by the simulated instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// When the write arrived.
    pub at: Instant,
    /// The command text.
    pub command: String,
}

#[derive(Debug)]
struct SimState {
    identity: String,
    /// Uppercased mnemonic path -> value.
    values: HashMap<String, String>,
    pending: Option<LinkResult<Vec<u8>>>,
    writes: Vec<WriteRecord>,
    faults: VecDeque<SimFault>,
}

impl SimState {
    fn value(&self, path: &str) -> &str {
        self.values.get(path).map(String::as_str).unwrap_or_default()
    }

    fn channel_offset_pixels(&self, channel: u8) -> f64 {
        let divisions: f64 = self
            .value(&format!(":CH{}:OFFSET", channel))
            .parse()
            .unwrap_or_default();
        divisions * PIXELS_PER_DIVISION
    }

    fn respond(&self, path: &str) -> Vec<u8> {
        if path == HEAD_PATH {
            return frame(self.status_block().as_bytes());
        }
        if let Some(channel) = path.strip_prefix(WAVE_PATH_PREFIX) {
            if let Ok(channel) = channel.parse::<u8>() {
                return frame(&self.waveform(channel));
            }
        }
        if path == "*IDN" {
            return self.identity.clone().into_bytes();
        }
        self.value(path).as_bytes().to_vec()
    }

    fn status_block(&self) -> String {
        let channels: Vec<_> = HDS_CHANNELS
            .map(|ch| {
                let prefix = format!(":CH{}", ch);
                json!({
                    "NAME": format!("CH{}", ch),
                    "DISPLAY": self.value(&format!("{}:DISPLAY", prefix)),
                    "COUPLING": self.value(&format!("{}:COUPLING", prefix)),
                    "PROBE": self.value(&format!("{}:PROBE", prefix)),
                    "SCALE": self.value(&format!("{}:SCALE", prefix)),
                    "OFFSET": self.channel_offset_pixels(ch),
                })
            })
            .collect();
        let hoffset: f64 = self.value(":HORIZONTAL:OFFSET").parse().unwrap_or_default();

        json!({
            "TIMEBASE": {
                "SCALE": self.value(":HORIZONTAL:SCALE"),
                "HOFFSET": hoffset,
            },
            "SAMPLE": {
                "FULLSCREEN": SIM_WAVE_SAMPLES,
                "DATALEN": SIM_WAVE_SAMPLES,
                "TYPE": self.value(":ACQUIRE:MODE"),
                "DEPMEM": self.value(":ACQUIRE:DEPMEM"),
            },
            "CHANNEL": channels,
            "DATATYPE": "SCREEN",
            "RUNSTATUS": "TRIG",
            "Trig": {
                "Mode": "SINGle",
                "Type": "Edge",
                "Items": {
                    "Channel": self.value(":TRIGGER:SINGLE:SOURCE"),
                    "Level": self.value(":TRIGGER:SINGLE:EDGE:LEVEL"),
                    "Edge": self.value(":TRIGGER:SINGLE:EDGE"),
                    "Coupling": self.value(":TRIGGER:SINGLE:COUPLING"),
                    "Sweep": self.value(":TRIGGER:SINGLE:SWEEP"),
                },
            },
        })
        .to_string()
    }

    fn waveform(&self, channel: u8) -> Vec<u8> {
        let base = self.channel_offset_pixels(channel);
        (0..SIM_WAVE_SAMPLES)
            .map(|i| {
                let sample = base + WAVE_AMPLITUDE * (i as f64 / WAVE_PERIOD).sin();
                sample.round().clamp(-127.0, 127.0) as i8 as u8
            })
            .collect()
    }
}

/// Prefix a payload with its little-endian length.
fn frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(payload.len() + 4);
    buf.put_u32_le(payload.len() as u32);
    buf.put_slice(payload);
    buf.to_vec()
}

fn malformed_status_block() -> Vec<u8> {
    let block = json!({"SAMPLE": {"TYPE": "SAMPle", "DEPMEM": "4K"}, "RUNSTATUS": "STOP"});
    let mut text = block.to_string();
    text.push_str(&" ".repeat(128));
    frame(text.as_bytes())
}

/// Simulated HDS2000-series instrument.
#[derive(Debug, Clone)]
pub struct SimulatedScope {
    shared: Arc<Mutex<SimState>>,
}

impl Default for SimulatedScope {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedScope {
    /// Create an instrument with every parameter at its first legal value.
    ///
    /// Channel 1 is displayed and channel 2 is not.
    pub fn new() -> Self {
        let mut values = HashMap::new();
        for spec in HDS_COMMANDS {
            for def in expand(spec, HDS_CHANNELS) {
                let value = def
                    .domain
                    .as_ref()
                    .and_then(|domain| domain.first().cloned())
                    .unwrap_or_else(|| "0".to_string());
                values.insert(def.path.to_ascii_uppercase(), value);
            }
        }
        values.insert(":CH1:DISPLAY".to_string(), "ON".to_string());
        values.insert(":CH2:DISPLAY".to_string(), "OFF".to_string());
        values.insert(":CH1:SCALE".to_string(), "1.00V".to_string());
        values.insert(":CH2:SCALE".to_string(), "1.00V".to_string());

        SimulatedScope {
            shared: Arc::new(Mutex::new(SimState {
                identity: SIM_IDENTITY.to_string(),
                values,
                pending: None,
                writes: Vec::new(),
                faults: VecDeque::new(),
            })),
        }
    }

    /// Report a different identity string.
    pub fn with_identity(self, identity: impl Into<String>) -> Self {
        self.shared.lock().identity = identity.into();
        self
    }

    /// Get a handle that observes and steers this instrument.
    pub fn monitor(&self) -> SimMonitor {
        SimMonitor {
            shared: self.shared.clone(),
        }
    }
}

impl DeviceLink for SimulatedScope {
    fn write(&mut self, data: &[u8]) -> LinkResult<usize> {
        let mut state = self.shared.lock();
        let command = String::from_utf8_lossy(data).trim().to_string();
        state.writes.push(WriteRecord {
            at: Instant::now(),
            command: command.clone(),
        });

        let fault = state.faults.pop_front();
        if fault == Some(SimFault::ShortWrite) {
            state.pending = None;
            return Ok(data.len() / 2);
        }

        match command.strip_suffix(QUERY_MARKER) {
            Some(path) => {
                let response = match fault {
                    Some(SimFault::Timeout) => Err(LinkError::Timeout),
                    Some(SimFault::MalformedStatus) => Ok(malformed_status_block()),
                    Some(SimFault::TruncatedRead) => {
                        let mut response = state.respond(&path.to_ascii_uppercase());
                        response.truncate(10);
                        Ok(response)
                    }
                    _ => Ok(state.respond(&path.to_ascii_uppercase())),
                };
                state.pending = Some(response);
            }
            None => {
                if let Some((path, value)) = command.split_once(' ') {
                    state
                        .values
                        .insert(path.to_ascii_uppercase(), value.trim().to_string());
                }
                state.pending = None;
            }
        }
        Ok(data.len())
    }

    fn read(&mut self, max_len: usize) -> LinkResult<Vec<u8>> {
        let mut state = self.shared.lock();
        match state.pending.take() {
            Some(Ok(mut response)) => {
                response.truncate(max_len);
                Ok(response)
            }
            Some(Err(e)) => Err(e),
            None => Ok(Vec::new()),
        }
    }
}

/// Shared handle onto a [`SimulatedScope`].
#[derive(Debug, Clone)]
pub struct SimMonitor {
    shared: Arc<Mutex<SimState>>,
}

impl SimMonitor {
    /// Every command received so far.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.shared.lock().writes.clone()
    }

    /// Number of commands received so far.
    pub fn write_count(&self) -> usize {
        self.shared.lock().writes.len()
    }

    /// Current value of a parameter, by mnemonic path in any case.
    pub fn value(&self, path: &str) -> Option<String> {
        self.shared.lock().values.get(&path.to_ascii_uppercase()).cloned()
    }

    /// Change a parameter behind the executor's back, as the front panel would.
    pub fn set_value(&self, path: &str, value: impl Into<String>) {
        self.shared
            .lock()
            .values
            .insert(path.to_ascii_uppercase(), value.into());
    }

    /// Queue a fault for the next exchange.
    pub fn inject_fault(&self, fault: SimFault) {
        self.shared.lock().faults.push_back(fault);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(scope: &mut SimulatedScope, command: &str) -> Vec<u8> {
        assert_eq!(scope.write(command.as_bytes()).unwrap(), command.len());
        scope.read(10_000).unwrap()
    }

    #[test]
    fn test_set_then_query() {
        let mut scope = SimulatedScope::new();
        assert_eq!(query(&mut scope, ":CH2:DISPlay?"), b"OFF");
        scope.write(b":CH2:DISPlay ON").unwrap();
        assert_eq!(scope.read(10_000).unwrap(), b"");
        assert_eq!(query(&mut scope, ":ch2:display?"), b"ON");
        assert_eq!(scope.monitor().write_count(), 3);
    }

    #[test]
    fn test_status_block_framing() {
        let mut scope = SimulatedScope::new();
        let response = query(&mut scope, ":DATa:WAVe:SCReen:HEAD?");
        let len = u32::from_le_bytes([response[0], response[1], response[2], response[3]]);
        assert_eq!(len as usize, response.len() - 4);

        let block: serde_json::Value = serde_json::from_slice(&response[4..]).unwrap();
        assert_eq!(block["CHANNEL"][0]["DISPLAY"], "ON");
        assert_eq!(block["TIMEBASE"]["SCALE"], "5.0ns");
    }

    #[test]
    fn test_waveform_follows_offset() {
        let mut scope = SimulatedScope::new();
        scope.monitor().set_value(":CH1:OFFSet", "2");
        let response = query(&mut scope, ":DATa:WAVe:SCReen:CH1?");
        assert_eq!(response.len(), SIM_WAVE_SAMPLES + 4);
        assert_eq!(response[4] as i8, 50);
        assert!(response[4..].iter().all(|&b| (b as i8) >= -50));
    }

    #[test]
    fn test_faults_apply_once() {
        let mut scope = SimulatedScope::new();
        let monitor = scope.monitor();

        monitor.inject_fault(SimFault::ShortWrite);
        assert_eq!(scope.write(b"*IDN?").unwrap(), 2);
        assert_eq!(scope.read(10_000).unwrap(), b"");

        monitor.inject_fault(SimFault::Timeout);
        scope.write(b"*IDN?").unwrap();
        assert_eq!(scope.read(10_000), Err(LinkError::Timeout));

        assert_eq!(query(&mut scope, "*IDN?"), SIM_IDENTITY.as_bytes());
    }
}
