//! Decoding of the screen-head status block.
//!
//! The status block is a JSON document describing timebase, acquisition,
//! channel and trigger state. Decoding it yields one cache entry per covered
//! parameter, all stamped with the same capture instant.

use std::time::Instant;

use serde::Deserialize;

use crate::cache::CacheEntry;
use crate::error::StatusBlockError;

/// Section whose absence marks a bogus block.
pub const TIMEBASE_SECTION: &str = "TIMEBASE";

#[derive(Debug, Deserialize)]
struct StatusBlock {
    #[serde(rename = "TIMEBASE")]
    timebase: Timebase,
    #[serde(rename = "SAMPLE")]
    sample: Sample,
    #[serde(rename = "CHANNEL")]
    channels: Vec<ChannelState>,
    #[serde(rename = "Trig")]
    trigger: Trigger,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct Timebase {
    scale: String,
    hoffset: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct Sample {
    #[serde(rename = "TYPE")]
    mode: String,
    depmem: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct ChannelState {
    display: String,
    coupling: String,
    probe: String,
    scale: String,
    offset: f64,
}

#[derive(Debug, Deserialize)]
struct Trigger {
    #[serde(rename = "Items")]
    items: TriggerItems,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TriggerItems {
    channel: String,
    coupling: String,
    edge: String,
    level: String,
    sweep: String,
}

/// Number of channels the block must describe.
const BLOCK_CHANNELS: usize = 2;

/// Decode a status block into cache entries keyed by mnemonic path.
///
/// Channel offsets are reported in pixels and divided by `offset_divisor` to
/// get divisions. Either the whole block decodes or nothing is returned.
pub fn decode_status_block(
    block: &[u8],
    offset_divisor: f64,
    captured_at: Instant,
) -> Result<Vec<(String, CacheEntry)>, StatusBlockError> {
    let raw: serde_json::Value =
        serde_json::from_slice(block).map_err(|e| StatusBlockError::Malformed(e.to_string()))?;
    if raw.get(TIMEBASE_SECTION).map_or(true, |v| v.is_null()) {
        return Err(StatusBlockError::MissingSection(TIMEBASE_SECTION));
    }
    let status: StatusBlock =
        serde_json::from_value(raw).map_err(|e| StatusBlockError::Malformed(e.to_string()))?;
    if status.channels.len() < BLOCK_CHANNELS {
        return Err(StatusBlockError::Malformed(format!(
            "expected {} channels, got {}",
            BLOCK_CHANNELS,
            status.channels.len()
        )));
    }

    let mut values: Vec<(String, String)> = vec![
        (":HORizontal:SCALe".into(), status.timebase.scale),
        (":HORizontal:OFFSet".into(), format!("{:.6}", status.timebase.hoffset)),
        (":ACQuire:MODe".into(), status.sample.mode),
        (":ACQuire:DEPMem".into(), status.sample.depmem),
    ];
    for (index, channel) in status.channels.into_iter().take(BLOCK_CHANNELS).enumerate() {
        let prefix = format!(":CH{}", index + 1);
        values.push((format!("{}:DISPlay", prefix), channel.display));
        values.push((format!("{}:COUPling", prefix), channel.coupling));
        values.push((format!("{}:PROBe", prefix), channel.probe));
        values.push((format!("{}:SCALe", prefix), channel.scale));
        values.push((
            format!("{}:OFFSet", prefix),
            format!("{:.2}", channel.offset / offset_divisor),
        ));
    }
    let items = status.trigger.items;
    values.extend([
        (":TRIGger:SINGle:SOURce".into(), items.channel),
        (":TRIGger:SINGle:COUPling".into(), items.coupling),
        (":TRIGger:SINGle:EDGe".into(), items.edge),
        (":TRIGger:SINGle:EDGe:LEVel".into(), items.level),
        (":TRIGger:SINGle:SWEep".into(), items.sweep),
    ]);

    Ok(values
        .into_iter()
        .map(|(path, value)| (path, CacheEntry::new(value.into_bytes(), captured_at)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const HEADER: &str = r#"{
        "TIMEBASE": {"SCALE": "20ns", "HOFFSET": 0},
        "SAMPLE": {"FULLSCREEN": 300, "DATALEN": 300, "SAMPLERATE": "250MSa/s", "TYPE": "SAMPle", "DEPMEM": "4K"},
        "CHANNEL": [
            {"NAME": "CH1", "DISPLAY": "ON", "COUPLING": "DC", "PROBE": "10X", "SCALE": "50.0mV", "OFFSET": -25, "FREQUENCE": 10000000.0},
            {"NAME": "CH2", "DISPLAY": "OFF", "COUPLING": "DC", "PROBE": "10X", "SCALE": "100mV", "OFFSET": 36, "FREQUENCE": 0.0}
        ],
        "DATATYPE": "SCREEN",
        "RUNSTATUS": "TRIG",
        "Trig": {"Mode": "SINGle", "Type": "Edge", "Items": {"Channel": "CH1", "Level": "1.00V", "Edge": "RISE", "Coupling": "DC", "Sweep": "AUTO"}}
    }"#;

    fn decode(block: &str) -> Result<HashMap<String, CacheEntry>, StatusBlockError> {
        decode_status_block(block.as_bytes(), 25.0, Instant::now()).map(|v| v.into_iter().collect())
    }

    fn text(entries: &HashMap<String, CacheEntry>, path: &str) -> String {
        String::from_utf8(entries[path].value.to_vec()).unwrap()
    }

    #[test]
    fn test_decode_full_block() {
        let entries = decode(HEADER).unwrap();
        assert_eq!(entries.len(), 19);
        assert_eq!(text(&entries, ":HORizontal:SCALe"), "20ns");
        assert_eq!(text(&entries, ":HORizontal:OFFSet"), "0.000000");
        assert_eq!(text(&entries, ":ACQuire:MODe"), "SAMPle");
        assert_eq!(text(&entries, ":CH1:OFFSet"), "-1.00");
        assert_eq!(text(&entries, ":CH2:OFFSet"), "1.44");
        assert_eq!(text(&entries, ":CH2:DISPlay"), "OFF");
        assert_eq!(text(&entries, ":TRIGger:SINGle:EDGe:LEVel"), "1.00V");

        let stamp = entries[":CH1:DISPlay"].captured_at;
        assert!(entries.values().all(|e| e.captured_at == stamp));
    }

    #[test]
    fn test_missing_timebase() {
        let err = decode(r#"{"SAMPLE": {"TYPE": "SAMPle", "DEPMEM": "4K"}}"#).unwrap_err();
        assert_eq!(err, StatusBlockError::MissingSection(TIMEBASE_SECTION));
    }

    #[test]
    fn test_garbage_and_partial_blocks() {
        assert!(matches!(decode("\u{1}\u{2}garbage"), Err(StatusBlockError::Malformed(_))));
        let partial = r#"{"TIMEBASE": {"SCALE": "20ns", "HOFFSET": 0}}"#;
        assert!(matches!(decode(partial), Err(StatusBlockError::Malformed(_))));
    }
}
