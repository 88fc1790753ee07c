//! Typed identifiers for the fields callers address directly.

/// Fields of the instrument that are addressed by name rather than parsed
/// from a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Instrument identity (`idn`)
    Identity,
    /// Main time base scale (`horScal`)
    HorizontalScale,
    /// Main time base offset (`horOffs`)
    HorizontalOffset,
    /// Acquisition mode (`acqMod`)
    AcquireMode,
    /// Acquisition memory depth (`acqDepm`)
    AcquireDepth,
    /// Channel 1 display status (`ch1Disp`)
    Ch1Display,
    /// Channel 1 vertical scale (`ch1Scal`)
    Ch1Scale,
    /// Channel 1 vertical offset (`ch1Offs`)
    Ch1Offset,
    /// Channel 1 probe attenuation (`ch1Prob`)
    Ch1Probe,
    /// Channel 1 coupling (`ch1Coup`)
    Ch1Coupling,
    /// Channel 2 display status (`ch2Disp`)
    Ch2Display,
    /// Channel 2 vertical scale (`ch2Scal`)
    Ch2Scale,
    /// Channel 2 vertical offset (`ch2Offs`)
    Ch2Offset,
    /// Channel 2 probe attenuation (`ch2Prob`)
    Ch2Probe,
    /// Channel 2 coupling (`ch2Coup`)
    Ch2Coupling,
    /// Screen waveform status block (`datWavScrHead`)
    StatusHead,
    /// Channel 1 screen waveform (`datWavScrCh1`)
    Ch1Wave,
    /// Channel 2 screen waveform (`datWavScrCh2`)
    Ch2Wave,
    /// Trigger status (`trigStat`)
    TriggerStatus,
    /// Trigger source (`trigSingSour`)
    TriggerSource,
    /// Trigger coupling (`trigSingCoup`)
    TriggerCoupling,
    /// Trigger slope (`trigSingEdg`)
    TriggerEdge,
    /// Trigger sweep mode (`trigSingSwe`)
    TriggerSweep,
    /// Trigger level (`trigSingEdgLev`)
    TriggerLevel,
    /// Generator waveform (`func`)
    Function,
    /// Generator offset (`funcOffs`)
    FunctionOffset,
    /// Generator output status (`chan`)
    Output,
    /// Generator frequency (`funcFreq`)
    FunctionFrequency,
    /// Generator amplitude (`funcAmpl`)
    FunctionAmplitude,
    /// Generator low level (`funcLow`)
    FunctionLow,
    /// Generator high level (`funcHigh`)
    FunctionHigh,
    /// Multimeter reading (`dmmMeas`)
    MeterReading,
}

impl Field {
    /// Fields polled by the live viewer, in emission order.
    pub const STREAMED: &'static [Field] = &[
        Field::Ch1Display,
        Field::Ch1Scale,
        Field::Ch1Offset,
        Field::Ch1Probe,
        Field::Ch1Coupling,
        Field::Ch2Display,
        Field::Ch2Scale,
        Field::Ch2Offset,
        Field::Ch2Probe,
        Field::Ch2Coupling,
        Field::HorizontalScale,
        Field::HorizontalOffset,
        Field::AcquireMode,
        Field::AcquireDepth,
        Field::Function,
        Field::FunctionOffset,
        Field::Output,
        Field::FunctionFrequency,
        Field::FunctionAmplitude,
        Field::FunctionLow,
        Field::FunctionHigh,
        Field::TriggerSource,
        Field::TriggerCoupling,
        Field::TriggerEdge,
        Field::TriggerSweep,
        Field::TriggerLevel,
        Field::MeterReading,
    ];

    /// Get the camel-case id used by the catalog and by remote viewers.
    pub fn id(&self) -> &'static str {
        match self {
            Field::Identity => "idn",
            Field::HorizontalScale => "horScal",
            Field::HorizontalOffset => "horOffs",
            Field::AcquireMode => "acqMod",
            Field::AcquireDepth => "acqDepm",
            Field::Ch1Display => "ch1Disp",
            Field::Ch1Scale => "ch1Scal",
            Field::Ch1Offset => "ch1Offs",
            Field::Ch1Probe => "ch1Prob",
            Field::Ch1Coupling => "ch1Coup",
            Field::Ch2Display => "ch2Disp",
            Field::Ch2Scale => "ch2Scal",
            Field::Ch2Offset => "ch2Offs",
            Field::Ch2Probe => "ch2Prob",
            Field::Ch2Coupling => "ch2Coup",
            Field::StatusHead => "datWavScrHead",
            Field::Ch1Wave => "datWavScrCh1",
            Field::Ch2Wave => "datWavScrCh2",
            Field::TriggerStatus => "trigStat",
            Field::TriggerSource => "trigSingSour",
            Field::TriggerCoupling => "trigSingCoup",
            Field::TriggerEdge => "trigSingEdg",
            Field::TriggerSweep => "trigSingSwe",
            Field::TriggerLevel => "trigSingEdgLev",
            Field::Function => "func",
            Field::FunctionOffset => "funcOffs",
            Field::Output => "chan",
            Field::FunctionFrequency => "funcFreq",
            Field::FunctionAmplitude => "funcAmpl",
            Field::FunctionLow => "funcLow",
            Field::FunctionHigh => "funcHigh",
            Field::MeterReading => "dmmMeas",
        }
    }

    /// Parse a field from its id.
    pub fn from_id(id: &str) -> Option<Field> {
        match id {
            "idn" => Some(Field::Identity),
            "horScal" => Some(Field::HorizontalScale),
            "horOffs" => Some(Field::HorizontalOffset),
            "acqMod" => Some(Field::AcquireMode),
            "acqDepm" => Some(Field::AcquireDepth),
            "ch1Disp" => Some(Field::Ch1Display),
            "ch1Scal" => Some(Field::Ch1Scale),
            "ch1Offs" => Some(Field::Ch1Offset),
            "ch1Prob" => Some(Field::Ch1Probe),
            "ch1Coup" => Some(Field::Ch1Coupling),
            "ch2Disp" => Some(Field::Ch2Display),
            "ch2Scal" => Some(Field::Ch2Scale),
            "ch2Offs" => Some(Field::Ch2Offset),
            "ch2Prob" => Some(Field::Ch2Probe),
            "ch2Coup" => Some(Field::Ch2Coupling),
            "datWavScrHead" => Some(Field::StatusHead),
            "datWavScrCh1" => Some(Field::Ch1Wave),
            "datWavScrCh2" => Some(Field::Ch2Wave),
            "trigStat" => Some(Field::TriggerStatus),
            "trigSingSour" => Some(Field::TriggerSource),
            "trigSingCoup" => Some(Field::TriggerCoupling),
            "trigSingEdg" => Some(Field::TriggerEdge),
            "trigSingSwe" => Some(Field::TriggerSweep),
            "trigSingEdgLev" => Some(Field::TriggerLevel),
            "func" => Some(Field::Function),
            "funcOffs" => Some(Field::FunctionOffset),
            "chan" => Some(Field::Output),
            "funcFreq" => Some(Field::FunctionFrequency),
            "funcAmpl" => Some(Field::FunctionAmplitude),
            "funcLow" => Some(Field::FunctionLow),
            "funcHigh" => Some(Field::FunctionHigh),
            "dmmMeas" => Some(Field::MeterReading),
            _ => None,
        }
    }

    /// Display-status field of a channel.
    pub fn channel_display(channel: u8) -> Option<Field> {
        match channel {
            1 => Some(Field::Ch1Display),
            2 => Some(Field::Ch2Display),
            _ => None,
        }
    }

    /// Screen-waveform field of a channel.
    pub fn channel_wave(channel: u8) -> Option<Field> {
        match channel {
            1 => Some(Field::Ch1Wave),
            2 => Some(Field::Ch2Wave),
            _ => None,
        }
    }

    /// Whether a remote viewer should be told the legal values of this field.
    ///
    /// Multimeter fields never surface their domain.
    pub fn surfaces_domain(&self) -> bool {
        !self.id().starts_with("dmm")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hds::hds_catalog;

    #[test]
    fn test_every_field_resolves() {
        let catalog = hds_catalog().unwrap();
        for field in Field::STREAMED.iter().chain(&[
            Field::Identity,
            Field::StatusHead,
            Field::Ch1Wave,
            Field::Ch2Wave,
            Field::TriggerStatus,
        ]) {
            let def = catalog.field(*field).unwrap_or_else(|| panic!("{:?}", field));
            assert_eq!(def.id, field.id());
            assert_eq!(Field::from_id(field.id()), Some(*field));
        }
    }

    #[test]
    fn test_channel_helpers() {
        assert_eq!(Field::channel_display(2), Some(Field::Ch2Display));
        assert_eq!(Field::channel_wave(1), Some(Field::Ch1Wave));
        assert_eq!(Field::channel_wave(3), None);
        assert!(!Field::MeterReading.surfaces_domain());
        assert!(Field::Function.surfaces_domain());
    }
}
