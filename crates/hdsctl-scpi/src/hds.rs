//! Command table of the HDS2000-series handheld instruments.

use std::ops::RangeInclusive;

use crate::catalog::{AccessMode, Catalog, CommandSpec};
use crate::error::ScpiResult;

use AccessMode::{ReadOnly, ReadWrite};

/// Channel indices substituted for the placeholder.
pub const HDS_CHANNELS: RangeInclusive<u8> = 1..=2;

const ON_OFF: &[&str] = &["ON", "OFF"];
const AC_DC: &[&str] = &["AC", "DC"];

const TIMEBASE_SCALES: &[&str] = &[
    "5.0ns", "10ns", "20ns", "50ns", "100ns", "200ns", "500ns", "1.0us", "2.0us", "5.0us",
    "10us", "20us", "50us", "100us", "200us", "500us", "1.0ms", "2.0ms", "5.0ms", "10ms", "20ms",
    "50ms", "100ms", "200ms", "500ms", "1.0s", "2.0s", "5.0s", "10s", "20s", "50s", "100s",
    "200s", "500s", "1000s",
];

// With a 1X probe the range is 10.0mV to 10V, 100mV to 100V with 10X, and so on.
const VERTICAL_SCALES: &[&str] = &[
    "10.0mV", "20.0mV", "50.0mV", "100mV", "200mV", "500mV", "1.00V", "2.00V", "5.00V", "10.0V",
    "20.0V", "50.0V", "100V", "200V", "500V", "1.00kV", "2.00kV", "5.00kV", "10.0kV",
];

const FUNCTIONS: &[&str] = &[
    "SINE", "SQUare", "RAMP", "PULSe", "AmpALT", "AttALT", "StairDn", "StairUD", "StairUp",
    "Besselj", "Bessely", "Sinc",
];

/// Every parameter the instrument exposes.
pub const HDS_COMMANDS: &[CommandSpec] = &[
    CommandSpec::new("*IDN", ReadOnly, None, "the ID character string of the instrument"),
    // Changing the scale moves the offset as well.
    CommandSpec::new(":HORizontal:SCALe", ReadWrite, Some(TIMEBASE_SCALES), "the scale of the main time base"),
    // In divisions; the screen shows +/-6 but the offset may lie off screen.
    CommandSpec::new(":HORizontal:OFFSet", ReadWrite, None, "the horizontal offset of the time base"),
    CommandSpec::new(":ACQuire:MODe", ReadWrite, Some(&["SAMPle", "PEAK"]), "the acquisition mode of the oscilloscope"),
    CommandSpec::new(
        ":ACQuire:DEPMem",
        ReadWrite,
        Some(&["4K", "8K"]),
        "the number of waveform points that the oscilloscope can store in a single trigger sample",
    ),
    CommandSpec::new(":CH<n>:DISPlay", ReadWrite, Some(ON_OFF), "the display status of the channel"),
    CommandSpec::new(":CH<n>:COUPling", ReadWrite, Some(&["AC", "DC", "GND"]), "the coupling mode of the channel"),
    CommandSpec::new(":CH<n>:PROBe", ReadWrite, Some(&["1X", "10X", "100X", "1000X"]), "the attenuation ratio of the probe"),
    CommandSpec::new(":CH<n>:SCALe", ReadWrite, Some(VERTICAL_SCALES), "the vertical scale"),
    CommandSpec::new(":CH<n>:OFFSet", ReadWrite, None, "the vertical offset"),
    CommandSpec::new(":DATa:WAVe:SCReen:HEAD", ReadOnly, None, "the file header of the screen waveform data file"),
    CommandSpec::new(":DATa:WAVe:SCReen:CH<n>", ReadOnly, None, "the screen waveform data of the specified channel"),
    CommandSpec::new(":TRIGger:STATus", ReadOnly, None, "the trigger status"),
    CommandSpec::new(":TRIGger:SINGle:SOURce", ReadWrite, Some(&["CH1", "CH2"]), "the trigger source"),
    CommandSpec::new(":TRIGger:SINGle:COUPling", ReadWrite, Some(AC_DC), "the trigger coupling"),
    CommandSpec::new(":TRIGger:SINGle:EDGe", ReadWrite, Some(&["RISE", "FALL"]), "the slope of the trigger"),
    CommandSpec::new(":TRIGger:SINGle:EDGe:LEVel", ReadWrite, None, "the trigger level"),
    CommandSpec::new(":TRIGger:SINGle:SWEep", ReadWrite, Some(&["AUTO", "NORMal", "SINGle"]), "the trigger sweep mode"),
    CommandSpec::new(":MEASurement:DISPlay", ReadWrite, Some(ON_OFF), "the display status of measurements"),
    // MAX, PERiod and FREQuency accept sets; the instrument decides what they do.
    CommandSpec::new(":MEASurement:CH<n>:MAX", ReadWrite, None, "the measured MAX for channel <n>"),
    CommandSpec::new(":MEASurement:CH<n>:MIN", ReadOnly, None, "the measured MIN for channel <n>"),
    CommandSpec::new(":MEASurement:CH<n>:PKPK", ReadOnly, None, "the measured Peak-to-Peak for channel <n>"),
    CommandSpec::new(":MEASurement:CH<n>:VAMP", ReadOnly, None, "the measured vertical amplitude for channel <n>"),
    CommandSpec::new(":MEASurement:CH<n>:AVERage", ReadOnly, None, "the measured average for channel <n>"),
    CommandSpec::new(":MEASurement:CH<n>:PERiod", ReadWrite, None, "the measured period for channel <n>"),
    CommandSpec::new(":MEASurement:CH<n>:FREQuency", ReadWrite, None, "the measured frequency for channel <n>"),
    CommandSpec::new(":FUNCtion", ReadWrite, Some(FUNCTIONS), "the form of the function generated"),
    CommandSpec::new(":FUNCtion:FREQuency", ReadWrite, None, "the output frequency of the arbitrary function generator"),
    CommandSpec::new(":FUNCtion:PERiod", ReadWrite, None, "the output period of the arbitrary function generator"),
    CommandSpec::new(":FUNCtion:AMPLitude", ReadWrite, None, "the amplitude Peak-to-Peak of the arbitrary function generator"),
    CommandSpec::new(":FUNCtion:OFFSet", ReadWrite, None, "the offset of the arbitrary function generator"),
    CommandSpec::new(":FUNCtion:HIGHt", ReadWrite, None, "the high level of the arbitrary function generator"),
    CommandSpec::new(":FUNCtion:LOW", ReadWrite, None, "the low level of the arbitrary function generator"),
    CommandSpec::new(
        ":FUNCtion:SYMMetry",
        ReadWrite,
        None,
        "the symmetry of ramp waveform as a percentage of the arbitrary function generator",
    ),
    CommandSpec::new(":FUNCtion:WIDTh", ReadWrite, None, "the pulse width of the arbitrary function generator"),
    CommandSpec::new(":FUNCtion:RISing", ReadWrite, None, "the rising time of the arbitrary function generator"),
    CommandSpec::new(":FUNCtion:FALing", ReadWrite, None, "the falling time for the arbitrary function generator"),
    CommandSpec::new(
        ":FUNCtion:DTYCycle",
        ReadWrite,
        None,
        "the duty cycle of the pulse waveform as a percentage of the arbitrary function generator",
    ),
    CommandSpec::new(":FUNCtion:LOAD", ReadWrite, Some(ON_OFF), "the load status of the arbitrary function generator"),
    CommandSpec::new(":CHANnel", ReadWrite, Some(ON_OFF), "the status of the arbitrary function generator"),
    CommandSpec::new(":DMM:CONFigure", ReadWrite, Some(&["R", "RS", "DIODE", "C"]), "the present measurement function of the multimeter"),
    CommandSpec::new(":DMM:CONFigure:VOLTage", ReadWrite, Some(AC_DC), "the voltage measurement type of the multimeter"),
    CommandSpec::new(":DMM:CONFigure:CURRent", ReadWrite, Some(AC_DC), "the current measurement type of the multimeter"),
    CommandSpec::new(":DMM:REL", ReadWrite, Some(ON_OFF), "the relative status of the multimeter"),
    CommandSpec::new(":DMM:RANGE", ReadWrite, Some(&["ON", "OFF", "mV", "V"]), "the range of the multimeter"),
    CommandSpec::new(":DMM:AUTO", ReadWrite, Some(&["ON"]), "the auto range status of the multimeter"),
    CommandSpec::new(":DMM:MEAS", ReadOnly, None, "the measured value of the multimeter"),
];

/// Build the catalog of the HDS2000-series instruments.
pub fn hds_catalog() -> ScpiResult<Catalog> {
    Catalog::build(HDS_COMMANDS, HDS_CHANNELS)
}
