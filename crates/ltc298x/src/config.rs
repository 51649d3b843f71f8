//! Channel assignment words.
//!
//! [`ChannelConfig`] describes what is connected to a channel. It is checked
//! against the channel number with [`ChannelConfig::validate`], turned into
//! the 32-bit assignment word with [`ChannelConfig::encode`], and parsed back
//! with [`ChannelConfig::decode`]. None of this touches the bus.

use crate::error::{DecodeError, InvalidConfig};
use crate::field::{self, pack, Field, Fixed, IDEALITY, SENSE_OHMS};
use crate::registers::CHANNEL_COUNT;
use crate::sensor::{
    DiodeCurrent, ExcitationMode, OpenCircuitCurrent, RtdCurrent, RtdCurve, RtdType, ThermistorCurrent,
    ThermistorType, ThermocoupleType, Wiring, TYPE_CUSTOM_RTD, TYPE_CUSTOM_THERMISTOR, TYPE_CUSTOM_THERMOCOUPLE,
    TYPE_DIODE, TYPE_DIRECT_ADC, TYPE_SENSE_RESISTOR, TYPE_STEINHART_HART_THERMISTOR, TYPE_UNASSIGNED,
};
use crate::table::{TablePointer, MAX_EXTENT, MIN_ENTRIES, STEINHART_HART_COEFFICIENTS, STEINHART_HART_OFFSET_LIMIT};

/// Cold junction channel value meaning "no cold junction compensation".
pub const NO_COLD_JUNCTION: u8 = 0;

/// Largest sense resistor value, exclusive.
pub const SENSE_RESISTANCE_LIMIT: f64 = 131_072.0;

/// Largest diode ideality factor, exclusive.
pub const IDEALITY_LIMIT: f64 = 4.0;

/// Thermocouple options shared by built-in and custom thermocouples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermocoupleConfig {
    /// Channel of the cold junction sensor, or [`NO_COLD_JUNCTION`].
    pub cold_junction: u8,
    /// Measure against ground rather than against `ch - 1`.
    pub single_ended: bool,
    /// Enable open-circuit detection with the given test current.
    pub open_circuit: Option<OpenCircuitCurrent>,
}

impl Default for ThermocoupleConfig {
    /// Single-ended, uncompensated, no open-circuit detection.
    fn default() -> Self {
        Self {
            cold_junction: NO_COLD_JUNCTION,
            single_ended: true,
            open_circuit: None,
        }
    }
}

/// RTD options shared by built-in and custom RTDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtdConfig {
    /// Channel of the sense resistor.
    pub sense_resistor: u8,
    pub wiring: Wiring,
    pub mode: ExcitationMode,
    pub current: RtdCurrent,
}

impl RtdConfig {
    /// Two-wire RTD with a dedicated sense resistor on `sense_resistor`,
    /// excited with 100µA.
    pub const fn new(sense_resistor: u8) -> Self {
        Self {
            sense_resistor,
            wiring: Wiring::TwoWire,
            mode: ExcitationMode::NoSharing,
            current: RtdCurrent::MicroAmps100,
        }
    }
}

/// Thermistor options shared by every thermistor flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermistorConfig {
    /// Channel of the sense resistor.
    pub sense_resistor: u8,
    /// Measure against ground rather than against `ch - 1`.
    pub single_ended: bool,
    pub mode: ExcitationMode,
    pub current: ThermistorCurrent,
}

impl ThermistorConfig {
    /// Single-ended thermistor with a dedicated sense resistor on
    /// `sense_resistor` and automatic current selection.
    pub const fn new(sense_resistor: u8) -> Self {
        Self {
            sense_resistor,
            single_ended: true,
            mode: ExcitationMode::NoSharing,
            current: ThermistorCurrent::Auto,
        }
    }
}

/// Diode options.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiodeConfig {
    /// Measure against ground rather than against `ch - 1`.
    pub single_ended: bool,
    /// Take three readings (8x, 4x, 1x current) instead of two (8x, 1x).
    pub three_readings: bool,
    /// Average with the previous reading when they are close.
    pub average: bool,
    pub current: DiodeCurrent,
    /// Ideality factor in `[0, 4)`. `None` writes zero, which selects the
    /// chip's default.
    pub ideality: Option<f64>,
}

impl Default for DiodeConfig {
    fn default() -> Self {
        Self {
            single_ended: true,
            three_readings: false,
            average: false,
            current: DiodeCurrent::MicroAmps10,
            ideality: None,
        }
    }
}

/// What is connected to a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelConfig {
    /// Nothing; the channel is skipped.
    Unassigned,
    Thermocouple {
        kind: ThermocoupleType,
        config: ThermocoupleConfig,
    },
    /// Thermocouple linearized by a table in RAM.
    CustomThermocouple {
        config: ThermocoupleConfig,
        table: TablePointer,
    },
    Rtd {
        kind: RtdType,
        config: RtdConfig,
        curve: RtdCurve,
    },
    /// RTD linearized by a table in RAM.
    CustomRtd {
        config: RtdConfig,
        table: TablePointer,
    },
    Thermistor {
        kind: ThermistorType,
        config: ThermistorConfig,
    },
    /// Thermistor described by six Steinhart-Hart coefficients at `offset`.
    SteinhartHartThermistor {
        config: ThermistorConfig,
        offset: u16,
    },
    /// Thermistor linearized by a table in RAM.
    CustomThermistor {
        config: ThermistorConfig,
        table: TablePointer,
    },
    Diode(DiodeConfig),
    SenseResistor {
        ohms: f64,
    },
    /// Raw ADC voltage. `single_ended` only widens the allowed channel
    /// range; the assignment word carries the type code alone.
    DirectAdc {
        single_ended: bool,
    },
}

impl ChannelConfig {
    /// Sensor type code written to bits 31:27.
    pub fn sensor_type(&self) -> u8 {
        match self {
            ChannelConfig::Unassigned => TYPE_UNASSIGNED,
            ChannelConfig::Thermocouple { kind, .. } => kind.code(),
            ChannelConfig::CustomThermocouple { .. } => TYPE_CUSTOM_THERMOCOUPLE,
            ChannelConfig::Rtd { kind, .. } => kind.code(),
            ChannelConfig::CustomRtd { .. } => TYPE_CUSTOM_RTD,
            ChannelConfig::Thermistor { kind, .. } => kind.code(),
            ChannelConfig::SteinhartHartThermistor { .. } => TYPE_STEINHART_HART_THERMISTOR,
            ChannelConfig::CustomThermistor { .. } => TYPE_CUSTOM_THERMISTOR,
            ChannelConfig::Diode(_) => TYPE_DIODE,
            ChannelConfig::SenseResistor { .. } => TYPE_SENSE_RESISTOR,
            ChannelConfig::DirectAdc { .. } => TYPE_DIRECT_ADC,
        }
    }

    /// Check that this configuration may be assigned to channel `ch`.
    ///
    /// Differential inputs also use `ch - 1`, RTDs use `ch - 1` and, from
    /// three wires up, `ch - 2`; four-wire RTDs additionally use `ch + 1`.
    pub fn validate(&self, ch: u8) -> Result<(), InvalidConfig> {
        match self {
            ChannelConfig::Unassigned => channel_in(ch, 1, CHANNEL_COUNT),
            ChannelConfig::Thermocouple { config, .. } => validate_thermocouple(ch, config),
            ChannelConfig::CustomThermocouple { config, table } => {
                validate_thermocouple(ch, config)?;
                validate_pointer(table)
            }
            ChannelConfig::Rtd { config, .. } => {
                let wires = config.wiring.wires();
                channel_in(ch, 2 + (wires > 2) as u8, CHANNEL_COUNT - (wires >= 4) as u8)?;
                channel_in(config.sense_resistor, 2, CHANNEL_COUNT)?;
                if wires < 4 && config.mode == ExcitationMode::SharingRotation {
                    return Err(InvalidConfig::ParameterOutOfRange);
                }
                Ok(())
            }
            ChannelConfig::CustomRtd { config, table } => {
                // Unlike built-in RTDs, only exactly four wires reserve ch + 1
                // and rotation is refused only for two wires.
                let wires = config.wiring.wires();
                channel_in(ch, 2 + (wires > 2) as u8, CHANNEL_COUNT - (wires == 4) as u8)?;
                channel_in(config.sense_resistor, 2, CHANNEL_COUNT)?;
                if wires == 2 && config.mode == ExcitationMode::SharingRotation {
                    return Err(InvalidConfig::ParameterOutOfRange);
                }
                validate_pointer(table)
            }
            ChannelConfig::Thermistor { config, .. } => validate_thermistor(ch, config),
            ChannelConfig::SteinhartHartThermistor { config, offset } => {
                validate_thermistor(ch, config)?;
                if *offset >= STEINHART_HART_OFFSET_LIMIT {
                    return Err(InvalidConfig::TableLength);
                }
                Ok(())
            }
            ChannelConfig::CustomThermistor { config, table } => {
                validate_thermistor(ch, config)?;
                validate_pointer(table)
            }
            ChannelConfig::Diode(config) => {
                channel_in(ch, first_channel(config.single_ended), CHANNEL_COUNT)?;
                match config.ideality {
                    Some(ideality) if !(0.0..IDEALITY_LIMIT).contains(&ideality) => {
                        Err(InvalidConfig::ParameterOutOfRange)
                    }
                    _ => Ok(()),
                }
            }
            ChannelConfig::SenseResistor { ohms } => {
                channel_in(ch, 2, CHANNEL_COUNT)?;
                if !(0.0..SENSE_RESISTANCE_LIMIT).contains(ohms) {
                    return Err(InvalidConfig::ParameterOutOfRange);
                }
                Ok(())
            }
            ChannelConfig::DirectAdc { single_ended } => {
                channel_in(ch, first_channel(*single_ended), CHANNEL_COUNT)
            }
        }
    }

    /// Build the channel assignment word.
    pub fn encode(&self) -> Result<u32, InvalidConfig> {
        let sensor_type = (field::SENSOR_TYPE, self.sensor_type() as u32);
        match self {
            ChannelConfig::Unassigned => Ok(0),
            ChannelConfig::Thermocouple { config, .. } => {
                let [cj, se, oc, oc_current] = thermocouple_fields(config);
                pack(&[sensor_type, cj, se, oc, oc_current])
            }
            ChannelConfig::CustomThermocouple { config, table } => {
                let [cj, se, oc, oc_current] = thermocouple_fields(config);
                let [address, length] = pointer_fields(table);
                pack(&[sensor_type, cj, se, oc, oc_current, address, length])
            }
            ChannelConfig::Rtd { config, curve, .. } => {
                let [sr, wiring, mode, current] = rtd_fields(config);
                pack(&[sensor_type, sr, wiring, mode, current, (field::RTD_CURVE, curve.code() as u32)])
            }
            ChannelConfig::CustomRtd { config, table } => {
                let [sr, wiring, mode, current] = rtd_fields(config);
                let [address, length] = pointer_fields(table);
                pack(&[sensor_type, sr, wiring, mode, current, address, length])
            }
            ChannelConfig::Thermistor { config, .. } => {
                let [sr, se, mode, current] = thermistor_fields(config);
                pack(&[sensor_type, sr, se, mode, current])
            }
            ChannelConfig::SteinhartHartThermistor { config, offset } => {
                let [sr, se, mode, current] = thermistor_fields(config);
                let [address, length] = pointer_fields(&TablePointer {
                    offset: *offset,
                    len: STEINHART_HART_COEFFICIENTS as u8,
                });
                pack(&[sensor_type, sr, se, mode, current, address, length])
            }
            ChannelConfig::CustomThermistor { config, table } => {
                let [sr, se, mode, current] = thermistor_fields(config);
                let [address, length] = pointer_fields(table);
                pack(&[sensor_type, sr, se, mode, current, address, length])
            }
            ChannelConfig::Diode(config) => pack(&[
                sensor_type,
                (field::DIODE_SINGLE_ENDED, config.single_ended as u32),
                (field::DIODE_THREE_READINGS, config.three_readings as u32),
                (field::DIODE_AVERAGE, config.average as u32),
                (field::DIODE_CURRENT, config.current.code() as u32),
                match config.ideality {
                    Some(ideality) => fixed(field::DIODE_IDEALITY, IDEALITY, ideality)?,
                    None => (field::DIODE_IDEALITY, 0),
                },
            ]),
            ChannelConfig::SenseResistor { ohms } => {
                pack(&[sensor_type, fixed(field::SENSE_RESISTANCE, SENSE_OHMS, *ohms)?])
            }
            ChannelConfig::DirectAdc { .. } => pack(&[sensor_type]),
        }
    }

    /// Parse a channel assignment word.
    ///
    /// Fixed-point values come back truncated to the register resolution.
    /// A direct ADC word always decodes as differential.
    pub fn decode(word: u32) -> Result<Self, DecodeError> {
        let code = field::SENSOR_TYPE.extract(word) as u8;

        if let Some(kind) = ThermocoupleType::from_code(code) {
            return Ok(ChannelConfig::Thermocouple {
                kind,
                config: decode_thermocouple(word)?,
            });
        }
        if let Some(kind) = RtdType::from_code(code) {
            return Ok(ChannelConfig::Rtd {
                kind,
                config: decode_rtd(word)?,
                curve: decode_enum(word, field::RTD_CURVE, RtdCurve::from_code)?,
            });
        }
        if let Some(kind) = ThermistorType::from_code(code) {
            return Ok(ChannelConfig::Thermistor {
                kind,
                config: decode_thermistor(word)?,
            });
        }

        match code {
            TYPE_UNASSIGNED => Ok(ChannelConfig::Unassigned),
            TYPE_CUSTOM_THERMOCOUPLE => Ok(ChannelConfig::CustomThermocouple {
                config: decode_thermocouple(word)?,
                table: decode_pointer(word),
            }),
            TYPE_CUSTOM_RTD => Ok(ChannelConfig::CustomRtd {
                config: decode_rtd(word)?,
                table: decode_pointer(word),
            }),
            TYPE_STEINHART_HART_THERMISTOR => {
                let table = decode_pointer(word);
                if table.len as usize != STEINHART_HART_COEFFICIENTS {
                    return Err(DecodeError::ReservedValue(field::CUSTOM_LENGTH.name));
                }
                Ok(ChannelConfig::SteinhartHartThermistor {
                    config: decode_thermistor(word)?,
                    offset: table.offset,
                })
            }
            TYPE_CUSTOM_THERMISTOR => Ok(ChannelConfig::CustomThermistor {
                config: decode_thermistor(word)?,
                table: decode_pointer(word),
            }),
            TYPE_DIODE => {
                let ideality = field::DIODE_IDEALITY.extract(word);
                Ok(ChannelConfig::Diode(DiodeConfig {
                    single_ended: field::DIODE_SINGLE_ENDED.extract(word) != 0,
                    three_readings: field::DIODE_THREE_READINGS.extract(word) != 0,
                    average: field::DIODE_AVERAGE.extract(word) != 0,
                    current: decode_enum(word, field::DIODE_CURRENT, DiodeCurrent::from_code)?,
                    ideality: (ideality != 0).then(|| IDEALITY.to_f64(ideality)),
                }))
            }
            TYPE_SENSE_RESISTOR => Ok(ChannelConfig::SenseResistor {
                ohms: SENSE_OHMS.to_f64(field::SENSE_RESISTANCE.extract(word)),
            }),
            TYPE_DIRECT_ADC => Ok(ChannelConfig::DirectAdc { single_ended: false }),
            _ => Err(DecodeError::UnknownSensorType(code)),
        }
    }
}

fn channel_in(ch: u8, low: u8, high: u8) -> Result<(), InvalidConfig> {
    if (low..=high).contains(&ch) {
        Ok(())
    } else {
        Err(InvalidConfig::ChannelOutOfRange)
    }
}

/// Lowest usable channel; differential inputs also need `ch - 1`.
const fn first_channel(single_ended: bool) -> u8 {
    if single_ended {
        1
    } else {
        2
    }
}

fn validate_thermocouple(ch: u8, config: &ThermocoupleConfig) -> Result<(), InvalidConfig> {
    channel_in(ch, first_channel(config.single_ended), CHANNEL_COUNT)?;
    channel_in(config.cold_junction, NO_COLD_JUNCTION, CHANNEL_COUNT)
}

fn validate_thermistor(ch: u8, config: &ThermistorConfig) -> Result<(), InvalidConfig> {
    channel_in(ch, first_channel(config.single_ended), CHANNEL_COUNT)?;
    channel_in(config.sense_resistor, 2, CHANNEL_COUNT)
}

fn validate_pointer(table: &TablePointer) -> Result<(), InvalidConfig> {
    let len = table.len as usize;
    if len < MIN_ENTRIES || table.offset as usize + len > MAX_EXTENT {
        return Err(InvalidConfig::TableLength);
    }
    Ok(())
}

fn thermocouple_fields(config: &ThermocoupleConfig) -> [(Field, u32); 4] {
    [
        (field::TC_COLD_JUNCTION, config.cold_junction as u32),
        (field::TC_SINGLE_ENDED, config.single_ended as u32),
        (field::TC_OPEN_CIRCUIT, config.open_circuit.is_some() as u32),
        (
            field::TC_OPEN_CIRCUIT_CURRENT,
            config.open_circuit.map_or(0, |current| current.code() as u32),
        ),
    ]
}

fn rtd_fields(config: &RtdConfig) -> [(Field, u32); 4] {
    [
        (field::RTD_SENSE_RESISTOR, config.sense_resistor as u32),
        (field::RTD_WIRING, config.wiring.code() as u32),
        (field::RTD_EXCITATION_MODE, config.mode.code() as u32),
        (field::RTD_EXCITATION_CURRENT, config.current.code() as u32),
    ]
}

fn thermistor_fields(config: &ThermistorConfig) -> [(Field, u32); 4] {
    [
        (field::THERMISTOR_SENSE_RESISTOR, config.sense_resistor as u32),
        (field::THERMISTOR_SINGLE_ENDED, config.single_ended as u32),
        (field::THERMISTOR_EXCITATION_MODE, config.mode.code() as u32),
        (field::THERMISTOR_EXCITATION_CURRENT, config.current.code() as u32),
    ]
}

fn pointer_fields(table: &TablePointer) -> [(Field, u32); 2] {
    [
        (field::CUSTOM_ADDRESS, table.offset as u32),
        // An empty table wraps to u32::MAX and is refused by `pack`.
        (field::CUSTOM_LENGTH, (table.len as u32).wrapping_sub(1)),
    ]
}

/// Quantize `value` for `field`, refusing NaN and values the format cannot
/// hold.
fn fixed(field: Field, format: Fixed, value: f64) -> Result<(Field, u32), InvalidConfig> {
    let raw = format.quantize(value).ok_or(InvalidConfig::FieldOverflow(field.name))?;
    Ok((field, raw))
}

fn decode_enum<T>(word: u32, field: Field, from_code: fn(u8) -> Option<T>) -> Result<T, DecodeError> {
    from_code(field.extract(word) as u8).ok_or(DecodeError::ReservedValue(field.name))
}

fn decode_thermocouple(word: u32) -> Result<ThermocoupleConfig, DecodeError> {
    let open_circuit = if field::TC_OPEN_CIRCUIT.extract(word) != 0 {
        Some(decode_enum(word, field::TC_OPEN_CIRCUIT_CURRENT, OpenCircuitCurrent::from_code)?)
    } else if field::TC_OPEN_CIRCUIT_CURRENT.extract(word) != 0 {
        // A current without detection cannot be expressed and would not
        // survive re-encoding.
        return Err(DecodeError::ReservedValue(field::TC_OPEN_CIRCUIT_CURRENT.name));
    } else {
        None
    };
    Ok(ThermocoupleConfig {
        cold_junction: field::TC_COLD_JUNCTION.extract(word) as u8,
        single_ended: field::TC_SINGLE_ENDED.extract(word) != 0,
        open_circuit,
    })
}

fn decode_rtd(word: u32) -> Result<RtdConfig, DecodeError> {
    Ok(RtdConfig {
        sense_resistor: field::RTD_SENSE_RESISTOR.extract(word) as u8,
        wiring: decode_enum(word, field::RTD_WIRING, Wiring::from_code)?,
        mode: decode_enum(word, field::RTD_EXCITATION_MODE, ExcitationMode::from_code)?,
        current: decode_enum(word, field::RTD_EXCITATION_CURRENT, RtdCurrent::from_code)?,
    })
}

fn decode_thermistor(word: u32) -> Result<ThermistorConfig, DecodeError> {
    Ok(ThermistorConfig {
        sense_resistor: field::THERMISTOR_SENSE_RESISTOR.extract(word) as u8,
        single_ended: field::THERMISTOR_SINGLE_ENDED.extract(word) != 0,
        mode: decode_enum(word, field::THERMISTOR_EXCITATION_MODE, ExcitationMode::from_code)?,
        current: decode_enum(word, field::THERMISTOR_EXCITATION_CURRENT, ThermistorCurrent::from_code)?,
    })
}

fn decode_pointer(word: u32) -> TablePointer {
    TablePointer {
        offset: field::CUSTOM_ADDRESS.extract(word) as u16,
        len: field::CUSTOM_LENGTH.extract(word) as u8 + 1,
    }
}
