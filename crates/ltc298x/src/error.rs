//! Error types for the LTC298x driver.

use core::fmt;

/// Errors that can occur when talking to the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Underlying SPI bus error.
    Spi(E),

    /// The request was rejected before anything was sent to the chip.
    Invalid(InvalidConfig),

    /// A register read back from the chip holds a value with no defined
    /// meaning.
    Decode(DecodeError),
}

/// Reasons a request is rejected without touching the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidConfig {
    /// A channel number lies outside the range allowed for this sensor and
    /// wiring.
    ChannelOutOfRange,

    /// A numeric parameter lies outside its documented range, or an option
    /// is not available for this wiring.
    ParameterOutOfRange,

    /// A custom table has too few entries or does not fit in table RAM.
    TableLength,

    /// Custom table entries are not strictly increasing.
    TableNotMonotonic,

    /// A custom table entry lies outside the range the chip can represent.
    TableOutOfRange,

    /// A value does not fit into the named register field.
    FieldOverflow(&'static str),
}

/// Errors produced while parsing a channel assignment word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The sensor type code is not assigned.
    UnknownSensorType(u8),

    /// The named field holds a value with no defined meaning.
    ReservedValue(&'static str),
}

impl<E> From<InvalidConfig> for Error<E> {
    fn from(error: InvalidConfig) -> Self {
        Error::Invalid(error)
    }
}

impl<E> From<DecodeError> for Error<E> {
    fn from(error: DecodeError) -> Self {
        Error::Decode(error)
    }
}

impl fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InvalidConfig::ChannelOutOfRange => write!(f, "channel out of range"),
            InvalidConfig::ParameterOutOfRange => write!(f, "parameter out of range"),
            InvalidConfig::TableLength => write!(f, "custom table has an invalid length"),
            InvalidConfig::TableNotMonotonic => {
                write!(f, "custom table entries must be strictly increasing")
            }
            InvalidConfig::TableOutOfRange => write!(f, "custom table entry out of range"),
            InvalidConfig::FieldOverflow(field) => write!(f, "value does not fit in {}", field),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spi(e) => write!(f, "SPI error: {:?}", e),
            Error::Invalid(e) => write!(f, "invalid request: {}", e),
            Error::Decode(e) => write!(f, "unexpected register contents: {}", e),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::UnknownSensorType(code) => write!(f, "unknown sensor type {:#04x}", code),
            DecodeError::ReservedValue(field) => write!(f, "reserved value in {}", field),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InvalidConfig {
    fn format(&self, f: defmt::Formatter) {
        match self {
            InvalidConfig::ChannelOutOfRange => defmt::write!(f, "channel out of range"),
            InvalidConfig::ParameterOutOfRange => defmt::write!(f, "parameter out of range"),
            InvalidConfig::TableLength => defmt::write!(f, "invalid table length"),
            InvalidConfig::TableNotMonotonic => defmt::write!(f, "table not monotonic"),
            InvalidConfig::TableOutOfRange => defmt::write!(f, "table entry out of range"),
            InvalidConfig::FieldOverflow(field) => defmt::write!(f, "overflow in {}", field),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Spi(e) => defmt::write!(f, "SPI error: {}", e),
            Error::Invalid(e) => defmt::write!(f, "invalid request: {}", e),
            Error::Decode(e) => defmt::write!(f, "unexpected register contents: {}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DecodeError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            DecodeError::UnknownSensorType(code) => {
                defmt::write!(f, "unknown sensor type {:#x}", code)
            }
            DecodeError::ReservedValue(field) => defmt::write!(f, "reserved value in {}", field),
        }
    }
}
