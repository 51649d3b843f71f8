//! Provides a driver for the Analog Devices LTC2983/LTC2984 multi-sensor
//! temperature measurement system via the `embedded-hal` ecosystem.
//!
//! The chip measures up to 20 channels of thermocouples, RTDs, thermistors,
//! diodes and raw voltages. Each channel is described by a 32-bit assignment
//! word; results come back as 24-bit fixed-point values with a status byte.
//!
//! - [`Ltc298x`] validates requests and talks to the chip.
//! - [`ChannelConfig`] builds and parses channel assignment words without
//!   touching the bus.
//! - [`table`] checks and encodes custom sensor tables.
//!
//! ```no_run
//! use ltc298x::{Ltc298x, RtdConfig, RtdCurve, RtdType, ThermocoupleConfig, ThermocoupleType};
//!
//! fn example<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> Result<(), ltc298x::Error<SPI::Error>> {
//!     let mut ltc = Ltc298x::new(spi);
//!     ltc.setup_sense_resistor(2, 2000.0)?;
//!     ltc.setup_rtd(4, RtdType::Pt100, &RtdConfig::new(2), RtdCurve::European)?;
//!     ltc.setup_thermocouple(
//!         6,
//!         ThermocoupleType::K,
//!         &ThermocoupleConfig { cold_junction: 4, ..Default::default() },
//!     )?;
//!     ltc.begin_conversion(6)?;
//!     while !ltc.is_done()? {}
//!     let celsius = ltc.read_temperature(6)?;
//!     let status = ltc.status();
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - **`defmt`**: log register traffic and faults through `defmt`, and
//!   implement [`defmt::Format`] for the public types.

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

use embedded_hal::spi::{Operation, SpiDevice};

#[macro_use]
mod fmt;

pub mod config;
pub mod control;
mod driver;
mod error;
pub mod field;
pub mod registers;
pub mod sensor;
pub mod status;
pub mod table;

#[cfg(test)]
mod mock;

pub use config::{ChannelConfig, DiodeConfig, RtdConfig, ThermistorConfig, ThermocoupleConfig, NO_COLD_JUNCTION};
pub use control::{ChannelMask, GlobalConfig};
pub use driver::Ltc298x;
pub use error::{DecodeError, Error, InvalidConfig};
pub use sensor::{
    DiodeCurrent, ExcitationMode, OpenCircuitCurrent, Rejection, RtdCurrent, RtdCurve, RtdType, TemperatureUnit,
    ThermistorCurrent, ThermistorType, ThermocoupleType, Wiring,
};
pub use status::Status;
pub use table::{CurvePoint, TableKind, TablePointer};

/// Internal method for writing `data` to the register at `address`. The whole
/// access is one transaction, so chip select stays asserted throughout.
pub(crate) fn write_register<SPI: SpiDevice>(spi: &mut SPI, address: u16, data: &[u8]) -> Result<(), SPI::Error> {
    let [high, low] = address.to_be_bytes();

    spi.transaction(&mut [
        Operation::Write(&[registers::OP_WRITE, high, low]),
        Operation::Write(data),
    ])
}

/// Internal method for reading `buffer.len()` bytes starting at `address`.
pub(crate) fn read_register<SPI: SpiDevice>(spi: &mut SPI, address: u16, buffer: &mut [u8]) -> Result<(), SPI::Error> {
    let [high, low] = address.to_be_bytes();

    spi.transaction(&mut [
        Operation::Write(&[registers::OP_READ, high, low]),
        Operation::Read(buffer),
    ])
}
