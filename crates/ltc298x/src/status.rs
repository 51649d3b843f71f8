//! Conversion result words.
//!
//! Each result register holds a status byte in bits 31:24 and a signed
//! 24-bit measurement below it.

use bitflags::bitflags;

use crate::field::{RESULT_TEMPERATURE, RESULT_VOLTAGE};

bitflags! {
    /// Fault and validity flags reported with every conversion result.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        /// Sensor is broken or not connected; the result is invalid.
        const SENSOR_HARD_FAULT = 0x80;
        /// ADC reading out of range; the result is invalid.
        const ADC_HARD_FAULT = 0x40;
        /// Cold junction sensor has a hard fault; the result is invalid.
        const CJ_HARD_FAULT = 0x20;
        /// Cold junction temperature is beyond its normal range.
        const CJ_SOFT_FAULT = 0x10;
        /// Temperature above the sensor's range.
        const OVER_RANGE = 0x08;
        /// Temperature below the sensor's range.
        const UNDER_RANGE = 0x04;
        /// Input voltage beyond ±1.125·VREF/2.
        const OUT_OF_RANGE = 0x02;
        /// The result is valid.
        const VALID = 0x01;
    }
}

impl Status {
    const HARD_FAULTS: Status = Status::SENSOR_HARD_FAULT
        .union(Status::ADC_HARD_FAULT)
        .union(Status::CJ_HARD_FAULT);

    /// Any fault that invalidates the accompanying result.
    pub fn has_hard_fault(&self) -> bool {
        self.intersects(Self::HARD_FAULTS)
    }

    /// Any fault flag, hard or soft.
    pub fn has_fault(&self) -> bool {
        self.intersects(Self::all().difference(Self::VALID))
    }

    /// Every bit set, reported for a channel whose assignment the chip
    /// could not accept.
    pub fn is_config_error(&self) -> bool {
        self.bits() == 0xFF
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status({=u8:#x})", self.bits())
    }
}

/// Split a raw result word into its status byte and signed 24-bit payload.
pub fn split_result(raw: u32) -> (Status, u32) {
    (Status::from_bits_retain((raw >> 24) as u8), raw & 0x00FF_FFFF)
}

/// Temperature carried by a result word, in the configured unit.
pub fn temperature(raw: u32) -> f64 {
    RESULT_TEMPERATURE.to_f64(raw)
}

/// Voltage carried by a direct ADC result word.
pub fn voltage(raw: u32) -> f64 {
    RESULT_VOLTAGE.to_f64(raw)
}
