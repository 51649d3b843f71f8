//! Bitfield table and fixed-point formats.
//!
//! Every channel assignment word is described as a list of [`Field`]s which
//! are packed by [`pack`] and read back with [`Field::extract`]. The numeric
//! formats used by the chip are described by [`Fixed`].

use crate::error::InvalidConfig;

/// A contiguous run of bits inside a 32-bit register word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Name reported when a value does not fit.
    pub name: &'static str,
    /// Position of the least significant bit.
    pub offset: u8,
    /// Number of bits.
    pub width: u8,
}

impl Field {
    /// Describe a field of `width` bits starting at bit `offset`.
    pub const fn new(name: &'static str, offset: u8, width: u8) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    /// Largest value the field can hold.
    pub const fn max(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    /// Mask of the field's bits within the word.
    pub const fn mask(&self) -> u32 {
        self.max() << self.offset
    }

    /// Read the field's value out of `word`.
    pub const fn extract(&self, word: u32) -> u32 {
        (word >> self.offset) & self.max()
    }
}

/// Pack `(field, value)` pairs into one word.
///
/// Values are OR'd in place, so fields must not overlap. A value wider than
/// its field is rejected rather than truncated.
pub fn pack(values: &[(Field, u32)]) -> Result<u32, InvalidConfig> {
    values.iter().try_fold(0u32, |word, &(field, value)| {
        if value > field.max() {
            return Err(InvalidConfig::FieldOverflow(field.name));
        }
        Ok(word | (value << field.offset))
    })
}

// ---------------------------------------------------------------------------
// Channel assignment layout
// ---------------------------------------------------------------------------

/// Sensor type code, common to every channel assignment.
pub const SENSOR_TYPE: Field = Field::new("sensor type", 27, 5);

/// Start of a custom table, shared by every custom sensor.
pub const CUSTOM_ADDRESS: Field = Field::new("custom address", 6, 6);
/// Number of table entries minus one, shared by every custom sensor.
pub const CUSTOM_LENGTH: Field = Field::new("custom length", 0, 6);

pub const TC_COLD_JUNCTION: Field = Field::new("cold junction channel", 22, 5);
pub const TC_SINGLE_ENDED: Field = Field::new("single ended", 21, 1);
pub const TC_OPEN_CIRCUIT: Field = Field::new("open circuit detect", 20, 1);
pub const TC_OPEN_CIRCUIT_CURRENT: Field = Field::new("open circuit current", 18, 2);

pub const RTD_SENSE_RESISTOR: Field = Field::new("sense resistor channel", 22, 5);
pub const RTD_WIRING: Field = Field::new("wiring", 20, 2);
pub const RTD_EXCITATION_MODE: Field = Field::new("excitation mode", 18, 2);
pub const RTD_EXCITATION_CURRENT: Field = Field::new("excitation current", 14, 4);
pub const RTD_CURVE: Field = Field::new("curve", 12, 2);

pub const THERMISTOR_SENSE_RESISTOR: Field = Field::new("sense resistor channel", 22, 5);
pub const THERMISTOR_SINGLE_ENDED: Field = Field::new("single ended", 21, 1);
pub const THERMISTOR_EXCITATION_MODE: Field = Field::new("excitation mode", 19, 2);
pub const THERMISTOR_EXCITATION_CURRENT: Field = Field::new("excitation current", 15, 4);

pub const DIODE_SINGLE_ENDED: Field = Field::new("single ended", 26, 1);
pub const DIODE_THREE_READINGS: Field = Field::new("three readings", 25, 1);
pub const DIODE_AVERAGE: Field = Field::new("average", 24, 1);
pub const DIODE_CURRENT: Field = Field::new("excitation current", 22, 2);
pub const DIODE_IDEALITY: Field = Field::new("ideality factor", 0, 22);

pub const SENSE_RESISTANCE: Field = Field::new("sense resistance", 0, 27);

// ---------------------------------------------------------------------------
// Fixed point formats
// ---------------------------------------------------------------------------

/// A fixed-point number format with `frac_bits` fractional bits stored in
/// `width` bits, two's complement when `signed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixed {
    pub frac_bits: u8,
    pub width: u8,
    pub signed: bool,
}

impl Fixed {
    pub const fn unsigned(frac_bits: u8, width: u8) -> Self {
        Self {
            frac_bits,
            width,
            signed: false,
        }
    }

    pub const fn signed(frac_bits: u8, width: u8) -> Self {
        Self {
            frac_bits,
            width,
            signed: true,
        }
    }

    /// Value of one LSB.
    pub fn resolution(&self) -> f64 {
        1.0 / self.scale()
    }

    fn scale(&self) -> f64 {
        (1u64 << self.frac_bits) as f64
    }

    fn mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    /// Smallest and largest raw values the format can hold.
    fn raw_range(&self) -> (i64, i64) {
        if self.signed {
            (-(1 << (self.width - 1)), (1 << (self.width - 1)) - 1)
        } else {
            (0, (1 << self.width) - 1)
        }
    }

    /// Smallest representable value.
    pub fn min(&self) -> f64 {
        self.raw_range().0 as f64 / self.scale()
    }

    /// Largest representable value.
    pub fn max(&self) -> f64 {
        self.raw_range().1 as f64 / self.scale()
    }

    /// Multiply by the scale and truncate toward zero. Negative values are
    /// kept as two's complement within `width` bits. `None` for NaN or a
    /// value the format cannot hold.
    pub fn quantize(&self, value: f64) -> Option<u32> {
        let raw = libm::trunc(value * self.scale());
        let (low, high) = self.raw_range();
        if !(raw >= low as f64 && raw <= high as f64) {
            return None;
        }
        Some(self.quantize_wrapping(value))
    }

    /// Like [`quantize`](Self::quantize), but out of range values wrap
    /// modulo `2^width`.
    pub fn quantize_wrapping(&self, value: f64) -> u32 {
        ((value * self.scale()) as i64 as u32) & self.mask()
    }

    /// Convert a raw register value back to a real number.
    pub fn to_f64(&self, raw: u32) -> f64 {
        let raw = raw & self.mask();
        let value = if self.signed {
            sign_extend(raw, self.width) as f64
        } else {
            raw as f64
        };
        value / self.scale()
    }
}

/// Sign-extend the low `width` bits of `raw`.
pub const fn sign_extend(raw: u32, width: u8) -> i32 {
    let shift = 32 - width as u32;
    ((raw << shift) as i32) >> shift
}

/// Diode ideality factor, 2.20.
pub const IDEALITY: Fixed = Fixed::unsigned(20, 22);
/// Sense resistor value in ohms, 17.10.
pub const SENSE_OHMS: Fixed = Fixed::unsigned(10, 27);
/// Custom thermocouple table voltage in millivolts, signed 9.14.
pub const TABLE_MILLIVOLTS: Fixed = Fixed::signed(14, 24);
/// Custom RTD table resistance in ohms, 13.11.
pub const TABLE_RTD_OHMS: Fixed = Fixed::unsigned(11, 24);
/// Custom thermistor table resistance in ohms, 20.4.
pub const TABLE_THERMISTOR_OHMS: Fixed = Fixed::unsigned(4, 24);
/// Custom table temperature in kelvin, 14.10.
pub const TABLE_KELVIN: Fixed = Fixed::unsigned(10, 24);
/// Conversion result temperature, signed 13.10.
pub const RESULT_TEMPERATURE: Fixed = Fixed::signed(10, 24);
/// Conversion result voltage for direct ADC readings, signed 2.21.
pub const RESULT_VOLTAGE: Fixed = Fixed::signed(21, 24);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_places_fields() {
        let word = pack(&[(SENSOR_TYPE, 0x1C), (DIODE_CURRENT, 0b11), (DIODE_SINGLE_ENDED, 1)]).unwrap();
        assert_eq!(word, 0xE000_0000 | 0x0400_0000 | 0x00C0_0000);
        assert_eq!(SENSOR_TYPE.extract(word), 0x1C);
        assert_eq!(DIODE_CURRENT.extract(word), 0b11);
        assert_eq!(DIODE_AVERAGE.extract(word), 0);
    }

    #[test]
    fn pack_rejects_wide_values() {
        assert_eq!(
            pack(&[(CUSTOM_ADDRESS, 64)]),
            Err(InvalidConfig::FieldOverflow("custom address"))
        );
        assert_eq!(pack(&[(CUSTOM_ADDRESS, 63)]), Ok(63 << 6));
    }

    #[test]
    fn layouts_do_not_overlap() {
        let families: [&[Field]; 4] = [
            &[SENSOR_TYPE, TC_COLD_JUNCTION, TC_SINGLE_ENDED, TC_OPEN_CIRCUIT, TC_OPEN_CIRCUIT_CURRENT, CUSTOM_ADDRESS, CUSTOM_LENGTH],
            &[SENSOR_TYPE, RTD_SENSE_RESISTOR, RTD_WIRING, RTD_EXCITATION_MODE, RTD_EXCITATION_CURRENT, RTD_CURVE, CUSTOM_ADDRESS, CUSTOM_LENGTH],
            &[SENSOR_TYPE, THERMISTOR_SENSE_RESISTOR, THERMISTOR_SINGLE_ENDED, THERMISTOR_EXCITATION_MODE, THERMISTOR_EXCITATION_CURRENT, CUSTOM_ADDRESS, CUSTOM_LENGTH],
            &[SENSOR_TYPE, DIODE_SINGLE_ENDED, DIODE_THREE_READINGS, DIODE_AVERAGE, DIODE_CURRENT, DIODE_IDEALITY],
        ];
        for fields in families {
            let mut seen = 0u32;
            for field in fields {
                assert_eq!(seen & field.mask(), 0, "{} overlaps", field.name);
                seen |= field.mask();
            }
        }
        assert_eq!(SENSOR_TYPE.mask() & SENSE_RESISTANCE.mask(), 0);
    }

    #[test]
    fn known_fixed_point_values() {
        assert_eq!(IDEALITY.quantize(1.03), Some(0x10_7AE1));
        assert_eq!(SENSE_OHMS.quantize(100.5), Some(0x1_9200));
        assert_eq!(TABLE_KELVIN.quantize(273.15), Some(279_705));
        assert_eq!(TABLE_MILLIVOLTS.quantize(-0.5), Some(0xFF_E000));
    }

    #[test]
    fn quantize_truncates() {
        // 2047.9 / 2048 LSB would round up, truncation keeps it down.
        assert_eq!(TABLE_RTD_OHMS.quantize(1.0 + 2047.9 / 2048.0), Some(2048 + 2047));
        assert_eq!(TABLE_MILLIVOLTS.quantize(-1.5 / 16384.0), Some(0xFF_FFFF));
    }

    #[test]
    fn quantize_refuses_unrepresentable_values() {
        assert_eq!(IDEALITY.quantize(4.0), None);
        assert_eq!(IDEALITY.quantize(IDEALITY.max()), Some(0x3F_FFFF));
        assert_eq!(SENSE_OHMS.quantize(-1.0), None);
        assert_eq!(SENSE_OHMS.quantize(f64::NAN), None);
        assert_eq!(SENSE_OHMS.quantize(f64::INFINITY), None);
        assert_eq!(TABLE_MILLIVOLTS.quantize(-512.0), Some(0x80_0000));
        assert_eq!(TABLE_MILLIVOLTS.quantize(-600.0), None);
        assert_eq!(TABLE_MILLIVOLTS.quantize_wrapping(-600.0), 0x6A_0000);
        assert_eq!(TABLE_MILLIVOLTS.min(), -512.0);
    }

    #[test]
    fn fixed_point_recovers_within_one_lsb() {
        let cases = [
            (IDEALITY, 1.003),
            (SENSE_OHMS, 2000.123),
            (TABLE_MILLIVOLTS, -9.835),
            (TABLE_RTD_OHMS, 138.5055),
            (TABLE_THERMISTOR_OHMS, 32_650.7),
            (TABLE_KELVIN, 1_523.42),
        ];
        for (format, value) in cases {
            let back = format.to_f64(format.quantize(value).unwrap());
            assert!((back - value).abs() < format.resolution(), "{value} -> {back}");
        }
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0xFF_FF00, 24), -256);
        assert_eq!(sign_extend(0x7F_FFFF, 24), 0x7F_FFFF);
        assert_eq!(sign_extend(0x80_0000, 24), -0x80_0000);
        assert_eq!(RESULT_TEMPERATURE.to_f64(0xFF_FF00), -0.25);
        assert_eq!(RESULT_VOLTAGE.to_f64(0x10_0000), 0.5);
    }
}
