//! Custom sensor tables stored in the chip's RAM.
//!
//! A custom thermocouple, RTD or thermistor is described by up to 64
//! `(x, kelvin)` pairs. Each pair is written as two 24-bit fixed-point words,
//! six bytes per entry. Steinhart-Hart thermistors use six IEEE-754 single
//! precision coefficients instead.

use crate::error::InvalidConfig;
use crate::field::{Fixed, TABLE_KELVIN, TABLE_MILLIVOLTS, TABLE_RTD_OHMS, TABLE_THERMISTOR_OHMS};
use crate::registers::{RAM_START, RAM_WIDTH};

/// Bytes occupied by one table entry.
pub const ENTRY_SIZE: u16 = 6;

/// Fewest entries a custom table may have.
pub const MIN_ENTRIES: usize = 3;

/// Upper bound on `offset + entries`.
pub const MAX_EXTENT: usize = 63;

/// Number of Steinhart-Hart coefficients (A to F).
pub const STEINHART_HART_COEFFICIENTS: usize = 6;

/// Largest Steinhart-Hart table offset is below this.
pub const STEINHART_HART_OFFSET_LIMIT: u16 = RAM_WIDTH - 20;

/// Exclusive upper bound for table temperatures.
const KELVIN_LIMIT: f64 = 8192.0;

/// One entry of a custom table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Millivolts for thermocouples, ohms for RTDs and thermistors.
    pub x: f64,
    /// Temperature in kelvin.
    pub kelvin: f64,
}

impl CurvePoint {
    pub const fn new(x: f64, kelvin: f64) -> Self {
        Self { x, kelvin }
    }
}

/// Location of a custom table, as stored in the channel assignment word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TablePointer {
    /// Start offset from the beginning of table RAM.
    pub offset: u16,
    /// Number of entries.
    pub len: u8,
}

/// Which sensor a table linearizes, which decides the format and range of
/// its `x` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Millivolts, signed 9.14.
    Thermocouple,
    /// Ohms, 13.11.
    Rtd,
    /// Ohms, 20.4.
    Thermistor,
}

impl TableKind {
    /// `x` must be strictly greater than this for the first entry.
    fn x_floor(self) -> f64 {
        match self {
            TableKind::Thermocouple => -1000.0,
            TableKind::Rtd | TableKind::Thermistor => 0.0,
        }
    }

    /// `x` must be strictly less than this.
    fn x_limit(self) -> f64 {
        match self {
            TableKind::Thermocouple => 256.0,
            TableKind::Rtd => 4096.0,
            TableKind::Thermistor => 524_288.0,
        }
    }

    fn x_format(self) -> Fixed {
        match self {
            TableKind::Thermocouple => TABLE_MILLIVOLTS,
            TableKind::Rtd => TABLE_RTD_OHMS,
            TableKind::Thermistor => TABLE_THERMISTOR_OHMS,
        }
    }
}

/// Check a custom table and return where it will live.
///
/// Both columns must be strictly increasing and inside their ranges, and the
/// table must have at least [`MIN_ENTRIES`] entries with
/// `offset + entries <= MAX_EXTENT`.
pub fn validate(kind: TableKind, offset: u16, points: &[CurvePoint]) -> Result<TablePointer, InvalidConfig> {
    if points.len() < MIN_ENTRIES || offset as usize + points.len() > MAX_EXTENT {
        return Err(InvalidConfig::TableLength);
    }

    let mut previous = CurvePoint::new(kind.x_floor(), 0.0);
    for point in points {
        if !(point.x > previous.x) || !(point.kelvin > previous.kelvin) {
            return Err(InvalidConfig::TableNotMonotonic);
        }
        if !(point.x < kind.x_limit()) || !(point.kelvin < KELVIN_LIMIT) {
            return Err(InvalidConfig::TableOutOfRange);
        }
        if point.x < kind.x_format().min() {
            warn!("table entry {} wraps in 24 bits", point.x);
        }
        previous = *point;
    }

    Ok(TablePointer {
        offset,
        len: points.len() as u8,
    })
}

/// Encode one entry as its two 24-bit words.
///
/// Thermocouple entries below -512mV are accepted by [`validate`] but wrap
/// around in signed 9.14, so they land in RAM as large positive voltages.
pub fn encode_point(kind: TableKind, point: &CurvePoint) -> (u32, u32) {
    (
        kind.x_format().quantize_wrapping(point.x),
        TABLE_KELVIN.quantize_wrapping(point.kelvin),
    )
}

/// Decode one entry from its two 24-bit words.
pub fn decode_point(kind: TableKind, x: u32, kelvin: u32) -> CurvePoint {
    CurvePoint::new(kind.x_format().to_f64(x), TABLE_KELVIN.to_f64(kelvin))
}

/// RAM address of the `x` word of entry `index`; the kelvin word follows
/// three bytes later.
pub const fn entry_address(offset: u16, index: usize) -> u16 {
    RAM_START + offset + index as u16 * ENTRY_SIZE
}

/// Check a Steinhart-Hart coefficient table location.
pub fn validate_steinhart_hart(offset: u16) -> Result<TablePointer, InvalidConfig> {
    if offset >= STEINHART_HART_OFFSET_LIMIT {
        return Err(InvalidConfig::TableLength);
    }
    Ok(TablePointer {
        offset,
        len: STEINHART_HART_COEFFICIENTS as u8,
    })
}

/// RAM address of Steinhart-Hart coefficient `index`.
pub const fn coefficient_address(offset: u16, index: usize) -> u16 {
    RAM_START + offset + index as u16 * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPE_K_EXCERPT: [CurvePoint; 4] = [
        CurvePoint::new(-6.458, 3.15),
        CurvePoint::new(0.0, 273.15),
        CurvePoint::new(4.096, 373.15),
        CurvePoint::new(41.276, 1273.15),
    ];

    #[test]
    fn accepts_increasing_table() {
        assert_eq!(
            validate(TableKind::Thermocouple, 0, &TYPE_K_EXCERPT),
            Ok(TablePointer { offset: 0, len: 4 })
        );
    }

    #[test]
    fn rejects_short_table() {
        assert_eq!(
            validate(TableKind::Rtd, 0, &[CurvePoint::new(1.0, 1.0), CurvePoint::new(2.0, 2.0)]),
            Err(InvalidConfig::TableLength)
        );
    }

    #[test]
    fn length_boundary() {
        let mut points = [CurvePoint::new(0.0, 0.0); 64];
        for (i, point) in points.iter_mut().enumerate() {
            *point = CurvePoint::new(1.0 + i as f64, 10.0 + i as f64);
        }
        for offset in [0u16, 10, 60] {
            let fits = MAX_EXTENT - offset as usize;
            assert!(validate(TableKind::Rtd, offset, &points[..fits]).is_ok());
            assert_eq!(
                validate(TableKind::Rtd, offset, &points[..fits + 1]),
                Err(InvalidConfig::TableLength)
            );
        }
    }

    #[test]
    fn rejects_non_monotonic_columns() {
        let mut points = TYPE_K_EXCERPT;
        points[2].x = points[1].x;
        assert_eq!(validate(TableKind::Thermocouple, 0, &points), Err(InvalidConfig::TableNotMonotonic));

        let mut points = TYPE_K_EXCERPT;
        points[3].kelvin = 300.0;
        assert_eq!(validate(TableKind::Thermocouple, 0, &points), Err(InvalidConfig::TableNotMonotonic));
    }

    #[test]
    fn rejects_out_of_range_entries() {
        let mut points = TYPE_K_EXCERPT;
        points[3].x = 256.0;
        assert_eq!(validate(TableKind::Thermocouple, 0, &points), Err(InvalidConfig::TableOutOfRange));

        let mut points = TYPE_K_EXCERPT;
        points[3].kelvin = 8192.0;
        assert_eq!(validate(TableKind::Thermocouple, 0, &points), Err(InvalidConfig::TableOutOfRange));

        let ohms = [CurvePoint::new(100.0, 1.0), CurvePoint::new(200.0, 2.0), CurvePoint::new(4096.0, 3.0)];
        assert_eq!(validate(TableKind::Rtd, 0, &ohms), Err(InvalidConfig::TableOutOfRange));
        assert!(validate(TableKind::Thermistor, 0, &ohms).is_ok());
    }

    #[test]
    fn rejects_first_entry_at_floor() {
        let points = [CurvePoint::new(0.0, 1.0), CurvePoint::new(1.0, 2.0), CurvePoint::new(2.0, 3.0)];
        assert_eq!(validate(TableKind::Rtd, 0, &points), Err(InvalidConfig::TableNotMonotonic));
        assert!(validate(TableKind::Thermocouple, 0, &points).is_ok());
    }

    #[test]
    fn rejects_nan() {
        let points = [CurvePoint::new(1.0, 1.0), CurvePoint::new(f64::NAN, 2.0), CurvePoint::new(2.0, 3.0)];
        assert!(validate(TableKind::Rtd, 0, &points).is_err());
    }

    #[test]
    fn encodes_points() {
        assert_eq!(
            encode_point(TableKind::Thermocouple, &CurvePoint::new(-0.5, 273.15)),
            (0xFF_E000, 279_705)
        );
        assert_eq!(encode_point(TableKind::Rtd, &CurvePoint::new(100.0, 273.15)).0, 204_800);
        assert_eq!(encode_point(TableKind::Thermistor, &CurvePoint::new(10_000.0, 298.15)).0, 160_000);

        let back = decode_point(TableKind::Thermocouple, 0xFF_E000, 279_705);
        assert_eq!(back.x, -0.5);
        assert!((back.kelvin - 273.15).abs() < 1.0 / 1024.0);
    }

    #[test]
    fn millivolts_below_format_wrap() {
        let points = [CurvePoint::new(-600.0, 10.0), CurvePoint::new(-10.0, 20.0), CurvePoint::new(0.0, 30.0)];
        assert!(validate(TableKind::Thermocouple, 0, &points).is_ok());

        let raw: Vec<u32> = points
            .iter()
            .map(|point| encode_point(TableKind::Thermocouple, point).0)
            .collect();
        assert_eq!(raw, vec![0x6A_0000, 0xFD_8000, 0]);
        assert_eq!(decode_point(TableKind::Thermocouple, raw[0], 0).x, 424.0);
    }

    #[test]
    fn addresses() {
        assert_eq!(entry_address(0, 0), 0x250);
        assert_eq!(entry_address(4, 2), 0x250 + 4 + 12);
        assert_eq!(coefficient_address(0, 5), 0x250 + 20);
    }

    #[test]
    fn steinhart_hart_offset_limit() {
        assert!(validate_steinhart_hart(357).is_ok());
        assert_eq!(validate_steinhart_hart(358), Err(InvalidConfig::TableLength));
    }
}
