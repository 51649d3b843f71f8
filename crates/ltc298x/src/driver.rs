use embedded_hal::spi::SpiDevice;

use crate::config::{ChannelConfig, DiodeConfig, RtdConfig, ThermistorConfig, ThermocoupleConfig};
use crate::control::{ChannelMask, GlobalConfig};
use crate::error::{Error, InvalidConfig};
use crate::registers::{self, CHANNEL_COUNT, CMD_BEGIN, CMD_SLEEP, GLOBAL_FAHRENHEIT, GLOBAL_REJECTION_MASK, STATUS_DONE};
use crate::sensor::{Rejection, RtdCurve, RtdType, ThermistorType, ThermocoupleType};
use crate::status::{self, Status};
use crate::table::{self, CurvePoint, TableKind, MAX_EXTENT, STEINHART_HART_COEFFICIENTS};
use crate::{read_register, write_register};

/// LTC2983/LTC2984 driver
///
/// Every request is checked before anything goes on the bus; a rejected call
/// leaves both the chip and the cached [`Status`] untouched.
pub struct Ltc298x<SPI> {
    spi: SPI,
    status: Status,
}

impl<SPI: SpiDevice> Ltc298x<SPI> {
    /// Creates a new driver from an SPI peripheral.
    /// Please ensure the SPI bus is in SPI mode 0, aka (0, 0), at 2MHz or less.
    pub fn new(spi: SPI) -> Self {
        spi.into()
    }

    /// Give back the SPI peripheral.
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Status byte of the most recent [`read_temperature`](Self::read_temperature)
    /// or [`read_adc`](Self::read_adc). No bus access.
    pub fn status(&self) -> Status {
        self.status
    }

    /// `true` once the last conversion has finished.
    pub fn is_done(&mut self) -> Result<bool, Error<SPI::Error>> {
        Ok(self.read8(registers::COMMAND)? & STATUS_DONE != 0)
    }

    /// Read the unit and rejection settings.
    pub fn global_config(&mut self) -> Result<GlobalConfig, Error<SPI::Error>> {
        let bits = self.read8(registers::GLOBAL_CONFIG)?;
        Ok(GlobalConfig::from_bits(bits)?)
    }

    /// Write the unit and rejection settings, keeping the register's other bits.
    pub fn set_global_config(&mut self, config: GlobalConfig) -> Result<(), Error<SPI::Error>> {
        let current = self.read8(registers::GLOBAL_CONFIG)?;
        self.write8(registers::GLOBAL_CONFIG, config.apply(current))
    }

    /// Report temperatures in degrees Celsius.
    pub fn report_celsius(&mut self) -> Result<(), Error<SPI::Error>> {
        self.update_global(GLOBAL_FAHRENHEIT, 0)
    }

    /// Report temperatures in degrees Fahrenheit.
    pub fn report_fahrenheit(&mut self) -> Result<(), Error<SPI::Error>> {
        self.update_global(GLOBAL_FAHRENHEIT, GLOBAL_FAHRENHEIT)
    }

    /// Reject both 50Hz and 60Hz mains noise.
    pub fn reject_50_60hz(&mut self) -> Result<(), Error<SPI::Error>> {
        self.set_rejection(Rejection::Hz50And60)
    }

    /// Reject 60Hz mains noise.
    pub fn reject_60hz(&mut self) -> Result<(), Error<SPI::Error>> {
        self.set_rejection(Rejection::Hz60)
    }

    /// Reject 50Hz mains noise.
    pub fn reject_50hz(&mut self) -> Result<(), Error<SPI::Error>> {
        self.set_rejection(Rejection::Hz50)
    }

    fn set_rejection(&mut self, rejection: Rejection) -> Result<(), Error<SPI::Error>> {
        self.update_global(GLOBAL_REJECTION_MASK, rejection.code())
    }

    fn update_global(&mut self, mask: u8, bits: u8) -> Result<(), Error<SPI::Error>> {
        let current = self.read8(registers::GLOBAL_CONFIG)?;
        self.write8(registers::GLOBAL_CONFIG, (current & !mask) | bits)
    }

    /// Extra settling time between conversions in a multiple conversion, in
    /// units of 10µs.
    pub fn set_mux_delay(&mut self, delay: u8) -> Result<(), Error<SPI::Error>> {
        self.write8(registers::MUX_DELAY, delay)
    }

    /// Select the channels converted by
    /// [`begin_multiple_conversion`](Self::begin_multiple_conversion) from a
    /// raw bitmap; bit `n - 1` selects channel `n`.
    pub fn select_conversion_channels(&mut self, mask: u32) -> Result<(), Error<SPI::Error>> {
        let mask = ChannelMask::from_bits(mask)?;
        self.select_channels(mask)
    }

    /// Select the channels converted by
    /// [`begin_multiple_conversion`](Self::begin_multiple_conversion).
    pub fn select_channels(&mut self, mask: ChannelMask) -> Result<(), Error<SPI::Error>> {
        self.write32(registers::MULTIPLE_CONVERSION_MASK, mask.bits())
    }

    /// Start a conversion on channel `ch`.
    pub fn begin_conversion(&mut self, ch: u8) -> Result<(), Error<SPI::Error>> {
        check_channel(ch)?;
        self.write8(registers::COMMAND, CMD_BEGIN | ch)
    }

    /// Start a conversion of every selected channel.
    pub fn begin_multiple_conversion(&mut self) -> Result<(), Error<SPI::Error>> {
        self.write8(registers::COMMAND, CMD_BEGIN)
    }

    /// Put the chip to sleep; the next access wakes it.
    pub fn sleep(&mut self) -> Result<(), Error<SPI::Error>> {
        self.write8(registers::COMMAND, CMD_SLEEP)
    }

    /// Assign `config` to channel `ch`, replacing whatever was there.
    ///
    /// Custom tables must already be in RAM; the `setup_custom_*` calls write
    /// the table and the assignment together.
    pub fn configure(&mut self, ch: u8, config: &ChannelConfig) -> Result<(), Error<SPI::Error>> {
        let word = prepare(ch, config)?;
        self.write_channel(ch, word)
    }

    /// Read back and parse the assignment of channel `ch`.
    pub fn channel_config(&mut self, ch: u8) -> Result<ChannelConfig, Error<SPI::Error>> {
        check_channel(ch)?;
        let word = self.read32(registers::channel_config(ch))?;
        Ok(ChannelConfig::decode(word)?)
    }

    /// Stop converting channel `ch`.
    pub fn disable_channel(&mut self, ch: u8) -> Result<(), Error<SPI::Error>> {
        self.configure(ch, &ChannelConfig::Unassigned)
    }

    /// Measure a diode on channel `ch`; 1 to 20 single-ended, 2 to 20 differential.
    pub fn setup_diode(&mut self, ch: u8, config: &DiodeConfig) -> Result<(), Error<SPI::Error>> {
        self.configure(ch, &ChannelConfig::Diode(*config))
    }

    /// Declare a sense resistor of `ohms` (below 131072) between `ch - 1` and `ch`; 2 to 20.
    pub fn setup_sense_resistor(&mut self, ch: u8, ohms: f64) -> Result<(), Error<SPI::Error>> {
        self.configure(ch, &ChannelConfig::SenseResistor { ohms })
    }

    /// Measure a thermocouple on channel `ch`; 1 to 20 single-ended, 2 to 20 differential.
    pub fn setup_thermocouple(
        &mut self,
        ch: u8,
        kind: ThermocoupleType,
        config: &ThermocoupleConfig,
    ) -> Result<(), Error<SPI::Error>> {
        self.configure(ch, &ChannelConfig::Thermocouple { kind, config: *config })
    }

    /// Write a millivolt to kelvin table at `offset` and assign a custom
    /// thermocouple using it.
    ///
    /// Entries may go down to -1000mV, but signed 9.14 only holds -512mV;
    /// lower entries wrap around and the chip sees them out of order.
    pub fn setup_custom_thermocouple(
        &mut self,
        ch: u8,
        config: &ThermocoupleConfig,
        offset: u16,
        points: &[CurvePoint],
    ) -> Result<(), Error<SPI::Error>> {
        let table = table::validate(TableKind::Thermocouple, offset, points)?;
        let channel = ChannelConfig::CustomThermocouple { config: *config, table };
        self.configure_with_table(ch, &channel, TableKind::Thermocouple, offset, points)
    }

    /// Measure an RTD on channel `ch`; 2 to 20 for two wires, 3 to 20 for three,
    /// 3 to 19 for four.
    pub fn setup_rtd(
        &mut self,
        ch: u8,
        kind: RtdType,
        config: &RtdConfig,
        curve: RtdCurve,
    ) -> Result<(), Error<SPI::Error>> {
        self.configure(
            ch,
            &ChannelConfig::Rtd {
                kind,
                config: *config,
                curve,
            },
        )
    }

    /// Write an ohm to kelvin table at `offset` and assign a custom RTD using
    /// it.
    pub fn setup_custom_rtd(
        &mut self,
        ch: u8,
        config: &RtdConfig,
        offset: u16,
        points: &[CurvePoint],
    ) -> Result<(), Error<SPI::Error>> {
        let table = table::validate(TableKind::Rtd, offset, points)?;
        let channel = ChannelConfig::CustomRtd { config: *config, table };
        self.configure_with_table(ch, &channel, TableKind::Rtd, offset, points)
    }

    /// Measure a thermistor on channel `ch`; 1 to 20 single-ended, 2 to 20 differential.
    pub fn setup_thermistor(
        &mut self,
        ch: u8,
        kind: ThermistorType,
        config: &ThermistorConfig,
    ) -> Result<(), Error<SPI::Error>> {
        self.configure(ch, &ChannelConfig::Thermistor { kind, config: *config })
    }

    /// Write Steinhart-Hart coefficients A to F at `offset` and assign a
    /// thermistor using them.
    pub fn setup_steinhart_hart_thermistor(
        &mut self,
        ch: u8,
        config: &ThermistorConfig,
        coefficients: &[f32; STEINHART_HART_COEFFICIENTS],
        offset: u16,
    ) -> Result<(), Error<SPI::Error>> {
        table::validate_steinhart_hart(offset)?;
        let word = prepare(ch, &ChannelConfig::SteinhartHartThermistor { config: *config, offset })?;

        for (index, coefficient) in coefficients.iter().enumerate() {
            self.write32(table::coefficient_address(offset, index), coefficient.to_bits())?;
        }

        self.write_channel(ch, word)
    }

    /// Write an ohm to kelvin table at `offset` and assign a custom
    /// thermistor using it.
    pub fn setup_custom_thermistor(
        &mut self,
        ch: u8,
        config: &ThermistorConfig,
        offset: u16,
        points: &[CurvePoint],
    ) -> Result<(), Error<SPI::Error>> {
        let table = table::validate(TableKind::Thermistor, offset, points)?;
        let channel = ChannelConfig::CustomThermistor { config: *config, table };
        self.configure_with_table(ch, &channel, TableKind::Thermistor, offset, points)
    }

    /// Measure the raw voltage on channel `ch`.
    pub fn setup_adc(&mut self, ch: u8, single_ended: bool) -> Result<(), Error<SPI::Error>> {
        self.configure(ch, &ChannelConfig::DirectAdc { single_ended })
    }

    /// Read `points.len()` entries of a custom table starting at `offset`.
    pub fn read_custom_table(
        &mut self,
        kind: TableKind,
        offset: u16,
        points: &mut [CurvePoint],
    ) -> Result<(), Error<SPI::Error>> {
        if offset as usize + points.len() > MAX_EXTENT {
            return Err(InvalidConfig::TableLength.into());
        }

        for (index, point) in points.iter_mut().enumerate() {
            let address = table::entry_address(offset, index);
            let x = self.read24(address)?;
            let kelvin = self.read24(address + 3)?;
            *point = table::decode_point(kind, x, kelvin);
        }

        Ok(())
    }

    /// Read the temperature measured on channel `ch`, in the unit chosen
    /// with [`report_celsius`](Self::report_celsius) or
    /// [`report_fahrenheit`](Self::report_fahrenheit).
    ///
    /// Faults reported by the chip do not make this fail; check
    /// [`status`](Self::status) afterwards.
    pub fn read_temperature(&mut self, ch: u8) -> Result<f64, Error<SPI::Error>> {
        let payload = self.read_result(ch)?;
        Ok(status::temperature(payload))
    }

    /// Read the voltage measured on a direct ADC channel `ch`.
    pub fn read_adc(&mut self, ch: u8) -> Result<f64, Error<SPI::Error>> {
        let payload = self.read_result(ch)?;
        Ok(status::voltage(payload))
    }

    fn read_result(&mut self, ch: u8) -> Result<u32, Error<SPI::Error>> {
        check_channel(ch)?;
        let (status, payload) = status::split_result(self.read32(registers::result(ch))?);
        if status.has_fault() {
            warn!("channel {} reported {}", ch, status);
        }
        self.status = status;
        Ok(payload)
    }

    fn configure_with_table(
        &mut self,
        ch: u8,
        config: &ChannelConfig,
        kind: TableKind,
        offset: u16,
        points: &[CurvePoint],
    ) -> Result<(), Error<SPI::Error>> {
        let word = prepare(ch, config)?;

        for (index, point) in points.iter().enumerate() {
            let (x, kelvin) = table::encode_point(kind, point);
            let address = table::entry_address(offset, index);
            self.write24(address, x)?;
            self.write24(address + 3, kelvin)?;
        }

        self.write_channel(ch, word)
    }

    fn write_channel(&mut self, ch: u8, word: u32) -> Result<(), Error<SPI::Error>> {
        debug!("channel {} assigned {=u32:#x}", ch, word);
        self.write32(registers::channel_config(ch), word)
    }

    fn write8(&mut self, address: u16, value: u8) -> Result<(), Error<SPI::Error>> {
        trace!("write {=u16:#x} <- {=u8:#x}", address, value);
        write_register(&mut self.spi, address, &[value]).map_err(Error::Spi)
    }

    fn write24(&mut self, address: u16, value: u32) -> Result<(), Error<SPI::Error>> {
        trace!("write {=u16:#x} <- {=u32:#x}", address, value);
        let [_, high, mid, low] = value.to_be_bytes();
        write_register(&mut self.spi, address, &[high, mid, low]).map_err(Error::Spi)
    }

    fn write32(&mut self, address: u16, value: u32) -> Result<(), Error<SPI::Error>> {
        trace!("write {=u16:#x} <- {=u32:#x}", address, value);
        write_register(&mut self.spi, address, &value.to_be_bytes()).map_err(Error::Spi)
    }

    fn read8(&mut self, address: u16) -> Result<u8, Error<SPI::Error>> {
        let mut buffer = [0; 1];
        read_register(&mut self.spi, address, &mut buffer).map_err(Error::Spi)?;
        trace!("read {=u16:#x} -> {=u8:#x}", address, buffer[0]);
        Ok(buffer[0])
    }

    fn read24(&mut self, address: u16) -> Result<u32, Error<SPI::Error>> {
        let mut buffer = [0; 3];
        read_register(&mut self.spi, address, &mut buffer).map_err(Error::Spi)?;
        let value = u32::from_be_bytes([0, buffer[0], buffer[1], buffer[2]]);
        trace!("read {=u16:#x} -> {=u32:#x}", address, value);
        Ok(value)
    }

    fn read32(&mut self, address: u16) -> Result<u32, Error<SPI::Error>> {
        let mut buffer = [0; 4];
        read_register(&mut self.spi, address, &mut buffer).map_err(Error::Spi)?;
        let value = u32::from_be_bytes(buffer);
        trace!("read {=u16:#x} -> {=u32:#x}", address, value);
        Ok(value)
    }
}

impl<SPI: SpiDevice> From<SPI> for Ltc298x<SPI> {
    fn from(spi: SPI) -> Self {
        Self {
            spi,
            status: Status::empty(),
        }
    }
}

fn check_channel(ch: u8) -> Result<(), InvalidConfig> {
    if ch == 0 || ch > CHANNEL_COUNT {
        return Err(InvalidConfig::ChannelOutOfRange);
    }
    Ok(())
}

/// Validate `config` for channel `ch` and build its assignment word.
fn prepare(ch: u8, config: &ChannelConfig) -> Result<u32, InvalidConfig> {
    config.validate(ch)?;
    config.encode()
}
