//! Read an LTC2983 wired to a Raspberry Pi and print every channel once a
//! second.

#[cfg(feature = "raspberry_pi")]
mod imports {
    pub use std::cell::RefCell;
    pub use std::fmt::Debug;
    pub use std::time::Duration;
    pub use anyhow::anyhow;
    pub use embedded_hal_bus::spi::RefCellDevice;
    pub use ltc298x::{
        ChannelMask, Ltc298x, RtdConfig, RtdCurve, RtdType, ThermocoupleConfig, ThermocoupleType,
    };
    pub use rppal::gpio::Gpio;
    pub use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
}

#[cfg(feature = "raspberry_pi")]
use imports::*;

/// The LTC2983 accepts up to 2MHz.
#[cfg(feature = "raspberry_pi")]
const SPI_CLOCK_HZ: u32 = 1_000_000;

#[cfg(feature = "raspberry_pi")]
const CHIP_SELECT_GPIO: u8 = 24;

#[cfg(feature = "raspberry_pi")]
const SENSE_RESISTOR_CHANNEL: u8 = 2;

#[cfg(feature = "raspberry_pi")]
const SENSE_RESISTOR_OHMS: f64 = 2000.0;

#[cfg(feature = "raspberry_pi")]
const RTD_CHANNEL: u8 = 4;

#[cfg(feature = "raspberry_pi")]
const THERMOCOUPLE_CHANNEL: u8 = 6;

#[cfg(feature = "raspberry_pi")]
fn fault<E: Debug>(error: ltc298x::Error<E>) -> anyhow::Error {
    anyhow!("{}", error)
}

#[cfg(feature = "raspberry_pi")]
fn main() -> Result<(), anyhow::Error> {
    let gpio = Gpio::new()?;

    let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)?;

    let spi = RefCell::new(spi);

    let ltc = RefCellDevice::new_no_delay(&spi, gpio.get(CHIP_SELECT_GPIO)?.into_output());

    let mut ltc = Ltc298x::new(ltc);

    ltc.report_celsius().map_err(fault)?;
    ltc.reject_50_60hz().map_err(fault)?;

    ltc.setup_sense_resistor(SENSE_RESISTOR_CHANNEL, SENSE_RESISTOR_OHMS)
        .map_err(fault)?;
    ltc.setup_rtd(
        RTD_CHANNEL,
        RtdType::Pt100,
        &RtdConfig::new(SENSE_RESISTOR_CHANNEL),
        RtdCurve::European,
    )
    .map_err(fault)?;
    ltc.setup_thermocouple(
        THERMOCOUPLE_CHANNEL,
        ThermocoupleType::K,
        &ThermocoupleConfig {
            cold_junction: RTD_CHANNEL,
            ..Default::default()
        },
    )
    .map_err(fault)?;

    let channels = ChannelMask::from_channels(&[RTD_CHANNEL, THERMOCOUPLE_CHANNEL])
        .map_err(|error| anyhow!("{}", error))?;

    ltc.select_channels(channels).map_err(fault)?;

    loop {
        ltc.begin_multiple_conversion().map_err(fault)?;

        while !ltc.is_done().map_err(fault)? {
            std::thread::sleep(Duration::from_millis(10));
        }

        for ch in channels.channels() {
            let celsius = ltc.read_temperature(ch).map_err(fault)?;
            let status = ltc.status();

            if status.has_hard_fault() {
                println!("CH{}: fault {:?}", ch, status);
            } else {
                println!("CH{}: {:.2} C ({:?})", ch, celsius, status);
            }
        }

        std::thread::sleep(Duration::from_secs(1));
    }
}

#[cfg(not(feature = "raspberry_pi"))]
fn main() {
    const _: () = panic!("Raspberry Pi feature must be enabled");
}
