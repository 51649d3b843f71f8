//! Global configuration and multiple-conversion channel selection.

use crate::error::{DecodeError, InvalidConfig};
use crate::registers::{ALL_CHANNELS, CHANNEL_COUNT, GLOBAL_FAHRENHEIT, GLOBAL_REJECTION_MASK};
use crate::sensor::{Rejection, TemperatureUnit};

/// Settings held in the global configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlobalConfig {
    pub unit: TemperatureUnit,
    pub rejection: Rejection,
}

impl Default for GlobalConfig {
    /// The chip's power-on state.
    fn default() -> Self {
        Self {
            unit: TemperatureUnit::Celsius,
            rejection: Rejection::Hz50And60,
        }
    }
}

impl GlobalConfig {
    /// Bits this configuration owns in the register.
    pub const MASK: u8 = GLOBAL_FAHRENHEIT | GLOBAL_REJECTION_MASK;

    /// Register bits for this configuration.
    pub fn bits(&self) -> u8 {
        let unit = match self.unit {
            TemperatureUnit::Celsius => 0,
            TemperatureUnit::Fahrenheit => GLOBAL_FAHRENHEIT,
        };
        unit | self.rejection.code()
    }

    /// Replace the bits this configuration owns in `current`, keeping the
    /// rest.
    pub fn apply(&self, current: u8) -> u8 {
        (current & !Self::MASK) | self.bits()
    }

    /// Parse the register value.
    pub fn from_bits(bits: u8) -> Result<Self, DecodeError> {
        let unit = if bits & GLOBAL_FAHRENHEIT != 0 {
            TemperatureUnit::Fahrenheit
        } else {
            TemperatureUnit::Celsius
        };
        let rejection =
            Rejection::from_code(bits & GLOBAL_REJECTION_MASK).ok_or(DecodeError::ReservedValue("rejection"))?;
        Ok(Self { unit, rejection })
    }
}

/// Bitmap of channels converted by a multiple conversion; bit `n - 1`
/// selects channel `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMask(u32);

impl ChannelMask {
    /// No channels.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every channel.
    pub const fn all() -> Self {
        Self(ALL_CHANNELS)
    }

    /// Use a raw bitmap, refusing bits above channel 20.
    pub fn from_bits(bits: u32) -> Result<Self, InvalidConfig> {
        if bits > ALL_CHANNELS {
            return Err(InvalidConfig::ChannelOutOfRange);
        }
        Ok(Self(bits))
    }

    /// Add channel `ch` (1-based).
    pub fn with(self, ch: u8) -> Result<Self, InvalidConfig> {
        if ch == 0 || ch > CHANNEL_COUNT {
            return Err(InvalidConfig::ChannelOutOfRange);
        }
        Ok(Self(self.0 | 1 << (ch - 1)))
    }

    /// Build a mask from a list of channels.
    pub fn from_channels(channels: &[u8]) -> Result<Self, InvalidConfig> {
        channels.iter().try_fold(Self::empty(), |mask, &ch| mask.with(ch))
    }

    pub const fn contains(&self, ch: u8) -> bool {
        ch != 0 && ch <= CHANNEL_COUNT && self.0 & (1 << (ch - 1)) != 0
    }

    /// Selected channels in ascending order.
    pub fn channels(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=CHANNEL_COUNT).filter(move |&ch| self.contains(ch))
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_config_bits() {
        let config = GlobalConfig {
            unit: TemperatureUnit::Fahrenheit,
            rejection: Rejection::Hz50,
        };
        assert_eq!(config.bits(), 0x06);
        assert_eq!(GlobalConfig::from_bits(0x06), Ok(config));
        assert_eq!(GlobalConfig::default().bits(), 0x00);
    }

    #[test]
    fn apply_keeps_unrelated_bits() {
        let config = GlobalConfig {
            unit: TemperatureUnit::Celsius,
            rejection: Rejection::Hz60,
        };
        assert_eq!(config.apply(0xFF), 0xF9);
        assert_eq!(config.apply(0x00), 0x01);
    }

    #[test]
    fn reserved_rejection() {
        assert_eq!(GlobalConfig::from_bits(0x03), Err(DecodeError::ReservedValue("rejection")));
    }

    #[test]
    fn channel_mask() {
        let mask = ChannelMask::from_channels(&[2, 6, 20]).unwrap();
        assert_eq!(mask.bits(), (1 << 1) | (1 << 5) | (1 << 19));
        assert!(mask.contains(6));
        assert!(!mask.contains(5));
        assert!(!mask.contains(0));
        let mut channels = mask.channels();
        assert_eq!(channels.next(), Some(2));
        assert_eq!(channels.next(), Some(6));
        assert_eq!(channels.next(), Some(20));
        assert_eq!(channels.next(), None);

        assert_eq!(ChannelMask::from_channels(&[0]), Err(InvalidConfig::ChannelOutOfRange));
        assert_eq!(ChannelMask::from_channels(&[21]), Err(InvalidConfig::ChannelOutOfRange));
        assert_eq!(ChannelMask::from_bits(0x10_0000), Err(InvalidConfig::ChannelOutOfRange));
        assert_eq!(ChannelMask::from_bits(0xF_FFFF), Ok(ChannelMask::all()));
    }
}
