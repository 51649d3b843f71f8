//! Register address map and command constants for the LTC2983/LTC2984.
//!
//! Every register access is `[op-code, address_hi, address_lo]` followed by
//! the data bytes, most significant byte first.

// ---------------------------------------------------------------------------
// SPI op-codes
// ---------------------------------------------------------------------------

/// Op-code preceding a register write.
pub const OP_WRITE: u8 = 0x02;

/// Op-code preceding a register read.
pub const OP_READ: u8 = 0x03;

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// Command and status register (8-bit).
pub const COMMAND: u16 = 0x000;

/// First conversion result register (32-bit, one per channel).
pub const RESULT_BASE: u16 = 0x010;

/// Global configuration register (8-bit).
pub const GLOBAL_CONFIG: u16 = 0x0F0;

/// Multiple conversion channel mask (32-bit, 20 bits used).
pub const MULTIPLE_CONVERSION_MASK: u16 = 0x0F4;

/// MUX configuration delay (8-bit, unit of 10µs).
pub const MUX_DELAY: u16 = 0x0FF;

/// First channel assignment register (32-bit, one per channel).
pub const CHANNEL_CONFIG_BASE: u16 = 0x200;

/// Start of the custom sensor table RAM.
pub const RAM_START: u16 = 0x250;

/// End of the custom sensor table RAM.
pub const RAM_END: u16 = 0x3CA;

/// Width of the custom sensor table RAM in bytes.
pub const RAM_WIDTH: u16 = RAM_END - RAM_START;

// ---------------------------------------------------------------------------
// Command register
// ---------------------------------------------------------------------------

/// Start bit; the low five bits select a single channel, or zero for the
/// channels enabled in [`MULTIPLE_CONVERSION_MASK`].
pub const CMD_BEGIN: u8 = 0x80;

/// Enter sleep mode.
pub const CMD_SLEEP: u8 = 0x97;

/// Set in the command register once the requested conversion has finished.
/// Mirrors the INTERRUPT pin.
pub const STATUS_DONE: u8 = 0x40;

// ---------------------------------------------------------------------------
// Global configuration register
// ---------------------------------------------------------------------------

/// Report temperatures in Fahrenheit when set, Celsius when clear.
pub const GLOBAL_FAHRENHEIT: u8 = 0x04;

/// AC rejection selection bits.
pub const GLOBAL_REJECTION_MASK: u8 = 0x03;

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// Number of input channels.
pub const CHANNEL_COUNT: u8 = 20;

/// Bitmap covering every channel in [`MULTIPLE_CONVERSION_MASK`].
pub const ALL_CHANNELS: u32 = (1 << CHANNEL_COUNT as u32) - 1;

/// Address of the channel assignment register for channel `ch` (1-based).
pub const fn channel_config(ch: u8) -> u16 {
    CHANNEL_CONFIG_BASE + (ch as u16 - 1) * 4
}

/// Address of the conversion result register for channel `ch` (1-based).
pub const fn result(ch: u8) -> u16 {
    RESULT_BASE + (ch as u16 - 1) * 4
}
