//! Decode LTC2983/LTC2984 register values captured off the bus.
//!
//! ```text
//! main config 0x11740000
//! main result 0x0100_6400 [adc]
//! main global 0x06
//! ```

use anyhow::{anyhow, bail, Context};
use ltc298x::status::{self, Status};
use ltc298x::{ChannelConfig, GlobalConfig};

const USAGE: &str = "usage: main <config|result|global> <value> [adc]";

fn main() -> Result<(), anyhow::Error> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (kind, value) = match args.as_slice() {
        [kind, value, ..] => (kind.as_str(), parse_value(value)?),
        _ => bail!(USAGE),
    };

    match kind {
        "config" => {
            let config = ChannelConfig::decode(value).map_err(|error| anyhow!("{}", error))?;
            println!("{:#010x}: {:#?}", value, config);
        }
        "result" => {
            let (status, payload) = status::split_result(value);
            let adc = args.get(2).is_some_and(|flag| flag == "adc");

            if adc {
                println!("{:#010x}: {} V", value, status::voltage(payload));
            } else {
                println!("{:#010x}: {} degrees", value, status::temperature(payload));
            }

            print_status(status);
        }
        "global" => {
            let bits = u8::try_from(value).context("global configuration is one byte")?;
            let config = GlobalConfig::from_bits(bits).map_err(|error| anyhow!("{}", error))?;
            println!("{:#04x}: {:?}", bits, config);
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn print_status(status: Status) {
    if status.is_config_error() {
        println!("status: channel assignment rejected by the chip");
        return;
    }

    if status.is_empty() {
        println!("status: none");
    }

    for (name, _) in status.iter_names() {
        println!("status: {}", name.to_lowercase().replace('_', " "));
    }
}

/// Accept decimal or `0x` prefixed hex, with `_` separators.
fn parse_value(text: &str) -> Result<u32, anyhow::Error> {
    let text = text.replace('_', "");

    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };

    value.with_context(|| format!("{} is not a register value", text))
}
