//! Sensor types and the enumerated options of each sensor family.

/// Declares a `#[repr(u8)]` enum whose discriminants are the raw register
/// codes, together with `code()` and `from_code()`.
macro_rules! register_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident = $code:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum $name {
            $($(#[$variant_meta])* $variant = $code,)+
        }

        impl $name {
            /// Raw register value.
            pub const fn code(self) -> u8 {
                self as u8
            }

            /// Parse a raw register value.
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Sensor type codes without options
// ---------------------------------------------------------------------------

pub const TYPE_UNASSIGNED: u8 = 0x00;
pub const TYPE_CUSTOM_THERMOCOUPLE: u8 = 0x09;
pub const TYPE_CUSTOM_RTD: u8 = 0x12;
pub const TYPE_STEINHART_HART_THERMISTOR: u8 = 0x1A;
pub const TYPE_CUSTOM_THERMISTOR: u8 = 0x1B;
pub const TYPE_DIODE: u8 = 0x1C;
pub const TYPE_SENSE_RESISTOR: u8 = 0x1D;
pub const TYPE_DIRECT_ADC: u8 = 0x1E;

register_enum! {
    /// Thermocouples with a built-in linearization table.
    pub enum ThermocoupleType {
        J = 0x01,
        K = 0x02,
        E = 0x03,
        N = 0x04,
        R = 0x05,
        S = 0x06,
        T = 0x07,
        B = 0x08,
    }
}

register_enum! {
    /// RTDs with a built-in linearization table.
    pub enum RtdType {
        Pt10 = 0x0A,
        Pt50 = 0x0B,
        Pt100 = 0x0C,
        Pt200 = 0x0D,
        Pt500 = 0x0E,
        Pt1000 = 0x0F,
        /// 1kΩ RTD with α = 0.00375.
        Rtd1000 = 0x10,
        Ni120 = 0x11,
    }
}

register_enum! {
    /// Thermistors with a built-in linearization table.
    pub enum ThermistorType {
        /// 2.252kΩ at 25°C.
        Ntc44004 = 0x13,
        /// 3kΩ at 25°C.
        Ntc44005 = 0x14,
        /// 5kΩ at 25°C.
        Ntc44007 = 0x15,
        /// 10kΩ at 25°C.
        Ntc44006 = 0x16,
        /// 30kΩ at 25°C.
        Ntc44008 = 0x17,
        /// YSI 400, 2.252kΩ at 25°C.
        Ysi400 = 0x18,
        /// Spectrum 1003k, 1kΩ.
        Spectrum1003k = 0x19,
    }
}

register_enum! {
    /// Excitation current for diode sensors.
    pub enum DiodeCurrent {
        MicroAmps10 = 0,
        MicroAmps20 = 1,
        MicroAmps40 = 2,
        MicroAmps80 = 3,
    }
}

register_enum! {
    /// Test current injected for thermocouple open-circuit detection.
    pub enum OpenCircuitCurrent {
        MicroAmps10 = 0,
        MicroAmps100 = 1,
        MicroAmps500 = 2,
        MilliAmps1 = 3,
    }
}

register_enum! {
    /// Excitation current for RTDs.
    pub enum RtdCurrent {
        MicroAmps5 = 1,
        MicroAmps10 = 2,
        MicroAmps25 = 3,
        MicroAmps50 = 4,
        MicroAmps100 = 5,
        MicroAmps250 = 6,
        MicroAmps500 = 7,
        MilliAmps1 = 8,
    }
}

register_enum! {
    /// Standard used to linearize platinum RTDs.
    pub enum RtdCurve {
        European = 0,
        American = 1,
        Japanese = 2,
        Its90 = 3,
    }
}

register_enum! {
    /// Excitation current for thermistors.
    pub enum ThermistorCurrent {
        NanoAmps250 = 1,
        NanoAmps500 = 2,
        MicroAmps1 = 3,
        MicroAmps5 = 4,
        MicroAmps10 = 5,
        MicroAmps25 = 6,
        MicroAmps50 = 7,
        MicroAmps100 = 8,
        MicroAmps250 = 9,
        MicroAmps500 = 10,
        MilliAmps1 = 11,
        /// Let the chip pick the current per conversion.
        Auto = 12,
    }
}

register_enum! {
    /// Sense resistor sharing and current source rotation for resistive
    /// sensors.
    pub enum ExcitationMode {
        /// Dedicated sense resistor, no rotation.
        NoSharing = 0,
        /// Shared sense resistor, no rotation.
        Sharing = 1,
        /// Shared sense resistor with current source rotation.
        SharingRotation = 2,
    }
}

register_enum! {
    /// RTD wiring. The register holds the wire count minus two.
    pub enum Wiring {
        TwoWire = 0,
        ThreeWire = 1,
        FourWire = 2,
        /// Four wires with a Kelvin-connected sense resistor.
        FourWireKelvin = 3,
    }
}

impl Wiring {
    /// Number of wires, counting Kelvin sensing as a fifth.
    pub const fn wires(self) -> u8 {
        self.code() + 2
    }
}

register_enum! {
    /// Unit of reported temperatures.
    pub enum TemperatureUnit {
        Celsius = 0,
        Fahrenheit = 1,
    }
}

register_enum! {
    /// Digital filter notch used to reject mains interference.
    pub enum Rejection {
        /// 50Hz and 60Hz together, 75dB at 1ms MUX delay.
        Hz50And60 = 0,
        /// 60Hz only, 120dB.
        Hz60 = 1,
        /// 50Hz only, 120dB.
        Hz50 = 2,
    }
}
