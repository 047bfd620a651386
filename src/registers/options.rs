//! Option register (REG1)
//!
//! | bits | field                        |
//! |------|------------------------------|
//! | 7:6  | sub-packet size              |
//! | 5    | ambient noise RSSI enable    |
//! | 4:2  | reserved, always zero        |
//! | 1:0  | transmission power           |

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Maximum size of a single over-the-air sub-packet
///
/// Longer writes are split by the module into sub-packets of this size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubPacketSize {
    #[default]
    Bytes200 = 0b00,
    Bytes128 = 0b01,
    Bytes64 = 0b10,
    Bytes32 = 0b11,
}

impl SubPacketSize {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Bytes200,
            0b01 => Self::Bytes128,
            0b10 => Self::Bytes64,
            _ => Self::Bytes32,
        }
    }

    pub const fn bytes(self) -> usize {
        match self {
            Self::Bytes200 => 200,
            Self::Bytes128 => 128,
            Self::Bytes64 => 64,
            Self::Bytes32 => 32,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Bytes200 => "200bytes (default)",
            Self::Bytes128 => "128bytes",
            Self::Bytes64 => "64bytes",
            Self::Bytes32 => "32bytes",
        }
    }
}

/// Output power class of the module variant
///
/// The power field is a relative level; what it means in dBm depends on
/// whether the module is a 22 dBm or a 30 dBm part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerClass {
    #[default]
    Dbm22,
    Dbm30,
}

/// Transmission power level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmissionPower {
    /// 22 dBm or 30 dBm depending on the power class
    #[default]
    Max = 0b00,
    High = 0b01,
    Medium = 0b10,
    Low = 0b11,
}

impl TransmissionPower {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Max,
            0b01 => Self::High,
            0b10 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Output power in dBm for a module of the given power class
    pub const fn dbm(self, class: PowerClass) -> u8 {
        match (class, self) {
            (PowerClass::Dbm22, Self::Max) => 22,
            (PowerClass::Dbm22, Self::High) => 17,
            (PowerClass::Dbm22, Self::Medium) => 13,
            (PowerClass::Dbm22, Self::Low) => 10,
            (PowerClass::Dbm30, Self::Max) => 30,
            (PowerClass::Dbm30, Self::High) => 27,
            (PowerClass::Dbm30, Self::Medium) => 24,
            (PowerClass::Dbm30, Self::Low) => 21,
        }
    }

    pub const fn description(self, class: PowerClass) -> &'static str {
        match (class, self) {
            (PowerClass::Dbm22, Self::Max) => "22dBm (Default)",
            (PowerClass::Dbm22, Self::High) => "17dBm",
            (PowerClass::Dbm22, Self::Medium) => "13dBm",
            (PowerClass::Dbm22, Self::Low) => "10dBm",
            (PowerClass::Dbm30, Self::Max) => "30dBm (Default)",
            (PowerClass::Dbm30, Self::High) => "27dBm",
            (PowerClass::Dbm30, Self::Medium) => "24dBm",
            (PowerClass::Dbm30, Self::Low) => "21dBm",
        }
    }
}

/// Option register (address: 0x03)
///
/// # Important Notes
/// - With ambient noise RSSI enabled the module answers the RSSI query
///   command while in normal or WOR transmitter mode
/// - Reserved bits are dropped on decode and written as zero
#[register(0x03u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Options {
    pub transmission_power: TransmissionPower,
    pub ambient_noise_rssi: bool,
    pub sub_packet_size: SubPacketSize,
}

impl Options {
    const AMBIENT_NOISE_RSSI: u8 = 1 << 5;

    pub const fn from_bits(bits: u8) -> Self {
        Self {
            transmission_power: TransmissionPower::from_bits(bits),
            ambient_noise_rssi: bits & Self::AMBIENT_NOISE_RSSI != 0,
            sub_packet_size: SubPacketSize::from_bits(bits >> 6),
        }
    }

    pub const fn bits(self) -> u8 {
        let noise = if self.ambient_noise_rssi {
            Self::AMBIENT_NOISE_RSSI
        } else {
            0
        };
        (self.sub_packet_size as u8) << 6 | noise | self.transmission_power as u8
    }

    pub const fn ambient_noise_description(self) -> &'static str {
        if self.ambient_noise_rssi {
            "Enabled"
        } else {
            "Disabled (default)"
        }
    }
}

impl FromByteArray for Options {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_bits(bytes[0]))
    }
}

impl ToByteArray for Options {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}
