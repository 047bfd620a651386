//! Transmission mode register (REG3)
//!
//! | bits | field                          |
//! |------|--------------------------------|
//! | 7    | append RSSI byte on receive    |
//! | 6    | fixed transmission             |
//! | 5    | reserved                       |
//! | 4    | listen before talk             |
//! | 3    | reserved                       |
//! | 2:0  | WOR period                     |

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Wake-on-radio cycle
///
/// Only meaningful in the WOR modes. The transmitter's period must not be
/// shorter than the receiver's, or the receiver can sleep through the
/// preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorPeriod {
    Ms500 = 0b000,
    Ms1000 = 0b001,
    Ms1500 = 0b010,
    #[default]
    Ms2000 = 0b011,
    Ms2500 = 0b100,
    Ms3000 = 0b101,
    Ms3500 = 0b110,
    Ms4000 = 0b111,
}

impl WorPeriod {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::Ms500,
            0b001 => Self::Ms1000,
            0b010 => Self::Ms1500,
            0b011 => Self::Ms2000,
            0b100 => Self::Ms2500,
            0b101 => Self::Ms3000,
            0b110 => Self::Ms3500,
            _ => Self::Ms4000,
        }
    }

    /// Period in milliseconds: 500 * (code + 1)
    pub const fn millis(self) -> u32 {
        500 * (self as u32 + 1)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Ms500 => "500ms",
            Self::Ms1000 => "1000ms",
            Self::Ms1500 => "1500ms",
            Self::Ms2000 => "2000ms (default)",
            Self::Ms2500 => "2500ms",
            Self::Ms3000 => "3000ms",
            Self::Ms3500 => "3500ms",
            Self::Ms4000 => "4000ms",
        }
    }
}

bitflags! {
    /// Single-bit switches of the transmission mode register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TransmissionFlags: u8 {
        /// Listen before talk: wait for a quiet channel before transmitting
        const LISTEN_BEFORE_TALK = 1 << 4;
        /// Fixed transmission: the first three bytes of every write are
        /// the target address and channel
        /// When clear, transparent transmission
        const FIXED_TRANSMISSION = 1 << 6;
        /// Append one RSSI byte after every received packet
        const ENABLE_RSSI = 1 << 7;
    }
}

impl Default for TransmissionFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransmissionFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TransmissionFlags({=u8:#04x})", self.bits())
    }
}

/// Transmission mode register (address: 0x05)
///
/// # Important Notes
/// - With [`TransmissionFlags::ENABLE_RSSI`] set every received packet is
///   followed by one RSSI byte; read it with the RSSI receive variants
/// - In fixed transmission mode use the fixed and broadcast send variants
#[register(0x05u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmissionMode {
    pub wor_period: WorPeriod,
    pub flags: TransmissionFlags,
}

impl TransmissionMode {
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            wor_period: WorPeriod::from_bits(bits),
            flags: TransmissionFlags::from_bits_truncate(bits),
        }
    }

    pub const fn bits(self) -> u8 {
        self.flags.bits() | self.wor_period as u8
    }

    pub const fn is_fixed(self) -> bool {
        self.flags.contains(TransmissionFlags::FIXED_TRANSMISSION)
    }

    pub const fn rssi_enabled(self) -> bool {
        self.flags.contains(TransmissionFlags::ENABLE_RSSI)
    }

    pub const fn lbt_enabled(self) -> bool {
        self.flags.contains(TransmissionFlags::LISTEN_BEFORE_TALK)
    }

    pub const fn fixed_transmission_description(self) -> &'static str {
        if self.is_fixed() {
            "Fixed transmission (first three bytes can be used as high/low address and channel)"
        } else {
            "Transparent transmission (default)"
        }
    }

    pub const fn rssi_description(self) -> &'static str {
        if self.rssi_enabled() {
            "Enabled"
        } else {
            "Disabled (default)"
        }
    }

    pub const fn lbt_description(self) -> &'static str {
        if self.lbt_enabled() {
            "Enabled"
        } else {
            "Disabled (default)"
        }
    }
}

impl FromByteArray for TransmissionMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_bits(bytes[0]))
    }
}

impl ToByteArray for TransmissionMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}
