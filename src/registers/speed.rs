//! Speed register (REG0)
//!
//! Packs the UART link settings and the over-the-air data rate into a single
//! byte:
//!
//! | bits | field            |
//! |------|------------------|
//! | 7:5  | UART baud rate   |
//! | 4:3  | UART parity      |
//! | 2:0  | air data rate    |
//!
//! Both ends of a radio link must use the same air data rate. The UART
//! settings only concern the wire between the host and the module.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Over-the-air data rate
///
/// The three lowest codes all select 2.4 kbps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AirDataRate {
    Kbps2_4Code0 = 0b000,
    Kbps2_4Code1 = 0b001,
    #[default]
    Kbps2_4 = 0b010,
    Kbps4_8 = 0b011,
    Kbps9_6 = 0b100,
    Kbps19_2 = 0b101,
    Kbps38_4 = 0b110,
    Kbps62_5 = 0b111,
}

impl AirDataRate {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::Kbps2_4Code0,
            0b001 => Self::Kbps2_4Code1,
            0b010 => Self::Kbps2_4,
            0b011 => Self::Kbps4_8,
            0b100 => Self::Kbps9_6,
            0b101 => Self::Kbps19_2,
            0b110 => Self::Kbps38_4,
            _ => Self::Kbps62_5,
        }
    }

    /// Nominal data rate in bits per second
    pub const fn bps(self) -> u32 {
        match self {
            Self::Kbps2_4Code0 | Self::Kbps2_4Code1 | Self::Kbps2_4 => 2_400,
            Self::Kbps4_8 => 4_800,
            Self::Kbps9_6 => 9_600,
            Self::Kbps19_2 => 19_200,
            Self::Kbps38_4 => 38_400,
            Self::Kbps62_5 => 62_500,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Kbps2_4Code0 | Self::Kbps2_4Code1 => "2.4kbps",
            Self::Kbps2_4 => "2.4kbps (default)",
            Self::Kbps4_8 => "4.8kbps",
            Self::Kbps9_6 => "9.6kbps",
            Self::Kbps19_2 => "19.2kbps",
            Self::Kbps38_4 => "38.4kbps",
            Self::Kbps62_5 => "62.5kbps",
        }
    }
}

/// UART frame format between host and module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartParity {
    /// 8 data bits, no parity, 1 stop bit
    #[default]
    Mode8N1 = 0b00,
    /// 8 data bits, odd parity, 1 stop bit
    Mode8O1 = 0b01,
    /// 8 data bits, even parity, 1 stop bit
    Mode8E1 = 0b10,
    /// Alternate encoding of 8N1
    Mode8N1Alt = 0b11,
}

impl UartParity {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Mode8N1,
            0b01 => Self::Mode8O1,
            0b10 => Self::Mode8E1,
            _ => Self::Mode8N1Alt,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Mode8N1 => "8N1 (Default)",
            Self::Mode8O1 => "8O1",
            Self::Mode8E1 => "8E1",
            Self::Mode8N1Alt => "8N1 (equal to 00)",
        }
    }
}

/// UART baud rate between host and module
///
/// This is both a register field and the driver's record of the speed the
/// host side of the link currently runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBaudRate {
    Bps1200 = 0b000,
    Bps2400 = 0b001,
    Bps4800 = 0b010,
    #[default]
    Bps9600 = 0b011,
    Bps19200 = 0b100,
    Bps38400 = 0b101,
    Bps57600 = 0b110,
    Bps115200 = 0b111,
}

impl UartBaudRate {
    /// The only link speed the module accepts configuration commands at
    pub const CONFIGURATION: Self = Self::Bps9600;

    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::Bps1200,
            0b001 => Self::Bps2400,
            0b010 => Self::Bps4800,
            0b011 => Self::Bps9600,
            0b100 => Self::Bps19200,
            0b101 => Self::Bps38400,
            0b110 => Self::Bps57600,
            _ => Self::Bps115200,
        }
    }

    /// Looks up the register code for a baud rate given in bits per second
    pub const fn from_bps(bps: u32) -> Option<Self> {
        match bps {
            1_200 => Some(Self::Bps1200),
            2_400 => Some(Self::Bps2400),
            4_800 => Some(Self::Bps4800),
            9_600 => Some(Self::Bps9600),
            19_200 => Some(Self::Bps19200),
            38_400 => Some(Self::Bps38400),
            57_600 => Some(Self::Bps57600),
            115_200 => Some(Self::Bps115200),
            _ => None,
        }
    }

    pub const fn bps(self) -> u32 {
        match self {
            Self::Bps1200 => 1_200,
            Self::Bps2400 => 2_400,
            Self::Bps4800 => 4_800,
            Self::Bps9600 => 9_600,
            Self::Bps19200 => 19_200,
            Self::Bps38400 => 38_400,
            Self::Bps57600 => 57_600,
            Self::Bps115200 => 115_200,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Bps1200 => "1200bps",
            Self::Bps2400 => "2400bps",
            Self::Bps4800 => "4800bps",
            Self::Bps9600 => "9600bps (default)",
            Self::Bps19200 => "19200bps",
            Self::Bps38400 => "38400bps",
            Self::Bps57600 => "57600bps",
            Self::Bps115200 => "115200bps",
        }
    }
}

/// Speed register (address: 0x02)
///
/// # Important Notes
/// - Changing the UART baud rate takes effect once the module leaves
///   configuration mode; the host must reopen its UART to match
/// - Configuration commands are only accepted at 9600 bps, whatever this
///   register says
#[register(0x02u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Speed {
    pub air_data_rate: AirDataRate,
    pub uart_parity: UartParity,
    pub uart_baud_rate: UartBaudRate,
}

impl Speed {
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            air_data_rate: AirDataRate::from_bits(bits),
            uart_parity: UartParity::from_bits(bits >> 3),
            uart_baud_rate: UartBaudRate::from_bits(bits >> 5),
        }
    }

    pub const fn bits(self) -> u8 {
        (self.uart_baud_rate as u8) << 5 | (self.uart_parity as u8) << 3 | self.air_data_rate as u8
    }
}

impl FromByteArray for Speed {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_bits(bytes[0]))
    }
}

impl ToByteArray for Speed {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}
