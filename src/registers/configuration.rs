//! Configuration block and identity registers
//!
//! The module keeps its whole configuration in eight consecutive registers:
//!
//! | address | register            |
//! |---------|---------------------|
//! | 0x00    | ADDH                |
//! | 0x01    | ADDL                |
//! | 0x02    | [`Speed`]           |
//! | 0x03    | [`Options`]         |
//! | 0x04    | [`Channel`]         |
//! | 0x05    | [`TransmissionMode`]|
//! | 0x06    | CRYPT_H             |
//! | 0x07    | CRYPT_L             |
//!
//! [`Configuration`] reads or writes all of them in one exchange; the
//! narrower register types here and in the sibling modules cover partial
//! access.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::{Error, FrequencyBand, Options, Speed, TransmissionMode};

/// Number of bytes in the configuration block
pub const CONFIGURATION_LEN: usize = 8;

/// Channel register (address: 0x04)
///
/// The operating frequency is the band's base frequency plus this value in
/// MHz, e.g. channel 23 on a 400 MHz band module is 433 MHz.
#[register(0x04u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    pub value: u8,
}

impl Channel {
    pub const fn frequency_mhz(self, band: FrequencyBand) -> u16 {
        band.base_frequency_mhz() + self.value as u16
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self { value: 23 }
    }
}

/// Encryption key registers (address: 0x06)
///
/// # Important Notes
/// - Write-only: the module always reads back zero
/// - Both ends of a link must use the same key
/// - Zero means no encryption
#[register(0x06u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Crypt {
    pub key: u16,
}

/// Full configuration block (address: 0x00, 8 bytes)
///
/// The default value is the module's factory configuration: address 0x0000,
/// 9600 8N1 UART, 2.4 kbps air rate, 200 byte sub-packets, maximum power,
/// channel 23, transparent transmission, 2000 ms WOR period and no key.
#[register(0x00u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    pub address_high: u8,
    pub address_low: u8,
    pub speed: Speed,
    pub options: Options,
    pub channel: Channel,
    pub transmission_mode: TransmissionMode,
    pub crypt: Crypt,
}

impl Configuration {
    /// 16-bit module address, ADDH in the high byte
    pub const fn address(&self) -> u16 {
        u16::from_be_bytes([self.address_high, self.address_low])
    }

    pub fn set_address(&mut self, address: u16) {
        [self.address_high, self.address_low] = address.to_be_bytes();
    }

    pub const fn channel_frequency_mhz(&self, band: FrequencyBand) -> u16 {
        self.channel.frequency_mhz(band)
    }

    /// Packs the block in register order
    pub const fn encode(&self) -> [u8; CONFIGURATION_LEN] {
        let key = self.crypt.key.to_be_bytes();
        [
            self.address_high,
            self.address_low,
            self.speed.bits(),
            self.options.bits(),
            self.channel.value,
            self.transmission_mode.bits(),
            key[0],
            key[1],
        ]
    }

    /// Unpacks a block read from the module
    ///
    /// # Errors
    /// * `Error::DataSizeMismatch` - `bytes` is not exactly 8 bytes long
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: &[u8; CONFIGURATION_LEN] =
            bytes.try_into().map_err(|_| Error::DataSizeMismatch)?;

        Ok(Self {
            address_high: bytes[0],
            address_low: bytes[1],
            speed: Speed::from_bits(bytes[2]),
            options: Options::from_bits(bytes[3]),
            channel: Channel { value: bytes[4] },
            transmission_mode: TransmissionMode::from_bits(bytes[5]),
            crypt: Crypt {
                key: u16::from_be_bytes([bytes[6], bytes[7]]),
            },
        })
    }
}

/// Module identity (address: 0x08, read-only)
#[register(0x08u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleInformation {
    pub model: u8,
    pub version: u8,
    pub features: u8,
}

impl FromByteArray for Channel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for Channel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for Crypt {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            key: u16::from_be_bytes(bytes),
        })
    }
}

impl ToByteArray for Crypt {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.key.to_be_bytes())
    }
}

impl FromByteArray for Configuration {
    type Error = Error;
    type Array = [u8; CONFIGURATION_LEN];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Self::decode(&bytes)
    }
}

impl ToByteArray for Configuration {
    type Error = Infallible;
    type Array = [u8; CONFIGURATION_LEN];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.encode())
    }
}

impl FromByteArray for ModuleInformation {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            model: bytes[0],
            version: bytes[1],
            features: bytes[2],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AirDataRate, PowerClass, SubPacketSize, TransmissionFlags, TransmissionPower, UartBaudRate,
        UartParity, WorPeriod,
    };
    use proptest::prelude::*;

    #[test]
    fn documented_block_layout() {
        let mut config = Configuration::default();
        config.address_high = 0x00;
        config.address_low = 0x01;
        config.channel = Channel { value: 23 };
        config.speed.uart_baud_rate = UartBaudRate::Bps9600;

        let bytes = config.encode();
        assert_eq!(bytes, [0x00, 0x01, 0x62, 0x00, 23, 0x03, 0x00, 0x00]);
        assert_eq!(Configuration::decode(&bytes), Ok(config));
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert_eq!(Configuration::decode(&[0; 7]), Err(Error::DataSizeMismatch));
        assert_eq!(Configuration::decode(&[0; 9]), Err(Error::DataSizeMismatch));
    }

    #[test]
    fn address_and_frequency_helpers() {
        let mut config = Configuration::default();
        config.set_address(0xBEEF);
        assert_eq!((config.address_high, config.address_low), (0xBE, 0xEF));
        assert_eq!(config.address(), 0xBEEF);
        assert_eq!(config.channel_frequency_mhz(FrequencyBand::Band433), 433);
        assert_eq!(config.channel_frequency_mhz(FrequencyBand::Band915), 923);
        assert_eq!(config.options.transmission_power.dbm(PowerClass::Dbm22), 22);
    }

    fn configuration() -> impl Strategy<Value = Configuration> {
        (
            any::<[u8; 2]>(),
            (0u8..8, 0u8..4, 0u8..8),
            (0u8..4, any::<bool>(), 0u8..4),
            any::<u8>(),
            (0u8..8, any::<bool>(), any::<bool>(), any::<bool>()),
            any::<u16>(),
        )
            .prop_map(|(addr, speed, options, chan, mode, key)| {
                let (air, parity, baud) = speed;
                let (power, noise, sub) = options;
                let (wor, lbt, fixed, rssi) = mode;
                let mut flags = TransmissionFlags::empty();
                flags.set(TransmissionFlags::LISTEN_BEFORE_TALK, lbt);
                flags.set(TransmissionFlags::FIXED_TRANSMISSION, fixed);
                flags.set(TransmissionFlags::ENABLE_RSSI, rssi);
                Configuration {
                    address_high: addr[0],
                    address_low: addr[1],
                    speed: Speed {
                        air_data_rate: AirDataRate::from_bits(air),
                        uart_parity: UartParity::from_bits(parity),
                        uart_baud_rate: UartBaudRate::from_bits(baud),
                    },
                    options: Options {
                        transmission_power: TransmissionPower::from_bits(power),
                        ambient_noise_rssi: noise,
                        sub_packet_size: SubPacketSize::from_bits(sub),
                    },
                    channel: Channel { value: chan },
                    transmission_mode: TransmissionMode {
                        wor_period: WorPeriod::from_bits(wor),
                        flags,
                    },
                    crypt: Crypt { key },
                }
            })
    }

    proptest! {
        #[test]
        fn block_round_trips(config in configuration()) {
            prop_assert_eq!(Configuration::decode(&config.encode()), Ok(config));
        }

        #[test]
        fn reserved_bits_never_survive(bytes in any::<[u8; 8]>()) {
            let encoded = Configuration::decode(&bytes).unwrap().encode();
            prop_assert_eq!(encoded[3] & 0b0001_1100, 0);
            prop_assert_eq!(encoded[5] & 0b0010_1000, 0);
        }
    }
}
