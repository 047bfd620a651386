//! Register definitions for the E220
//!
//! Every register type is a `regiface` register whose id is its address in
//! the module's configuration memory, so the same generic
//! [`Device::read_register`](crate::Device::read_register) and
//! [`Device::write_register`](crate::Device::write_register) serve the whole
//! block and each narrower window.
//!
//! Bit-packed registers are encoded with explicit masks and shifts; the
//! module's bit order is the only source of truth for the layout.
//!
//! [`RegisterValue`] is the run-time counterpart for callers that pick the
//! register dynamically.

mod configuration;
mod options;
mod speed;
mod transmission;

pub use configuration::*;
pub use options::*;
pub use speed::*;
pub use transmission::*;

use crate::{Error, RegisterAddress};

/// A register value tagged with the register it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterValue {
    Configuration(Configuration),
    Speed(Speed),
    Options(Options),
    Channel(Channel),
    TransmissionMode(TransmissionMode),
    Crypt(Crypt),
    ProductId(ModuleInformation),
}

impl RegisterValue {
    pub const fn address(&self) -> RegisterAddress {
        match self {
            Self::Configuration(_) => RegisterAddress::Configuration,
            Self::Speed(_) => RegisterAddress::Speed,
            Self::Options(_) => RegisterAddress::Options,
            Self::Channel(_) => RegisterAddress::Channel,
            Self::TransmissionMode(_) => RegisterAddress::TransmissionMode,
            Self::Crypt(_) => RegisterAddress::Crypt,
            Self::ProductId(_) => RegisterAddress::ProductId,
        }
    }

    /// Encodes the value into the front of `out`, returning the number of
    /// bytes written (always the register's packet length)
    ///
    /// # Errors
    /// * `Error::BufferTooSmall` - `out` is shorter than the packet length
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, Error> {
        let len = self.address().packet_length().get();
        let out = out.get_mut(..len).ok_or(Error::BufferTooSmall)?;

        match self {
            Self::Configuration(config) => out.copy_from_slice(&config.encode()),
            Self::Speed(speed) => out[0] = speed.bits(),
            Self::Options(options) => out[0] = options.bits(),
            Self::Channel(channel) => out[0] = channel.value,
            Self::TransmissionMode(mode) => out[0] = mode.bits(),
            Self::Crypt(crypt) => out.copy_from_slice(&crypt.key.to_be_bytes()),
            Self::ProductId(info) => {
                out.copy_from_slice(&[info.model, info.version, info.features])
            }
        }

        Ok(len)
    }

    /// Decodes the payload of a register window
    ///
    /// # Errors
    /// * `Error::DataSizeMismatch` - `bytes` does not match the register's
    ///   packet length
    pub fn decode(address: RegisterAddress, bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != address.packet_length().get() {
            return Err(Error::DataSizeMismatch);
        }

        Ok(match address {
            RegisterAddress::Configuration => Self::Configuration(Configuration::decode(bytes)?),
            RegisterAddress::Speed => Self::Speed(Speed::from_bits(bytes[0])),
            RegisterAddress::Options => Self::Options(Options::from_bits(bytes[0])),
            RegisterAddress::Channel => Self::Channel(Channel { value: bytes[0] }),
            RegisterAddress::TransmissionMode => {
                Self::TransmissionMode(TransmissionMode::from_bits(bytes[0]))
            }
            RegisterAddress::Crypt => Self::Crypt(Crypt {
                key: u16::from_be_bytes([bytes[0], bytes[1]]),
            }),
            RegisterAddress::ProductId => Self::ProductId(ModuleInformation {
                model: bytes[0],
                version: bytes[1],
                features: bytes[2],
            }),
        })
    }
}
