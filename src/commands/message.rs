//! Over-the-air message framing
//!
//! In transparent mode a write is sent as-is. In fixed mode the module
//! consumes the first three bytes as the target address and channel:
//!
//! ```text
//! [ADDH][ADDL][CHAN][payload ...]
//! ```
//!
//! A configuration message is a fixed-mode payload that carries a complete
//! configuration frame for a peer, behind a two byte marker:
//!
//! ```text
//! [0xCF][0xCF][command][0x00][0x08][8 register bytes]
//! ```

use crate::{
    cipher::ConfigurationCipher, Configuration, Error, FrameHeader, ProgramCommand,
    RegisterAddress, CONFIGURATION_LEN, HEADER_LEN,
};

/// Largest payload the module accepts in one write
pub const MAX_PACKET_SIZE: usize = 200;

/// Length of the fixed-mode `[ADDH][ADDL][CHAN]` prefix
pub const FIXED_HEADER_LEN: usize = 3;

/// Largest payload of a fixed or broadcast message
pub const MAX_FIXED_PAYLOAD_SIZE: usize = MAX_PACKET_SIZE - FIXED_HEADER_LEN;

/// Address byte value received by every module on the channel
pub const BROADCAST_ADDRESS: u8 = 0xFF;

/// Marker byte opening a configuration message, sent twice
pub const SPECIAL_CONFIGURATION_COMMAND: u8 = 0xCF;

/// Target of a fixed-mode message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedAddress {
    pub address_high: u8,
    pub address_low: u8,
    pub channel: u8,
}

impl FixedAddress {
    pub const fn new(address_high: u8, address_low: u8, channel: u8) -> Self {
        Self {
            address_high,
            address_low,
            channel,
        }
    }

    /// Every module listening on `channel`
    pub const fn broadcast(channel: u8) -> Self {
        Self::new(BROADCAST_ADDRESS, BROADCAST_ADDRESS, channel)
    }

    pub const fn to_bytes(self) -> [u8; FIXED_HEADER_LEN] {
        [self.address_high, self.address_low, self.channel]
    }
}

/// Builds a fixed-mode frame into `out` and returns its length
///
/// # Errors
/// * `Error::PacketTooBig` - payload longer than 197 bytes
/// * `Error::BufferTooSmall` - `out` cannot hold the frame
pub fn encode_fixed_message(
    target: FixedAddress,
    payload: &[u8],
    out: &mut [u8],
) -> Result<usize, Error> {
    if payload.len() > MAX_FIXED_PAYLOAD_SIZE {
        return Err(Error::PacketTooBig);
    }
    let len = FIXED_HEADER_LEN + payload.len();
    let out = out.get_mut(..len).ok_or(Error::BufferTooSmall)?;
    out[..FIXED_HEADER_LEN].copy_from_slice(&target.to_bytes());
    out[FIXED_HEADER_LEN..].copy_from_slice(payload);
    Ok(len)
}

/// A configuration frame addressed to a remote module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigurationMessage {
    pub command: ProgramCommand,
    pub configuration: Configuration,
}

impl ConfigurationMessage {
    /// Encoded length: marker, frame header and the register block
    pub const LEN: usize = 2 + HEADER_LEN + CONFIGURATION_LEN;

    pub fn encode(&self, cipher: &impl ConfigurationCipher) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0] = SPECIAL_CONFIGURATION_COMMAND;
        out[1] = SPECIAL_CONFIGURATION_COMMAND;
        out[2..2 + HEADER_LEN].copy_from_slice(
            &FrameHeader::request(self.command, RegisterAddress::Configuration).to_bytes(),
        );
        out[2 + HEADER_LEN..].copy_from_slice(&cipher.encrypt(self.configuration.encode()));
        out
    }

    /// Whether `bytes` opens with the configuration message marker
    pub fn is_configuration_message(bytes: &[u8]) -> bool {
        bytes.starts_with(&[SPECIAL_CONFIGURATION_COMMAND, SPECIAL_CONFIGURATION_COMMAND])
    }

    /// Parses a received configuration message
    ///
    /// # Errors
    /// * `Error::DataSizeMismatch` - not exactly [`Self::LEN`] bytes
    /// * `Error::HeadNotRecognized` - missing marker, or the frame does not
    ///   address the whole configuration block
    /// * `Error::WrongFormat` - the command byte is not a program command
    pub fn decode(bytes: &[u8], cipher: &impl ConfigurationCipher) -> Result<Self, Error> {
        let bytes: &[u8; Self::LEN] = bytes.try_into().map_err(|_| Error::DataSizeMismatch)?;

        if !Self::is_configuration_message(bytes) {
            return Err(Error::HeadNotRecognized);
        }

        let command = ProgramCommand::try_from(bytes[2]).map_err(|_| Error::WrongFormat)?;
        let expected = FrameHeader::request(command, RegisterAddress::Configuration);
        if bytes[3] != expected.address || bytes[4] != expected.length {
            return Err(Error::HeadNotRecognized);
        }

        let mut block = [0u8; CONFIGURATION_LEN];
        block.copy_from_slice(&bytes[2 + HEADER_LEN..]);

        Ok(Self {
            command,
            configuration: Configuration::decode(&cipher.decrypt(block))?,
        })
    }
}
