//! Program commands and register framing
//!
//! Every configuration exchange has the same shape. The host writes
//!
//! ```text
//! [command][start address][length][payload of `length` bytes, writes only]
//! ```
//!
//! and the module answers with the read command, the same address and
//! length, and the register contents. A module that did not understand the
//! request answers with `0xFF` in the command position.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::Error;

/// Command byte the module returns when it rejects a request
pub const WRONG_FORMAT: u8 = 0xFF;

/// Command byte the module echoes in every configuration response
pub const RESPONSE_COMMAND: u8 = ProgramCommand::ReadConfiguration as u8;

/// Length of the `[command][address][length]` header
pub const HEADER_LEN: usize = 3;

/// Largest register payload a single exchange carries
pub const MAX_REGISTER_LEN: usize = 8;

/// Largest configuration frame, header included
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_REGISTER_LEN;

/// Configuration memory commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ProgramCommand {
    /// Write registers and keep them across power cycles
    WritePersistent = 0xC0,
    /// Read registers
    ReadConfiguration = 0xC1,
    /// Write registers until the next power cycle
    WriteVolatile = 0xC2,
}

impl ProgramCommand {
    pub const fn is_write(self) -> bool {
        matches!(self, Self::WritePersistent | Self::WriteVolatile)
    }
}

/// Start address of a register window
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RegisterAddress {
    /// The whole configuration block
    Configuration = 0x00,
    Speed = 0x02,
    Options = 0x03,
    Channel = 0x04,
    TransmissionMode = 0x05,
    Crypt = 0x06,
    /// Module identity, read-only
    ProductId = 0x08,
}

impl RegisterAddress {
    pub const fn packet_length(self) -> PacketLength {
        match self {
            Self::Configuration => PacketLength::CONFIGURATION,
            Self::Speed => PacketLength::SPEED,
            Self::Options => PacketLength::OPTIONS,
            Self::Channel => PacketLength::CHANNEL,
            Self::TransmissionMode => PacketLength::TRANSMISSION_MODE,
            Self::Crypt => PacketLength::CRYPT,
            Self::ProductId => PacketLength::PRODUCT_ID,
        }
    }

    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::ProductId)
    }
}

/// Payload length of a register window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketLength(pub u8);

impl PacketLength {
    pub const CONFIGURATION: Self = Self(8);
    pub const SPEED: Self = Self(1);
    pub const OPTIONS: Self = Self(1);
    pub const TRANSMISSION_MODE: Self = Self(1);
    pub const CHANNEL: Self = Self(1);
    pub const CRYPT: Self = Self(2);
    pub const PRODUCT_ID: Self = Self(3);

    /// Window length in bytes
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

/// `[command][address][length]` frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    pub command: u8,
    pub address: u8,
    pub length: u8,
}

impl FrameHeader {
    /// Header of a request for the given register window
    pub const fn request(command: ProgramCommand, address: RegisterAddress) -> Self {
        Self {
            command: command as u8,
            address: address as u8,
            length: address.packet_length().0,
        }
    }

    pub const fn to_bytes(self) -> [u8; HEADER_LEN] {
        [self.command, self.address, self.length]
    }

    pub const fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
        Self {
            command: bytes[0],
            address: bytes[1],
            length: bytes[2],
        }
    }

    /// Checks a response header against the window that was requested
    ///
    /// # Errors
    /// * `Error::WrongFormat` - the module answered with its wrong-format
    ///   sentinel
    /// * `command_mismatch` - the command byte is not the response command
    /// * `Error::HeadNotRecognized` - address or length differ from the
    ///   request
    pub fn validate_response(
        self,
        address: RegisterAddress,
        command_mismatch: Error,
    ) -> Result<(), Error> {
        if self.command == WRONG_FORMAT {
            return Err(Error::WrongFormat);
        }
        if self.command != RESPONSE_COMMAND {
            return Err(command_mismatch);
        }
        if self.address != address as u8 || self.length != address.packet_length().0 {
            return Err(Error::HeadNotRecognized);
        }
        Ok(())
    }
}

/// Writes `header` followed by `payload` into `out`
///
/// Returns the frame length.
///
/// # Errors
/// * `Error::DataSizeMismatch` - the payload length differs from the header
/// * `Error::BufferTooSmall` - `out` cannot hold the frame
pub fn encode_frame(header: FrameHeader, payload: &[u8], out: &mut [u8]) -> Result<usize, Error> {
    if payload.len() != header.length as usize {
        return Err(Error::DataSizeMismatch);
    }
    let len = HEADER_LEN + payload.len();
    let out = out.get_mut(..len).ok_or(Error::BufferTooSmall)?;
    out[..HEADER_LEN].copy_from_slice(&header.to_bytes());
    out[HEADER_LEN..].copy_from_slice(payload);
    Ok(len)
}

/// Splits a frame into its header and payload
///
/// # Errors
/// * `Error::DataSizeMismatch` - the frame is shorter than a header, or the
///   payload length differs from the header's length byte
pub fn decode_frame(frame: &[u8]) -> Result<(FrameHeader, &[u8]), Error> {
    if frame.len() < HEADER_LEN {
        return Err(Error::DataSizeMismatch);
    }
    let (head, payload) = frame.split_at(HEADER_LEN);
    let header = FrameHeader::from_bytes([head[0], head[1], head[2]]);
    if payload.len() != header.length as usize {
        return Err(Error::DataSizeMismatch);
    }
    Ok((header, payload))
}
