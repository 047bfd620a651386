#![cfg_attr(not(test), no_std)]
//! EByte E220 LoRa UART Module Driver
//!
//! This crate provides a type-safe interface for the EByte E220 series of LoRa
//! transceiver modules. The modules are driven over a UART, with two mode
//! select lines (M0, M1) and an optional busy/ready line (AUX).
//!
//! # Features
//! - Transparent, fixed-address and broadcast transmission
//! - Up to 200 bytes per write, 197 in fixed mode
//! - Optional RSSI byte appended to received messages
//! - Wake-on-radio transmitter and receiver modes
//! - Persistent or volatile configuration writes
//! - Remote reconfiguration of a peer module over the air
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Main device interface for hardware interaction
//!   - Sequences operating mode changes on M0/M1 and waits on AUX
//!   - Sends and receives over-the-air messages
//!   - Reads and writes the configuration registers
//!
//! - [`registers`]: Register definitions for the configuration memory
//!   - [`Speed`]: UART baud rate, parity and air data rate
//!   - [`Options`]: sub-packet size, ambient noise RSSI and transmit power
//!   - [`TransmissionMode`]: fixed transmission, RSSI, LBT and WOR period
//!   - [`Configuration`]: the whole block in one exchange
//!
//! - [`commands`]: Wire framing
//!   - [`ProgramCommand`] and [`FrameHeader`] for configuration exchanges
//!   - [`FixedAddress`] and [`ConfigurationMessage`] for over-the-air frames
//!
//! - [`cipher`]: Transforms for remotely pushed configuration blocks
//!
//! # Usage
//! The main entry point is the [`Device`] struct which owns the UART, the
//! pins and a delay provider. The UART must implement `embedded_io::Read`,
//! `embedded_io::Write` and [`BytesAvailable`].
//!
//! A typical sequence:
//!
//! 1. Create a new [`Device`] with the UART opened at 9600 bps
//! 2. [`init`](Device::init) the module into normal mode
//! 3. Read the configuration and adjust what is needed
//! 4. Send and receive messages
//!
//! # Important Notes
//! - Configuration mode only works at 9600 bps on the host side
//! - The driver blocks while waiting on the module and never retries
//! - Without AUX the driver waits fixed delays, which must cover the
//!   module's slowest operation
//! - Fixed-mode sends need fixed transmission enabled in [`TransmissionMode`]
//!
//! # Example
//! ```no_run
//! use e220::{BytesAvailable, Configuration, Device, Error, ProgramCommand};
//! use embedded_hal::{delay::DelayNs, digital::{InputPin, OutputPin}};
//! use embedded_io::{Read, Write};
//!
//! fn configure<S, M0, M1, AUX, D>(
//!     device: &mut Device<S, M0, M1, AUX, D>,
//! ) -> Result<Configuration, Error>
//! where
//!     S: Read + Write + BytesAvailable,
//!     M0: OutputPin,
//!     M1: OutputPin,
//!     AUX: InputPin,
//!     D: DelayNs,
//! {
//!     device.init()?;
//!
//!     let mut configuration = device.get_configuration()?;
//!     configuration.set_address(0x0003);
//!     configuration.channel.value = 0x17;
//!     device.set_configuration(configuration, ProgramCommand::WritePersistent)?;
//!
//!     device.send_message(b"hello")?;
//!     Ok(configuration)
//! }
//! ```

mod fmt;

pub mod cipher;
pub mod commands;
pub mod device;
mod error;
pub mod registers;
mod settings;

#[cfg(test)]
mod mock;

pub use commands::*;
pub use device::{BytesAvailable, Device, NoAux, OperatingMode, Received};
pub use error::*;
pub use registers::*;
pub use settings::*;
