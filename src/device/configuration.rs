//! Configuration memory access
//!
//! Every operation here needs the module in configuration mode. A driver in
//! another known mode switches there for the exchange and back afterwards; a
//! driver that has never set a mode refuses with `Error::NotInitialized`,
//! since it cannot know which mode to return to.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};
use embedded_io::{Read, Write};
use regiface::{ByteArray, ReadableRegister, ToByteArray, WritableRegister};

use super::{BytesAvailable, Device, OperatingMode};
use crate::{
    cipher::{ConfigurationCipher, Plain},
    encode_fixed_message, Configuration, ConfigurationMessage, Error, FixedAddress,
    ModuleInformation, ProgramCommand, RegisterAddress, RegisterValue, MAX_PACKET_SIZE,
    MAX_REGISTER_LEN,
};

impl<S, M0, M1, AUX, D> Device<S, M0, M1, AUX, D>
where
    S: Read + Write + BytesAvailable,
    M0: OutputPin,
    M1: OutputPin,
    AUX: InputPin,
    D: DelayNs,
{
    /// Runs `f` with the module in configuration mode, then restores the
    /// previous mode.
    ///
    /// An error from `f` takes precedence over an error while restoring.
    fn with_configuration_mode<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let previous = self.mode;
        match previous {
            OperatingMode::Uninitialized => return Err(Error::NotInitialized),
            OperatingMode::Configuration => return f(self),
            _ => {}
        }

        self.set_mode(OperatingMode::Configuration)?;
        let result = f(self);
        let restored = self.set_mode(previous);

        let value = result?;
        restored?;
        Ok(value)
    }

    /// Reads a register value from the module.
    ///
    /// # Type Parameters
    /// * `R` - Register type whose id is its configuration memory address
    ///
    /// # Errors
    /// * `Error::NotInitialized` - no mode has been set yet
    /// * `Error::InvalidParameter` - `R` is not at a known register address
    /// * `Error::HeadNotRecognized` - the response does not echo the request
    /// * `Error::WrongFormat` - the module rejected the request
    pub fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let address = RegisterAddress::try_from(R::id()).map_err(|_| Error::InvalidParameter)?;

        let mut raw_value = R::Array::new();
        self.with_configuration_mode(|device| device.read_window(address, raw_value.as_mut()))?;

        R::from_bytes(raw_value).map_err(|_| Error::DataSizeMismatch)
    }

    /// Writes a register value to the module.
    ///
    /// `command` selects whether the value survives a power cycle.
    ///
    /// # Errors
    /// * `Error::InvalidParameter` - `command` is not a write, or `R` is
    ///   read-only
    /// * `Error::WrongFormat` - the module rejected the write or acknowledged
    ///   it with an unexpected command
    /// * `Error::HeadNotRecognized` - the acknowledgment is for another
    ///   register
    pub fn write_register<R>(&mut self, register: R, command: ProgramCommand) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8>,
    {
        let address = RegisterAddress::try_from(R::id()).map_err(|_| Error::InvalidParameter)?;
        let raw_value = register.to_bytes().map_err(|_| Error::InvalidParameter)?;

        self.write_window_in_configuration_mode(address, command, raw_value.as_ref())
    }

    /// Reads the register at `address`, chosen at run time.
    pub fn read_register_value(
        &mut self,
        address: RegisterAddress,
    ) -> Result<RegisterValue, Error> {
        let mut raw_value = [0u8; MAX_REGISTER_LEN];
        let raw_value = &mut raw_value[..address.packet_length().get()];
        self.with_configuration_mode(|device| device.read_window(address, raw_value))?;

        RegisterValue::decode(address, raw_value)
    }

    /// Writes `value` to the register it belongs to.
    pub fn write_register_value(
        &mut self,
        value: RegisterValue,
        command: ProgramCommand,
    ) -> Result<(), Error> {
        let mut raw_value = [0u8; MAX_REGISTER_LEN];
        let len = value.encode(&mut raw_value)?;

        self.write_window_in_configuration_mode(value.address(), command, &raw_value[..len])
    }

    fn write_window_in_configuration_mode(
        &mut self,
        address: RegisterAddress,
        command: ProgramCommand,
        payload: &[u8],
    ) -> Result<(), Error> {
        if !command.is_write() || !address.is_writable() {
            return Err(Error::InvalidParameter);
        }

        let mut echo = [0u8; MAX_REGISTER_LEN];
        let echo = &mut echo[..payload.len()];
        self.with_configuration_mode(|device| device.write_window(address, command, payload, echo))
    }

    /// Reads the whole configuration block.
    pub fn get_configuration(&mut self) -> Result<Configuration, Error> {
        self.read_register()
    }

    /// Writes the whole configuration block.
    ///
    /// `save` is [`ProgramCommand::WritePersistent`] to keep the block across
    /// power cycles or [`ProgramCommand::WriteVolatile`] to lose it.
    ///
    /// A new UART speed or parity takes effect when the module leaves
    /// configuration mode; update the host side with
    /// [`set_uart_baud_rate`](Self::set_uart_baud_rate) to match.
    pub fn set_configuration(
        &mut self,
        configuration: Configuration,
        save: ProgramCommand,
    ) -> Result<(), Error> {
        self.write_register(configuration, save)
    }

    /// Reads the module's model, firmware version and feature byte.
    pub fn get_module_information(&mut self) -> Result<ModuleInformation, Error> {
        self.read_register()
    }

    /// Restarts the module.
    ///
    /// The E220 has no program command for a software reset, so this always
    /// fails without touching the link or the mode pins. Power cycle the
    /// module instead.
    pub fn reset_module(&mut self) -> Result<(), Error> {
        warn!("software reset is not supported by the module");
        Err(Error::NotImplemented)
    }

    /// Pushes `configuration` over the air to the module at
    /// `address_high`/`address_low` on `channel`.
    ///
    /// The local module must be in normal or WOR transmitter mode with fixed
    /// transmission enabled. No acknowledgment is awaited: the local module's
    /// AUX line says nothing about the remote one.
    ///
    /// # Errors
    /// * `Error::InvalidParameter` - `command` is not a write
    pub fn send_configuration_message(
        &mut self,
        address_high: u8,
        address_low: u8,
        channel: u8,
        configuration: Configuration,
        command: ProgramCommand,
    ) -> Result<(), Error> {
        self.send_configuration_message_with(
            address_high,
            address_low,
            channel,
            configuration,
            command,
            &Plain,
        )
    }

    /// [`send_configuration_message`](Self::send_configuration_message) with
    /// the register block passed through `cipher`.
    pub fn send_configuration_message_with(
        &mut self,
        address_high: u8,
        address_low: u8,
        channel: u8,
        configuration: Configuration,
        command: ProgramCommand,
        cipher: &impl ConfigurationCipher,
    ) -> Result<(), Error> {
        if !command.is_write() {
            return Err(Error::InvalidParameter);
        }

        let message = ConfigurationMessage {
            command,
            configuration,
        }
        .encode(cipher);

        let mut frame = [0u8; MAX_PACKET_SIZE];
        let target = FixedAddress::new(address_high, address_low, channel);
        let len = encode_fixed_message(target, &message, &mut frame)?;

        debug!("configuration message to {:x}", target.to_bytes());
        self.write_frame(&frame[..len])
    }
}
