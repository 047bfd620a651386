//! Serial transport
//!
//! Low level helpers shared by messaging and configuration: draining stale
//! input, writing whole frames, timed exact reads and the validated register
//! exchange.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};
use embedded_io::{Read, Write};

use super::{BytesAvailable, Device};
use crate::{
    encode_frame, Error, FrameHeader, ProgramCommand, RegisterAddress, HEADER_LEN, MAX_FRAME_LEN,
    MAX_PACKET_SIZE,
};

impl<S, M0, M1, AUX, D> Device<S, M0, M1, AUX, D>
where
    S: Read + Write + BytesAvailable,
    M0: OutputPin,
    M1: OutputPin,
    AUX: InputPin,
    D: DelayNs,
{
    /// Discards everything waiting in the receive buffer
    pub(crate) fn clean_uart_buffer(&mut self) -> Result<usize, Error> {
        let mut scratch = [0u8; 32];
        let mut discarded = 0;
        loop {
            let available = self.serial.bytes_available().map_err(|_| Error::HardwareError)?;
            if available == 0 {
                break;
            }
            let chunk = available.min(scratch.len());
            let n = self
                .serial
                .read(&mut scratch[..chunk])
                .map_err(|_| Error::HardwareError)?;
            if n == 0 {
                break;
            }
            discarded += n;
        }
        if discarded > 0 {
            trace!("discarded {} stale bytes", discarded);
        }
        Ok(discarded)
    }

    /// Writes all of `bytes` and flushes the link
    pub(crate) fn write_frame(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let mut written = 0;
        while written < bytes.len() {
            match self.serial.write(&bytes[written..]) {
                Ok(0) if written == 0 => return Err(Error::NoResponseFromDevice),
                Ok(0) => return Err(Error::DataSizeMismatch),
                Ok(n) => written += n,
                Err(_) => return Err(Error::HardwareError),
            }
        }
        self.serial.flush().map_err(|_| Error::HardwareError)
    }

    /// Writes a frame for transmission and waits for the module to send it
    ///
    /// # Errors
    /// * `Error::PacketTooBig` - more than 200 bytes; nothing is written
    pub(crate) fn send_struct(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > MAX_PACKET_SIZE {
            warn!("packet of {} bytes exceeds {}", bytes.len(), MAX_PACKET_SIZE);
            return Err(Error::PacketTooBig);
        }
        self.write_frame(bytes)?;

        let timing = self.settings.timing;
        let timeout = self.completion_timeout(timing.transmit_timeout_ms);
        self.wait_complete_response(timeout, timing.poll_interval_ms)
    }

    /// Fills `buf` from the link, waiting up to `timeout_ms` for each byte
    ///
    /// Returns how many bytes were read, which is less than `buf.len()` only
    /// if the link went quiet.
    pub(crate) fn read_with_timeout(
        &mut self,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<usize, Error> {
        let poll_interval_ms = self.settings.timing.poll_interval_ms.max(1);
        let mut filled = 0;
        let mut waited_ms = 0;

        while filled < buf.len() {
            let available = self.serial.bytes_available().map_err(|_| Error::HardwareError)?;
            if available > 0 {
                let end = buf.len().min(filled + available);
                let n = self
                    .serial
                    .read(&mut buf[filled..end])
                    .map_err(|_| Error::HardwareError)?;
                if n > 0 {
                    filled += n;
                    waited_ms = 0;
                    continue;
                }
            }
            if waited_ms >= timeout_ms {
                break;
            }
            self.delay.delay_ms(poll_interval_ms);
            waited_ms += poll_interval_ms;
        }

        Ok(filled)
    }

    /// Reads exactly `buf.len()` bytes, then waits for the module to settle
    ///
    /// # Errors
    /// * `Error::NoResponseFromDevice` - nothing arrived
    /// * `Error::DataSizeMismatch` - fewer bytes than expected arrived
    pub(crate) fn receive_struct(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.read_exact_timed(buf)?;

        let timing = self.settings.timing;
        let timeout = self.completion_timeout(timing.response_timeout_ms);
        self.wait_complete_response(timeout, timing.poll_interval_ms)
    }

    /// Reads exactly `buf.len()` bytes with the serial timeout and nothing
    /// else
    pub(crate) fn read_exact_timed(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let read = self.read_with_timeout(buf, self.settings.timing.serial_timeout_ms)?;
        match read {
            n if n == buf.len() => Ok(()),
            0 => Err(Error::NoResponseFromDevice),
            n => {
                debug!("expected {} bytes, got {}", buf.len(), n);
                Err(Error::DataSizeMismatch)
            }
        }
    }

    /// Reads a configuration response for `address` into `payload`
    ///
    /// The header is read and checked on its own first, so a rejected request
    /// (`[0xFF, 0xFF, 0xFF]`) is reported as such rather than as a short read.
    /// Nothing is written to `payload` unless the header matches.
    fn receive_frame(
        &mut self,
        address: RegisterAddress,
        command_mismatch: Error,
        payload: &mut [u8],
    ) -> Result<(), Error> {
        let mut head = [0u8; HEADER_LEN];
        self.read_exact_timed(&mut head)?;

        let header = FrameHeader::from_bytes(head);
        if let Err(error) = header.validate_response(address, command_mismatch) {
            warn!(
                "unexpected response header {:x} for register {}",
                head, address
            );
            self.clean_uart_buffer()?;
            return Err(error);
        }

        let mut received = [0u8; MAX_FRAME_LEN - HEADER_LEN];
        let received = received
            .get_mut(..payload.len())
            .ok_or(Error::BufferTooSmall)?;
        match self.receive_struct(received) {
            Ok(()) => {}
            Err(Error::NoResponseFromDevice) => return Err(Error::DataSizeMismatch),
            Err(error) => return Err(error),
        }
        payload.copy_from_slice(received);
        Ok(())
    }

    /// Reads the register window at `address` into `out`
    ///
    /// `out` must be exactly the window's length.
    pub(crate) fn read_window(
        &mut self,
        address: RegisterAddress,
        out: &mut [u8],
    ) -> Result<(), Error> {
        if out.len() != address.packet_length().get() {
            return Err(Error::DataSizeMismatch);
        }
        self.clean_uart_buffer()?;

        let request = FrameHeader::request(ProgramCommand::ReadConfiguration, address);
        trace!("read register {}", address);
        self.write_frame(&request.to_bytes())?;

        self.receive_frame(address, Error::HeadNotRecognized, out)
    }

    /// Writes `payload` to the register window at `address` with `command`
    ///
    /// The module answers a write with the register contents it now holds;
    /// those are returned in `echo`.
    pub(crate) fn write_window(
        &mut self,
        address: RegisterAddress,
        command: ProgramCommand,
        payload: &[u8],
        echo: &mut [u8],
    ) -> Result<(), Error> {
        if !command.is_write() || !address.is_writable() {
            return Err(Error::InvalidParameter);
        }
        if echo.len() != payload.len() {
            return Err(Error::DataSizeMismatch);
        }

        let mut frame = [0u8; MAX_FRAME_LEN];
        let len = encode_frame(FrameHeader::request(command, address), payload, &mut frame)?;

        self.clean_uart_buffer()?;
        trace!("write register {} with {}", address, command);
        self.write_frame(&frame[..len])?;

        self.receive_frame(address, Error::WrongFormat, echo)
    }
}
