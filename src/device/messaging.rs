//! Over-the-air messaging
//!
//! Sends go out in transparent or fixed mode depending on how the module's
//! transmission mode register is set; the driver does not check which one is
//! active. A fixed-mode send needs the module configured for fixed
//! transmission, otherwise the address prefix is transmitted as payload.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};
use embedded_io::{Read, Write};

use super::{BytesAvailable, Device};
use crate::{encode_fixed_message, Error, FixedAddress, MAX_PACKET_SIZE};

/// Outcome of a successful receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Received {
    /// Payload bytes written to the caller's buffer
    pub len: usize,
    /// Signal strength byte appended by the module, when requested
    pub rssi: Option<u8>,
}

impl Received {
    const fn payload(len: usize) -> Self {
        Self { len, rssi: None }
    }
}

impl<S, M0, M1, AUX, D> Device<S, M0, M1, AUX, D>
where
    S: Read + Write + BytesAvailable,
    M0: OutputPin,
    M1: OutputPin,
    AUX: InputPin,
    D: DelayNs,
{
    /// Sends `payload` as is.
    ///
    /// An empty payload is a valid, empty send.
    ///
    /// # Errors
    /// * `Error::PacketTooBig` - more than 200 bytes; nothing is written
    /// * `Error::Timeout` - the module did not finish transmitting in time
    pub fn send_message(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.send_struct(payload)
    }

    /// Sends `payload` to one module in fixed transmission mode.
    ///
    /// # Errors
    /// * `Error::PacketTooBig` - more than 197 bytes; nothing is written
    /// * `Error::Timeout` - the module did not finish transmitting in time
    pub fn send_fixed_message(
        &mut self,
        address_high: u8,
        address_low: u8,
        channel: u8,
        payload: &[u8],
    ) -> Result<(), Error> {
        self.send_to(FixedAddress::new(address_high, address_low, channel), payload)
    }

    /// Sends `payload` to every module listening on `channel`.
    ///
    /// # Errors
    /// Same as [`send_fixed_message`](Self::send_fixed_message).
    pub fn send_broadcast_fixed_message(
        &mut self,
        channel: u8,
        payload: &[u8],
    ) -> Result<(), Error> {
        self.send_to(FixedAddress::broadcast(channel), payload)
    }

    fn send_to(&mut self, target: FixedAddress, payload: &[u8]) -> Result<(), Error> {
        let mut frame = [0u8; MAX_PACKET_SIZE];
        let len = match encode_fixed_message(target, payload, &mut frame) {
            Ok(len) => len,
            Err(error) => {
                warn!("fixed payload of {} bytes rejected: {}", payload.len(), error);
                return Err(error);
            }
        };
        self.send_struct(&frame[..len])
    }

    /// Receives exactly `buf.len()` bytes and discards whatever follows.
    ///
    /// # Errors
    /// * `Error::NoResponseFromDevice` - nothing arrived
    /// * `Error::DataSizeMismatch` - fewer bytes than `buf.len()` arrived
    pub fn receive_message(&mut self, buf: &mut [u8]) -> Result<Received, Error> {
        self.receive_struct(buf)?;
        self.clean_uart_buffer()?;
        Ok(Received::payload(buf.len()))
    }

    /// Receives exactly `buf.len()` payload bytes followed by the RSSI byte.
    ///
    /// The module only appends the RSSI byte when its transmission mode has
    /// RSSI enabled.
    pub fn receive_message_rssi(&mut self, buf: &mut [u8]) -> Result<Received, Error> {
        self.receive_message_complete(buf, true)
    }

    /// Receives exactly `buf.len()` payload bytes and, if `enable_rssi` is
    /// set, the RSSI byte after them.
    ///
    /// Bytes beyond these are left in the receive buffer.
    ///
    /// # Errors
    /// * `Error::NoResponseFromDevice` - nothing arrived
    /// * `Error::DataSizeMismatch` - the payload or the RSSI byte was cut
    ///   short
    pub fn receive_message_complete(
        &mut self,
        buf: &mut [u8],
        enable_rssi: bool,
    ) -> Result<Received, Error> {
        self.read_exact_timed(buf)?;

        let rssi = if enable_rssi {
            let mut rssi = [0u8; 1];
            self.read_exact_timed(&mut rssi)
                .map_err(|_| Error::DataSizeMismatch)?;
            Some(rssi[0])
        } else {
            None
        };

        let timing = self.settings.timing;
        let timeout = self.completion_timeout(timing.response_timeout_ms);
        self.wait_complete_response(timeout, timing.poll_interval_ms)?;

        Ok(Received {
            len: buf.len(),
            rssi,
        })
    }

    /// Receives everything the module delivers until the link goes quiet.
    ///
    /// Waits up to the serial timeout for the first byte, then keeps reading
    /// until no byte arrives for the quiescence window. With `enable_rssi`
    /// the last byte received is taken as the RSSI.
    ///
    /// # Errors
    /// * `Error::NoResponseFromDevice` - nothing arrived
    /// * `Error::BufferTooSmall` - more bytes arrived than `buf` holds; the
    ///   rest is drained and lost
    pub fn receive_message_all(
        &mut self,
        buf: &mut [u8],
        enable_rssi: bool,
    ) -> Result<Received, Error> {
        let timing = self.settings.timing;
        let Some((first, rest)) = buf.split_first_mut() else {
            return Err(Error::BufferTooSmall);
        };

        if self.read_with_timeout(core::slice::from_mut(first), timing.serial_timeout_ms)? == 0 {
            return Err(Error::NoResponseFromDevice);
        }
        let received = 1 + self.read_with_timeout(rest, timing.quiescence_ms)?;

        if received == buf.len() {
            let mut scratch = [0u8; 32];
            let mut overflow = 0;
            loop {
                let n = self.read_with_timeout(&mut scratch, timing.quiescence_ms)?;
                if n == 0 {
                    break;
                }
                overflow += n;
            }
            if overflow > 0 {
                warn!("{} bytes did not fit the receive buffer", overflow);
                return Err(Error::BufferTooSmall);
            }
        }

        if enable_rssi {
            let len = received - 1;
            Ok(Received {
                len,
                rssi: Some(buf[len]),
            })
        } else {
            Ok(Received::payload(received))
        }
    }

    /// Receives bytes until `delimiter` is seen, `buf` is full or the link
    /// goes quiet, and returns how many bytes were stored.
    ///
    /// The delimiter is consumed but not stored.
    ///
    /// # Errors
    /// * `Error::NoResponseFromDevice` - the link stayed quiet before
    ///   anything arrived
    pub fn receive_message_until(&mut self, delimiter: u8, buf: &mut [u8]) -> Result<usize, Error> {
        let timeout_ms = self.settings.timing.serial_timeout_ms;
        let mut len = 0;

        while len < buf.len() {
            let mut byte = [0u8; 1];
            if self.read_with_timeout(&mut byte, timeout_ms)? == 0 {
                if len == 0 {
                    return Err(Error::NoResponseFromDevice);
                }
                break;
            }
            if byte[0] == delimiter {
                break;
            }
            buf[len] = byte[0];
            len += 1;
        }

        Ok(len)
    }

    /// Receives exactly `buf.len()` bytes and nothing more.
    ///
    /// Unlike [`receive_message`](Self::receive_message) the rest of the
    /// message stays buffered, so a caller can read a header first and the
    /// remainder afterwards.
    pub fn receive_initial_message(&mut self, buf: &mut [u8]) -> Result<Received, Error> {
        self.read_exact_timed(buf)?;
        Ok(Received::payload(buf.len()))
    }

    /// Number of received bytes waiting to be read; never blocks.
    pub fn available(&mut self) -> Result<usize, Error> {
        self.serial.bytes_available().map_err(|_| Error::HardwareError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, AuxBehavior};

    fn ready_device() -> (mock::MockDevice, mock::Hardware) {
        let (mut device, hw) = mock::device(AuxBehavior::Ready);
        device.init().unwrap();
        (device, hw)
    }

    #[test]
    fn transparent_send_limit() {
        let (mut device, hw) = ready_device();

        assert_eq!(device.send_message(&[0xAA; 200]), Ok(()));
        assert_eq!(hw.serial.frames(), vec![vec![0xAA; 200]]);

        assert_eq!(device.send_message(&[0xAA; 201]), Err(Error::PacketTooBig));
        assert_eq!(hw.serial.frames().len(), 1);
    }

    #[test]
    fn fixed_send_limit() {
        let (mut device, hw) = ready_device();

        assert_eq!(device.send_fixed_message(0x00, 0x02, 0x17, &[0x55; 197]), Ok(()));
        let frames = hw.serial.frames();
        let frame = &frames[0];
        assert_eq!(frame.len(), 200);
        assert_eq!(&frame[..3], &[0x00, 0x02, 0x17]);

        assert_eq!(
            device.send_fixed_message(0x00, 0x02, 0x17, &[0x55; 198]),
            Err(Error::PacketTooBig)
        );
        assert_eq!(
            device.send_broadcast_fixed_message(0x17, &[0x55; 198]),
            Err(Error::PacketTooBig)
        );
        assert_eq!(hw.serial.frames().len(), 1);
    }

    #[test]
    fn broadcast_targets_every_address() {
        let (mut device, hw) = ready_device();

        device.send_broadcast_fixed_message(0x04, b"ping").unwrap();
        assert_eq!(hw.serial.frames()[0], vec![0xFF, 0xFF, 0x04, b'p', b'i', b'n', b'g']);
    }

    #[test]
    fn empty_payloads() {
        let (mut device, hw) = ready_device();

        assert_eq!(device.send_message(&[]), Ok(()));
        assert_eq!(device.send_fixed_message(0x12, 0x34, 0x05, &[]), Ok(()));
        assert_eq!(hw.serial.frames(), vec![vec![], vec![0x12, 0x34, 0x05]]);
    }

    #[test]
    fn refused_writes() {
        let (mut device, hw) = ready_device();

        hw.serial.limit_writes(0);
        assert_eq!(device.send_message(b"hi"), Err(Error::NoResponseFromDevice));

        hw.serial.limit_writes(1);
        assert_eq!(device.send_message(b"hi"), Err(Error::DataSizeMismatch));
    }

    #[test]
    fn send_waits_for_transmission() {
        let (mut device, hw) = ready_device();
        let before = hw.delay.elapsed_ms();

        hw.aux.set(AuxBehavior::NeverReady);
        assert_eq!(device.send_message(b"hi"), Err(Error::Timeout));

        let timing = device.settings().timing;
        assert_eq!(
            hw.delay.elapsed_ms() - before,
            u64::from(timing.transmit_timeout_ms)
        );
    }

    #[test]
    fn receive_complete_with_rssi() {
        let (mut device, hw) = ready_device();
        hw.serial.push_rx(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 0xB4]);

        let mut buf = [0u8; 10];
        assert_eq!(
            device.receive_message_complete(&mut buf, true),
            Ok(Received {
                len: 10,
                rssi: Some(0xB4),
            })
        );
        assert_eq!(buf, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(hw.serial.pending(), 0);
    }

    #[test]
    fn receive_complete_missing_rssi() {
        let (mut device, hw) = ready_device();
        hw.serial.push_rx(&[0; 10]);

        let mut buf = [0u8; 10];
        assert_eq!(
            device.receive_message_rssi(&mut buf),
            Err(Error::DataSizeMismatch)
        );
    }

    #[test]
    fn receive_exact_discards_trailing_bytes() {
        let (mut device, hw) = ready_device();
        hw.serial.push_rx(b"hello world");

        let mut buf = [0u8; 5];
        assert_eq!(device.receive_message(&mut buf), Ok(Received::payload(5)));
        assert_eq!(&buf, b"hello");
        assert_eq!(hw.serial.pending(), 0);
    }

    #[test]
    fn receive_exact_short_reads() {
        let (mut device, hw) = ready_device();

        let mut buf = [0u8; 5];
        assert_eq!(device.receive_message(&mut buf), Err(Error::NoResponseFromDevice));

        hw.serial.push_rx(b"hel");
        assert_eq!(device.receive_message(&mut buf), Err(Error::DataSizeMismatch));
    }

    #[test]
    fn receive_initial_leaves_the_rest() {
        let (mut device, hw) = ready_device();
        hw.serial.push_rx(&[0x00, 0x03, 0x17, b'o', b'k']);

        let mut head = [0u8; 3];
        assert_eq!(device.receive_initial_message(&mut head), Ok(Received::payload(3)));
        assert_eq!(head, [0x00, 0x03, 0x17]);
        assert_eq!(device.available(), Ok(2));
    }

    #[test]
    fn receive_until_delimiter() {
        let (mut device, hw) = ready_device();
        hw.serial.push_rx(b"hello\nworld");

        let mut buf = [0u8; 32];
        assert_eq!(device.receive_message_until(b'\n', &mut buf), Ok(5));
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(hw.serial.pending(), 5);

        assert_eq!(device.receive_message_until(b'\n', &mut buf), Ok(5));
        assert_eq!(&buf[..5], b"world");

        assert_eq!(
            device.receive_message_until(b'\n', &mut buf),
            Err(Error::NoResponseFromDevice)
        );
    }

    #[test]
    fn receive_until_stops_when_full() {
        let (mut device, hw) = ready_device();
        hw.serial.push_rx(b"abcdef");

        let mut buf = [0u8; 4];
        assert_eq!(device.receive_message_until(b'\n', &mut buf), Ok(4));
        assert_eq!(&buf, b"abcd");
        assert_eq!(hw.serial.pending(), 2);
    }

    #[test]
    fn receive_all_until_quiet() {
        let (mut device, hw) = ready_device();
        hw.serial.push_rx(&[1, 2, 3, 4, 5, 0xC8]);

        let mut buf = [0u8; 16];
        assert_eq!(
            device.receive_message_all(&mut buf, true),
            Ok(Received {
                len: 5,
                rssi: Some(0xC8),
            })
        );
        assert_eq!(&buf[..5], &[1, 2, 3, 4, 5]);

        hw.serial.push_rx(&[9, 8, 7]);
        assert_eq!(device.receive_message_all(&mut buf, false), Ok(Received::payload(3)));
    }

    #[test]
    fn receive_all_overflow() {
        let (mut device, hw) = ready_device();
        hw.serial.push_rx(&[0x11; 20]);

        let mut buf = [0u8; 8];
        assert_eq!(
            device.receive_message_all(&mut buf, false),
            Err(Error::BufferTooSmall)
        );
        assert_eq!(hw.serial.pending(), 0);

        let mut exact = [0u8; 4];
        hw.serial.push_rx(&[0x22; 4]);
        assert_eq!(device.receive_message_all(&mut exact, false), Ok(Received::payload(4)));
    }

    #[test]
    fn receive_all_nothing() {
        let (mut device, _) = ready_device();
        let mut buf = [0u8; 8];
        assert_eq!(
            device.receive_message_all(&mut buf, false),
            Err(Error::NoResponseFromDevice)
        );
    }
}
