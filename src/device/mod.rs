//! E220 Device Interface
//!
//! This module provides the driver for an E220 module attached over a UART,
//! with its M0/M1 mode select lines and, optionally, its AUX status line.
//!
//! The interface is built around the `Device<S, M0, M1, AUX, D>` struct which
//! owns the serial link, the pins and a delay provider, and provides methods
//! for:
//! - Switching the module's operating mode
//! - Sending and receiving over-the-air messages
//! - Reading and writing the configuration registers
//! - Reconfiguring a remote module over the air
//!
//! Every operation blocks until it completes or its timeout expires. The
//! driver never retries; a failed exchange is reported to the caller as is.
//!
//! # Example
//! ```ignore
//! use e220::{Device, OperatingMode};
//!
//! let mut device = Device::new(uart, m0, m1, aux, delay);
//! device.init()?;
//!
//! device.send_message(b"hello")?;
//!
//! let config = device.get_configuration()?;
//! ```

mod configuration;
mod messaging;
mod mode;
mod transport;

pub use messaging::Received;
pub use mode::OperatingMode;

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};

use crate::{Settings, UartBaudRate};

/// Serial links that can report how many received bytes are buffered
///
/// Reads are only issued for bytes that are already buffered, so the
/// blocking `embedded_io::Read::read` never blocks inside the driver.
pub trait BytesAvailable: embedded_io::ErrorType {
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;
}

/// Placeholder for a module whose AUX line is not wired
///
/// Without AUX the driver waits fixed delays instead of watching the
/// module's busy state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAux;

impl ErrorType for NoAux {
    type Error = Infallible;
}

impl InputPin for NoAux {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

/// Main device interface for the E220 module.
///
/// The driver is the only owner of the UART and the pins. It is not meant to
/// be shared between threads; callers that need to must serialise access to
/// it themselves.
pub struct Device<S, M0, M1, AUX, D> {
    serial: S,
    m0: M0,
    m1: M1,
    aux: Option<AUX>,
    delay: D,
    settings: Settings,
    mode: OperatingMode,
}

impl<S, M0, M1, AUX, D> Device<S, M0, M1, AUX, D> {
    /// Creates a driver for a module with its AUX line wired
    ///
    /// The module's mode is unknown until [`init`](Device::init) or
    /// [`set_mode`](Device::set_mode) succeeds.
    pub fn new(serial: S, m0: M0, m1: M1, aux: AUX, delay: D) -> Self {
        Self::with_settings(serial, m0, m1, Some(aux), delay, Settings::default())
    }

    /// Creates a driver with explicit settings; `aux` may be `None`
    pub fn with_settings(
        serial: S,
        m0: M0,
        m1: M1,
        aux: Option<AUX>,
        delay: D,
        settings: Settings,
    ) -> Self {
        Self {
            serial,
            m0,
            m1,
            aux,
            delay,
            settings,
            mode: OperatingMode::Uninitialized,
        }
    }

    /// Releases the underlying peripherals.
    pub fn release(self) -> (S, M0, M1, Option<AUX>, D) {
        (self.serial, self.m0, self.m1, self.aux, self.delay)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Records the speed the host UART was reopened at
    ///
    /// Configuration mode is refused unless this is 9600 bps.
    pub fn set_uart_baud_rate(&mut self, baud_rate: UartBaudRate) {
        self.settings.uart_baud_rate = baud_rate;
    }

    pub fn has_aux(&self) -> bool {
        self.aux.is_some()
    }
}

impl<S, M0, M1, D> Device<S, M0, M1, NoAux, D> {
    /// Creates a driver for a module without an AUX line
    pub fn without_aux(serial: S, m0: M0, m1: M1, delay: D) -> Self {
        Self::with_settings(serial, m0, m1, None, delay, Settings::default())
    }
}
