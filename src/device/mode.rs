//! Operating mode control
//!
//! The module's mode is selected by two lines:
//!
//! | M0 | M1 | mode                   |
//! |----|----|------------------------|
//! | 0  | 0  | normal                 |
//! | 1  | 0  | WOR transmitter        |
//! | 0  | 1  | WOR receiver           |
//! | 1  | 1  | configuration / sleep  |
//!
//! After the lines change the module drops AUX while it switches and raises
//! it again once the new mode is active.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin, PinState},
};

use super::Device;
use crate::{Error, UartBaudRate};

/// Operating mode of the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Transparent or fixed transmission, receiver always on
    Normal,
    /// Transmits with a wake-up preamble long enough to reach WOR receivers
    WorTransmitter,
    /// Receiver wakes up once per WOR period
    WorReceiver,
    /// Accepts configuration frames; radio off
    Configuration,
    /// No mode has been set by this driver yet
    Uninitialized,
}

impl OperatingMode {
    /// M0/M1 levels selecting this mode
    pub const fn pin_levels(self) -> Option<(bool, bool)> {
        match self {
            Self::Normal => Some((false, false)),
            Self::WorTransmitter => Some((true, false)),
            Self::WorReceiver => Some((false, true)),
            Self::Configuration => Some((true, true)),
            Self::Uninitialized => None,
        }
    }
}

impl<S, M0, M1, AUX, D> Device<S, M0, M1, AUX, D>
where
    M0: OutputPin,
    M1: OutputPin,
    AUX: InputPin,
    D: DelayNs,
{
    /// Puts the module in normal mode.
    pub fn init(&mut self) -> Result<(), Error> {
        self.set_mode(OperatingMode::Normal)
    }

    /// Switches the module to `target`.
    ///
    /// # Errors
    /// * `Error::InvalidParameter` - `target` is `Uninitialized`
    /// * `Error::WrongUartConfig` - configuration mode requested while the
    ///   host UART is not at 9600 bps; no line is touched
    /// * `Error::HardwareError` - driving M0/M1 or reading AUX failed
    /// * `Error::Timeout` - AUX did not report ready in time. The lines were
    ///   already driven, so the module may be in either mode; the recorded
    ///   mode is left unchanged
    pub fn set_mode(&mut self, target: OperatingMode) -> Result<(), Error> {
        let (m0, m1) = target.pin_levels().ok_or(Error::InvalidParameter)?;

        if target == OperatingMode::Configuration
            && self.settings.uart_baud_rate != UartBaudRate::CONFIGURATION
        {
            warn!(
                "configuration mode needs 9600 bps, link is at {}",
                self.settings.uart_baud_rate.bps()
            );
            return Err(Error::WrongUartConfig);
        }

        let timing = self.settings.timing;
        self.delay.delay_ms(timing.mode_switch_delay_ms);

        self.m0
            .set_state(PinState::from(m0))
            .map_err(|_| Error::HardwareError)?;
        self.m1
            .set_state(PinState::from(m1))
            .map_err(|_| Error::HardwareError)?;

        self.delay.delay_ms(timing.mode_switch_delay_ms);

        let timeout = self.completion_timeout(timing.response_timeout_ms);
        if let Err(error) = self.wait_complete_response(timeout, timing.poll_interval_ms) {
            warn!("mode change to {} did not settle: {}", target, error);
            return Err(error);
        }

        debug!("mode {} -> {}", self.mode, target);
        self.mode = target;
        Ok(())
    }

    /// Last mode successfully set by this driver.
    ///
    /// This is not read back from the module.
    pub fn get_mode(&self) -> OperatingMode {
        self.mode
    }

    /// Waits for the module to finish what it is doing.
    ///
    /// With AUX wired, polls it every `poll_interval_ms` until it reads high
    /// or `timeout_ms` has passed. Without AUX, sleeps `timeout_ms`. Either
    /// way a short guard delay follows before the module is used again.
    ///
    /// # Errors
    /// * `Error::Timeout` - AUX stayed low for `timeout_ms`
    /// * `Error::HardwareError` - reading AUX failed
    pub fn wait_complete_response(
        &mut self,
        timeout_ms: u32,
        poll_interval_ms: u32,
    ) -> Result<(), Error> {
        let poll_interval_ms = poll_interval_ms.max(1);

        match self.aux.as_mut() {
            Some(aux) => {
                let mut waited_ms = 0;
                while !aux.is_high().map_err(|_| Error::HardwareError)? {
                    if waited_ms >= timeout_ms {
                        return Err(Error::Timeout);
                    }
                    self.delay.delay_ms(poll_interval_ms);
                    waited_ms += poll_interval_ms;
                }
            }
            None => self.delay.delay_ms(timeout_ms),
        }

        self.delay.delay_ms(self.settings.timing.ready_guard_ms);
        Ok(())
    }

    /// Timeout to hand to [`wait_complete_response`](Self::wait_complete_response):
    /// `aux_timeout_ms` with AUX wired, the fixed no-AUX delay otherwise
    pub(crate) fn completion_timeout(&self, aux_timeout_ms: u32) -> u32 {
        if self.aux.is_some() {
            aux_timeout_ms
        } else {
            self.settings.timing.no_aux_delay_ms
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, AuxBehavior};

    const ALL_MODES: [OperatingMode; 4] = [
        OperatingMode::Normal,
        OperatingMode::WorTransmitter,
        OperatingMode::WorReceiver,
        OperatingMode::Configuration,
    ];

    #[test]
    fn starts_uninitialized() {
        let (device, _) = mock::device(AuxBehavior::Ready);
        assert_eq!(device.get_mode(), OperatingMode::Uninitialized);
    }

    #[test]
    fn init_selects_normal() {
        let (mut device, hw) = mock::device(AuxBehavior::Ready);
        assert_eq!(device.init(), Ok(()));
        assert_eq!(device.get_mode(), OperatingMode::Normal);
        assert_eq!(hw.m0.level(), Some(false));
        assert_eq!(hw.m1.level(), Some(false));
    }

    #[test]
    fn every_transition_succeeds_when_aux_is_ready() {
        for from in ALL_MODES {
            for to in ALL_MODES {
                let (mut device, hw) = mock::device(AuxBehavior::Ready);
                device.set_mode(from).unwrap();
                assert_eq!(device.set_mode(to), Ok(()));
                assert_eq!(device.get_mode(), to);

                let (m0, m1) = to.pin_levels().unwrap();
                assert_eq!(hw.m0.level(), Some(m0));
                assert_eq!(hw.m1.level(), Some(m1));
            }
        }
    }

    #[test]
    fn every_transition_times_out_when_aux_never_rises() {
        for from in ALL_MODES {
            for to in ALL_MODES {
                let (mut device, hw) = mock::device(AuxBehavior::Ready);
                device.set_mode(from).unwrap();

                hw.aux.set(AuxBehavior::NeverReady);
                assert_eq!(device.set_mode(to), Err(Error::Timeout));
                assert_eq!(device.get_mode(), from);
            }
        }
    }

    #[test]
    fn timeout_is_bounded_by_response_timeout() {
        let (mut device, hw) = mock::device(AuxBehavior::NeverReady);
        assert_eq!(device.set_mode(OperatingMode::Normal), Err(Error::Timeout));

        let timing = device.settings().timing;
        let expected = 2 * timing.mode_switch_delay_ms + timing.response_timeout_ms;
        assert_eq!(hw.delay.elapsed_ms(), u64::from(expected));
    }

    #[test]
    fn slow_aux_is_waited_for() {
        let (mut device, hw) = mock::device(AuxBehavior::ReadyAfter(30));
        assert_eq!(device.set_mode(OperatingMode::WorReceiver), Ok(()));
        assert_eq!(hw.aux.polls(), 31);
    }

    #[test]
    fn configuration_requires_9600() {
        let (mut device, hw) = mock::device(AuxBehavior::Ready);
        device.set_uart_baud_rate(UartBaudRate::Bps115200);

        assert_eq!(
            device.set_mode(OperatingMode::Configuration),
            Err(Error::WrongUartConfig)
        );
        assert_eq!(hw.m0.level(), None);
        assert_eq!(hw.m1.level(), None);
        assert_eq!(hw.delay.elapsed_ms(), 0);
        assert_eq!(device.get_mode(), OperatingMode::Uninitialized);

        assert_eq!(device.set_mode(OperatingMode::Normal), Ok(()));
    }

    #[test]
    fn uninitialized_is_not_a_target() {
        let (mut device, _) = mock::device(AuxBehavior::Ready);
        assert_eq!(
            device.set_mode(OperatingMode::Uninitialized),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn without_aux_waits_fixed_delay() {
        let (mut device, hw) = mock::device_without_aux();
        assert_eq!(device.set_mode(OperatingMode::Configuration), Ok(()));

        let timing = device.settings().timing;
        let expected =
            2 * timing.mode_switch_delay_ms + timing.no_aux_delay_ms + timing.ready_guard_ms;
        assert_eq!(hw.delay.elapsed_ms(), u64::from(expected));
    }
}
