//! Driver settings
//!
//! Host-side knobs that are not stored in the module: the speed the host UART
//! currently runs at, the frequency band of the module variant, and every
//! delay and timeout the driver waits on.

use crate::UartBaudRate;

/// Frequency band of the module variant
///
/// Selects the base frequency the channel register is added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrequencyBand {
    /// 220 - 251 MHz
    Band230,
    /// 410 - 441 MHz
    Band400,
    /// 410 - 441 MHz
    #[default]
    Band433,
    /// 850 - 881 MHz
    Band868,
    /// 850 - 881 MHz
    Band900,
    /// 900 - 931 MHz
    Band915,
}

impl FrequencyBand {
    pub const fn base_frequency_mhz(self) -> u16 {
        match self {
            Self::Band230 => 220,
            Self::Band400 | Self::Band433 => 410,
            Self::Band868 | Self::Band900 => 850,
            Self::Band915 => 900,
        }
    }
}

/// Delays and timeouts, all in milliseconds
///
/// Timeouts are measured as the sum of the delays the driver requests from its
/// delay provider, so they are as accurate as that provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Pause before and after driving M0/M1
    pub mode_switch_delay_ms: u32,
    /// How long AUX may stay busy after a mode change or a configuration
    /// request
    pub response_timeout_ms: u32,
    /// How long AUX may stay busy after writing a frame to the module
    pub transmit_timeout_ms: u32,
    /// Fixed wait used in place of AUX when it is not wired
    pub no_aux_delay_ms: u32,
    /// Extra pause after AUX reports ready before the module accepts input
    pub ready_guard_ms: u32,
    /// Interval between AUX and receive buffer polls
    pub poll_interval_ms: u32,
    /// How long a read waits for the next byte; restarts on every byte
    pub serial_timeout_ms: u32,
    /// Silence that ends a read of everything the module has buffered
    pub quiescence_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            mode_switch_delay_ms: 40,
            response_timeout_ms: 1000,
            transmit_timeout_ms: 5000,
            no_aux_delay_ms: 100,
            ready_guard_ms: 20,
            poll_interval_ms: 1,
            serial_timeout_ms: 500,
            quiescence_ms: 20,
        }
    }
}

/// Host-side driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Speed the host UART is currently opened at
    pub uart_baud_rate: UartBaudRate,
    pub frequency_band: FrequencyBand,
    pub timing: Timing,
}
