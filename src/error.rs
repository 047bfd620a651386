//! Driver status codes
//!
//! Every exchange with the module ends in exactly one outcome from a closed
//! set. Failures are carried as [`Error`] inside a `Result`; [`Status`] is the
//! same taxonomy including success, for callers that want to store or report
//! an outcome as a plain value.
//!
//! None of these outcomes are retried by the driver. A [`Error::Timeout`]
//! returned from a mode change means the M0/M1 lines were already driven and
//! the module may be in the new mode or the old one.

use thiserror::Error;

/// Failure outcome of a driver operation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[error("Unknown")]
    Unknown,

    #[error("Not support!")]
    NotSupported,

    #[error("Not implement")]
    NotImplemented,

    /// The driver has not driven the module into a known mode yet
    #[error("Not initial!")]
    NotInitialized,

    #[error("Invalid param!")]
    InvalidParameter,

    /// Fewer (or more) bytes than the layout requires were read or written
    #[error("Data size not match!")]
    DataSizeMismatch,

    #[error("Buff too small!")]
    BufferTooSmall,

    /// AUX never reported ready within the allotted time
    #[error("Timeout!!")]
    Timeout,

    /// A pin or the serial link reported an error
    #[error("Hardware error!")]
    HardwareError,

    /// The response header did not echo the expected command, address or length
    #[error("Save mode returned not recognized!")]
    HeadNotRecognized,

    #[error("No response from device! (Check wiring)")]
    NoResponseFromDevice,

    /// Configuration mode was requested while the link is not at 9600 bps
    #[error("Wrong UART configuration! (BPS must be 9600 for configuration)")]
    WrongUartConfig,

    /// The module answered with its wrong-format sentinel
    #[error("Wrong format!")]
    WrongFormat,

    #[error("The device support only 200byte of data transmission!")]
    PacketTooBig,
}

impl Error {
    /// Numeric status code, in the numbering used by the module's vendor tooling
    pub const fn code(self) -> u8 {
        match self {
            Self::Unknown => 2,
            Self::NotSupported => 3,
            Self::NotImplemented => 4,
            Self::NotInitialized => 5,
            Self::InvalidParameter => 6,
            Self::DataSizeMismatch => 7,
            Self::BufferTooSmall => 8,
            Self::Timeout => 9,
            Self::HardwareError => 10,
            Self::HeadNotRecognized => 11,
            Self::NoResponseFromDevice => 12,
            Self::WrongUartConfig => 13,
            Self::WrongFormat => 14,
            Self::PacketTooBig => 15,
        }
    }
}

/// Outcome of a driver operation, success included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Success,
    Failed(Error),
}

impl Status {
    /// Numeric status code. Success is 1.
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 1,
            Self::Failed(error) => error.code(),
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Human readable description of the outcome
    pub fn description(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failed(error) => error.description(),
        }
    }
}

impl Error {
    /// Human readable description, identical to the `Display` output
    pub fn description(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::NotSupported => "Not support!",
            Self::NotImplemented => "Not implement",
            Self::NotInitialized => "Not initial!",
            Self::InvalidParameter => "Invalid param!",
            Self::DataSizeMismatch => "Data size not match!",
            Self::BufferTooSmall => "Buff too small!",
            Self::Timeout => "Timeout!!",
            Self::HardwareError => "Hardware error!",
            Self::HeadNotRecognized => "Save mode returned not recognized!",
            Self::NoResponseFromDevice => "No response from device! (Check wiring)",
            Self::WrongUartConfig => {
                "Wrong UART configuration! (BPS must be 9600 for configuration)"
            }
            Self::WrongFormat => "Wrong format!",
            Self::PacketTooBig => "The device support only 200byte of data transmission!",
        }
    }
}

impl<T> From<Result<T, Error>> for Status {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(error) => Self::Failed(error),
        }
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        Self::Failed(error)
    }
}
