//! Wire commands
//!
//! The module speaks two framings on the same UART, selected by its
//! operating mode:
//!
//! - Program frames: configuration mode only. Register reads and writes framed
//!   as `[command][address][length][payload]`, answered by the module with
//!   an echo of the header and the register contents.
//! - Messages: normal and WOR modes. Payload bytes are transmitted over
//!   the air, optionally behind a fixed-mode `[ADDH][ADDL][CHAN]` prefix.
//!
//! # Important Notes
//! - Configuration frames are only accepted at 9600 bps
//! - A write is acknowledged by the read command (`0xC1`), not by the write
//!   command that was sent
//! - `0xFF` in the command position means the module rejected the frame
//! - A single over-the-air write is limited to 200 bytes, fixed-mode prefix
//!   included

mod message;
mod program;

pub use message::*;
pub use program::*;
