//! Test doubles for the serial link, the mode pins, AUX and the delay
//!
//! Every double is a cheap handle onto shared state, so a test keeps a clone
//! to script and inspect the hardware after moving the first one into a
//! [`Device`].

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    convert::Infallible,
    rc::Rc,
};

use embedded_hal::{delay::DelayNs, digital};

use crate::{BytesAvailable, Device, NoAux};

pub type MockDevice<AUX = MockAux> = Device<MockSerial, MockOutput, MockOutput, AUX, MockDelay>;

/// Handles onto the doubles owned by a device under test
pub struct Hardware {
    pub serial: MockSerial,
    pub m0: MockOutput,
    pub m1: MockOutput,
    pub aux: MockAux,
    pub delay: MockDelay,
}

impl Hardware {
    fn new(aux: AuxBehavior) -> Self {
        Self {
            serial: MockSerial::default(),
            m0: MockOutput::default(),
            m1: MockOutput::default(),
            aux: MockAux::new(aux),
            delay: MockDelay::default(),
        }
    }
}

/// A device with AUX wired and behaving as `aux`
pub fn device(aux: AuxBehavior) -> (MockDevice, Hardware) {
    let hw = Hardware::new(aux);
    let device = Device::new(
        hw.serial.clone(),
        hw.m0.clone(),
        hw.m1.clone(),
        hw.aux.clone(),
        hw.delay.clone(),
    );
    (device, hw)
}

/// A device without AUX; `Hardware::aux` is not connected to it
pub fn device_without_aux() -> (MockDevice<NoAux>, Hardware) {
    let hw = Hardware::new(AuxBehavior::Ready);
    let device = Device::without_aux(
        hw.serial.clone(),
        hw.m0.clone(),
        hw.m1.clone(),
        hw.delay.clone(),
    );
    (device, hw)
}

#[derive(Default)]
struct SerialState {
    rx: VecDeque<u8>,
    responses: VecDeque<Vec<u8>>,
    frames: Vec<Vec<u8>>,
    current: Vec<u8>,
    write_limit: Option<usize>,
}

/// Scripted serial link
///
/// Bytes written are collected into a frame until the next flush. Each flush
/// closes the frame and delivers the next queued response, as the module
/// answers a complete request.
#[derive(Clone, Default)]
pub struct MockSerial {
    state: Rc<RefCell<SerialState>>,
}

impl MockSerial {
    /// Makes `bytes` available for reading right away
    pub fn push_rx(&self, bytes: &[u8]) {
        self.state.borrow_mut().rx.extend(bytes);
    }

    /// Queues `bytes` to arrive after the next flushed frame
    pub fn respond(&self, bytes: &[u8]) {
        self.state.borrow_mut().responses.push_back(bytes.to_vec());
    }

    /// Frames written so far, one per flush
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.state.borrow().frames.clone()
    }

    /// Bytes still waiting to be read
    pub fn pending(&self) -> usize {
        self.state.borrow().rx.len()
    }

    /// Accepts at most `limit` more bytes, then reports zero-length writes
    pub fn limit_writes(&self, limit: usize) {
        self.state.borrow_mut().write_limit = Some(limit);
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = Infallible;
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        let n = buf.len().min(state.rx.len());
        for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        let n = match state.write_limit.as_mut() {
            Some(limit) => {
                let n = buf.len().min(*limit);
                *limit -= n;
                n
            }
            None => buf.len(),
        };
        state.current.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        let frame = std::mem::take(&mut state.current);
        state.frames.push(frame);
        if let Some(response) = state.responses.pop_front() {
            state.rx.extend(response);
        }
        Ok(())
    }
}

impl BytesAvailable for MockSerial {
    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        Ok(self.state.borrow().rx.len())
    }
}

/// Output pin recording every level it is driven to
#[derive(Clone, Default)]
pub struct MockOutput {
    history: Rc<RefCell<Vec<bool>>>,
}

impl MockOutput {
    /// Last level driven, `None` if never driven
    pub fn level(&self) -> Option<bool> {
        self.history.borrow().last().copied()
    }

    pub fn history(&self) -> Vec<bool> {
        self.history.borrow().clone()
    }
}

impl digital::ErrorType for MockOutput {
    type Error = Infallible;
}

impl digital::OutputPin for MockOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.history.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.history.borrow_mut().push(true);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxBehavior {
    /// High on every poll
    Ready,
    /// Low on every poll
    NeverReady,
    /// Low for the given number of polls, then high
    ReadyAfter(u32),
}

struct AuxState {
    behavior: AuxBehavior,
    since_set: u32,
    polls: u32,
}

/// Scripted AUX input
#[derive(Clone)]
pub struct MockAux {
    state: Rc<RefCell<AuxState>>,
}

impl MockAux {
    fn new(behavior: AuxBehavior) -> Self {
        Self {
            state: Rc::new(RefCell::new(AuxState {
                behavior,
                since_set: 0,
                polls: 0,
            })),
        }
    }

    pub fn set(&self, behavior: AuxBehavior) {
        let mut state = self.state.borrow_mut();
        state.behavior = behavior;
        state.since_set = 0;
    }

    /// Total number of times the line was read
    pub fn polls(&self) -> u32 {
        self.state.borrow().polls
    }
}

impl digital::ErrorType for MockAux {
    type Error = Infallible;
}

impl digital::InputPin for MockAux {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let mut state = self.state.borrow_mut();
        let seen = state.since_set;
        state.since_set += 1;
        state.polls += 1;
        Ok(match state.behavior {
            AuxBehavior::Ready => true,
            AuxBehavior::NeverReady => false,
            AuxBehavior::ReadyAfter(polls) => seen >= polls,
        })
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Delay that only advances a clock
#[derive(Clone, Default)]
pub struct MockDelay {
    elapsed_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }

    fn advance(&self, ns: u64) {
        self.elapsed_ns.set(self.elapsed_ns.get() + ns);
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * 1_000_000);
    }
}
