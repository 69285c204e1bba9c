//! Recording stand-ins for shift registers, pins, expanders and devices

#![allow(dead_code)]

use std::sync::Mutex;

use embedded_hal::digital::{ErrorType, OutputPin};
use ha_channels::{DeviceHandler, DeviceRef, Edge, Level};
use ha_hal::{HalError, HalResult, InterruptExpander, ShiftOut};

/// Every latched frame, oldest first
pub struct ShiftLog {
    frames: Mutex<Vec<Vec<u8>>>,
    open: Mutex<Option<Vec<u8>>>,
}

impl ShiftLog {
    pub const fn new() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            open: Mutex::new(None),
        }
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Vec<u8>> {
        self.frames.lock().unwrap().last().cloned()
    }
}

pub struct MockShifter(pub &'static ShiftLog);

impl ShiftOut for MockShifter {
    fn begin(&mut self) -> HalResult<()> {
        *self.0.open.lock().unwrap() = Some(Vec::new());
        Ok(())
    }

    fn shift_out(&mut self, byte: u8) -> HalResult<()> {
        if let Some(frame) = self.0.open.lock().unwrap().as_mut() {
            frame.push(byte);
        }
        Ok(())
    }

    fn latch(&mut self) -> HalResult<()> {
        if let Some(frame) = self.0.open.lock().unwrap().take() {
            self.0.frames.lock().unwrap().push(frame);
        }
        Ok(())
    }
}

/// Levels driven onto a pin
pub struct PinLog {
    levels: Mutex<Vec<Level>>,
}

impl PinLog {
    pub const fn new() -> Self {
        Self {
            levels: Mutex::new(Vec::new()),
        }
    }

    pub fn levels(&self) -> Vec<Level> {
        self.levels.lock().unwrap().clone()
    }
}

pub struct MockPin(pub &'static PinLog);

impl ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.levels.lock().unwrap().push(Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.levels.lock().unwrap().push(Level::High);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpanderSnapshot {
    pub select: Option<u8>,
    pub address: u8,
    pub enabled: u16,
    pub captured: u16,
    pub while_low: u16,
}

/// Register file of one simulated expander
///
/// Lines start enabled. Reading the capture register disables the lines it
/// reports, as the real chip does. A failed read leaves the capture alone.
pub struct ExpanderState {
    regs: Mutex<ExpanderSnapshot>,
    failing_reads: Mutex<u8>,
}

impl ExpanderState {
    pub const fn new() -> Self {
        Self {
            regs: Mutex::new(ExpanderSnapshot {
                select: None,
                address: 0,
                enabled: u16::MAX,
                captured: 0,
                while_low: 0,
            }),
            failing_reads: Mutex::new(0),
        }
    }

    /// Make the next `count` capture reads fail
    pub fn fail_reads(&self, count: u8) {
        *self.failing_reads.lock().unwrap() = count;
    }

    /// Raise `lines`; disabled lines are ignored
    pub fn fire(&self, lines: u16) {
        let mut regs = self.regs.lock().unwrap();
        regs.captured |= lines & regs.enabled;
    }

    pub fn snapshot(&self) -> ExpanderSnapshot {
        *self.regs.lock().unwrap()
    }

    pub fn is_enabled(&self, line: u8) -> bool {
        self.snapshot().enabled & (1 << line) != 0
    }
}

#[derive(Clone, Copy)]
pub struct MockExpander(pub &'static ExpanderState);

impl InterruptExpander for MockExpander {
    fn begin_interrupt(&mut self, select: u8, _active_level: Level, address: u8) -> HalResult<()> {
        let mut regs = self.0.regs.lock().unwrap();
        regs.select = Some(select);
        regs.address = address;
        Ok(())
    }

    fn read_and_clear_interrupt_mask(&mut self) -> HalResult<u16> {
        let mut failing = self.0.failing_reads.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            return Err(HalError::HardwareError);
        }
        drop(failing);

        let mut regs = self.0.regs.lock().unwrap();
        let fired = regs.captured;
        regs.captured = 0;
        regs.enabled &= !fired;
        Ok(fired)
    }

    fn enable_line(&mut self, line: u8) -> HalResult<()> {
        self.0.regs.lock().unwrap().enabled |= 1 << line;
        Ok(())
    }

    fn set_line_mode(&mut self, line: u8, edge: Edge) -> HalResult<()> {
        let mut regs = self.0.regs.lock().unwrap();
        if edge == Edge::WhileLow {
            regs.while_low |= 1 << line;
        } else {
            regs.while_low &= !(1 << line);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Quick(DeviceRef, u16),
    FollowUp(DeviceRef, u16),
}

/// Device handler that remembers every call
pub struct Devices {
    calls: Mutex<Vec<Call>>,
}

impl Devices {
    pub const fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl DeviceHandler for Devices {
    fn quick(&self, device: DeviceRef, line: u16) {
        self.calls.lock().unwrap().push(Call::Quick(device, line));
    }

    fn follow_up(&self, device: DeviceRef, line: u16) {
        self.calls.lock().unwrap().push(Call::FollowUp(device, line));
    }
}
