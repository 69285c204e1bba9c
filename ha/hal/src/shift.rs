//! 3-wire shift-register output (data / clock / latch)

use embedded_hal::digital::{OutputPin, PinState};

use crate::error::{HalError, HalResult};

/// Serial-in, parallel-out shift register chain
///
/// A frame is `begin`, one `shift_out` per register (most significant
/// register first), then `latch` to present the new pattern on the outputs.
pub trait ShiftOut {
    /// Detach the outputs from the shift stage and idle the clock low
    fn begin(&mut self) -> HalResult<()>;

    /// Clock one byte out, MSB first
    fn shift_out(&mut self, byte: u8) -> HalResult<()>;

    /// Present the shifted pattern on the outputs
    fn latch(&mut self) -> HalResult<()>;

    /// Shift a whole frame, first byte first, then latch
    fn shift_frame(&mut self, bytes: &[u8]) -> HalResult<()> {
        self.begin()?;
        for &byte in bytes {
            self.shift_out(byte)?;
        }
        self.latch()
    }
}

/// Bit-banged shifter over three output pins
pub struct BitBangShifter<D, C, L> {
    data: D,
    clock: C,
    latch: L,
}

impl<D, C, L> BitBangShifter<D, C, L>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
{
    pub fn new(data: D, clock: C, latch: L) -> Self {
        Self { data, clock, latch }
    }

    /// Give the pins back
    pub fn release(self) -> (D, C, L) {
        (self.data, self.clock, self.latch)
    }
}

impl<D, C, L> ShiftOut for BitBangShifter<D, C, L>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
{
    fn begin(&mut self) -> HalResult<()> {
        self.latch.set_low().map_err(|_| HalError::PinError)?;
        // Clock must start low so the first bit sees a rising edge
        self.clock.set_low().map_err(|_| HalError::PinError)
    }

    fn shift_out(&mut self, byte: u8) -> HalResult<()> {
        for bit in (0..8).rev() {
            let state = PinState::from(byte & (1 << bit) != 0);
            self.data.set_state(state).map_err(|_| HalError::PinError)?;
            self.clock.set_high().map_err(|_| HalError::PinError)?;
            self.clock.set_low().map_err(|_| HalError::PinError)?;
        }
        Ok(())
    }

    fn latch(&mut self) -> HalResult<()> {
        self.latch.set_high().map_err(|_| HalError::PinError)
    }
}
