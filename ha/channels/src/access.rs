//! How a channel reaches its virtual pins

use embedded_hal::digital::{ErrorType, OutputPin};
use ha_core::{HaError, HaResult};
use ha_hal::{Edge, HalError, HalResult, InterruptExpander, Level, ShiftOut};

/// Pins reachable through one mux select register
const PINS_PER_REGISTER_MUXED: u8 = 32;
/// Pins driven by one latched power register
const PINS_PER_REGISTER_LATCHED: u8 = 8;
/// Shadow bytes for the largest channel
pub(crate) const SHADOW_BYTES: usize = 16;
/// Select registers for the largest multiplexed channel
const MAX_MUX_REGISTERS: usize = 4;

/// Pin access wiring handed to [`Channel::set_access`](crate::Channel::set_access)
pub enum Access<S, P> {
    /// Devices drive their own pins
    Direct,
    /// 16-way analogue multiplexers selected through shift registers, with
    /// one shared I/O pin behind them
    Multiplexed { shifter: S, io: P },
    /// Shift registers whose outputs power the devices directly
    LatchedPower { shifter: S },
}

pub(crate) enum AccessState<S, P> {
    Direct,
    Multiplexed {
        shifter: S,
        io: P,
        registers: usize,
    },
    LatchedPower {
        shifter: S,
        registers: usize,
        shadow: [u8; SHADOW_BYTES],
    },
}

impl<S: ShiftOut, P: OutputPin> AccessState<S, P> {
    pub(crate) fn from_access(access: Access<S, P>, max_pins: u8) -> Self {
        let last = max_pins.saturating_sub(1);
        match access {
            Access::Direct => Self::Direct,
            Access::Multiplexed { shifter, io } => Self::Multiplexed {
                shifter,
                io,
                registers: usize::from(last / PINS_PER_REGISTER_MUXED) + 1,
            },
            Access::LatchedPower { shifter } => Self::LatchedPower {
                shifter,
                registers: usize::from(last / PINS_PER_REGISTER_LATCHED) + 1,
                shadow: [0; SHADOW_BYTES],
            },
        }
    }

    /// Route the shared I/O pin to `pin`
    ///
    /// Each register holds two 4-bit mux selects; odd muxes use the high
    /// nibble. Every register is rewritten, so all other muxes select 0.
    pub(crate) fn select(&mut self, pin: u8) -> HaResult<()> {
        let Self::Multiplexed {
            shifter, registers, ..
        } = self
        else {
            return Err(HaError::NotSupported);
        };

        let mux = pin / 16;
        let pattern = if mux % 2 == 1 { (pin % 16) << 4 } else { pin % 16 };
        let target = usize::from(mux / 2);

        let mut frame = [0u8; MAX_MUX_REGISTERS];
        let count = (*registers).min(MAX_MUX_REGISTERS);
        // Most significant register goes out first
        for (slot, register) in frame[..count].iter_mut().zip((0..count).rev()) {
            if register == target {
                *slot = pattern;
            }
        }
        shifter.shift_frame(&frame[..count])?;
        Ok(())
    }

    pub(crate) fn drive_io(&mut self, level: Level) -> HaResult<()> {
        match self {
            Self::Multiplexed { io, .. } => io
                .set_state(level.into())
                .map_err(|_| HaError::from(HalError::PinError)),
            _ => Err(HaError::NotSupported),
        }
    }

    /// Set one bit of the shadow vector and re-shift the whole vector
    pub(crate) fn latch_power(&mut self, pin: u8, level: Level) -> HaResult<()> {
        let Self::LatchedPower {
            shifter,
            registers,
            shadow,
        } = self
        else {
            return Err(HaError::NotSupported);
        };

        let byte = usize::from(pin / 8);
        let bit = 1u8 << (pin % 8);
        if level.is_high() {
            shadow[byte] |= bit;
        } else {
            shadow[byte] &= !bit;
        }

        let count = (*registers).min(SHADOW_BYTES);
        let mut frame = [0u8; SHADOW_BYTES];
        for (slot, register) in frame[..count].iter_mut().zip((0..count).rev()) {
            *slot = shadow[register];
        }
        shifter.shift_frame(&frame[..count])?;
        Ok(())
    }

    pub(crate) fn shadow(&self) -> Option<[u8; SHADOW_BYTES]> {
        match self {
            Self::LatchedPower { shadow, .. } => Some(*shadow),
            _ => None,
        }
    }

    pub(crate) fn registers(&self) -> usize {
        match self {
            Self::Direct => 0,
            Self::Multiplexed { registers, .. } | Self::LatchedPower { registers, .. } => *registers,
        }
    }
}

/// Stand-in for hardware a channel is not wired to
///
/// Shifting and expander calls fail with [`HalError::NotSupported`]; pin
/// writes go nowhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unwired;

impl ShiftOut for Unwired {
    fn begin(&mut self) -> HalResult<()> {
        Err(HalError::NotSupported)
    }

    fn shift_out(&mut self, _byte: u8) -> HalResult<()> {
        Err(HalError::NotSupported)
    }

    fn latch(&mut self) -> HalResult<()> {
        Err(HalError::NotSupported)
    }
}

impl ErrorType for Unwired {
    type Error = core::convert::Infallible;
}

impl OutputPin for Unwired {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl InterruptExpander for Unwired {
    fn begin_interrupt(&mut self, _select: u8, _active_level: Level, _address: u8) -> HalResult<()> {
        Err(HalError::NotSupported)
    }

    fn read_and_clear_interrupt_mask(&mut self) -> HalResult<u16> {
        Err(HalError::NotSupported)
    }

    fn enable_line(&mut self, _line: u8) -> HalResult<()> {
        Err(HalError::NotSupported)
    }

    fn set_line_mode(&mut self, _line: u8, _edge: Edge) -> HalResult<()> {
        Err(HalError::NotSupported)
    }
}
