//! GPIO-expander interrupt controller abstraction
//!
//! An expander provides 16 interrupt lines behind one physical interrupt
//! pin. Reading the capture register reports the lines that fired and
//! disables further interrupts on them until each is re-enabled.

use crate::error::HalResult;
use crate::gpio::{Edge, Level};

/// Lines provided by one expander
pub const EXPANDER_LINES: u8 = 16;

/// Interrupt side of a GPIO expander
pub trait InterruptExpander {
    /// Configure the chip for interrupt duty.
    ///
    /// `select` is the chip-select line, `active_level` the level the chip
    /// drives its interrupt output to, `address` the hardware address when
    /// several chips share a select line.
    fn begin_interrupt(&mut self, select: u8, active_level: Level, address: u8) -> HalResult<()>;

    /// Bitmask of lines that fired since the last read.
    ///
    /// Reported lines are disabled until re-enabled with `enable_line`.
    fn read_and_clear_interrupt_mask(&mut self) -> HalResult<u16>;

    /// Re-arm one line
    fn enable_line(&mut self, line: u8) -> HalResult<()>;

    /// Select the trigger condition for one line
    fn set_line_mode(&mut self, line: u8, edge: Edge) -> HalResult<()>;
}
