//! How a channel learns that a device wants attention

use ha_core::{DeviceRef, HaError, HaResult};
use ha_hal::{Edge, HalResult, InterruptExpander, Level, EXPANDER_LINES};

use crate::range::{InterruptRange, RangeTable};

/// Expanders behind the mux of a 256-line cascade
pub const CASCADE_SLAVES: usize = 16;

/// Slaves sharing one chip select, told apart by hardware address
const SLAVES_PER_SELECT: u8 = 8;

/// Interrupt wiring handed to [`Channel::set_alert`](crate::Channel::set_alert)
pub enum Alert<E> {
    /// No interrupt line
    None,
    /// One device owns the channel interrupt
    Single { device: DeviceRef },
    /// One expander: 16 lines
    Cascade16 { controller: E, select: u8 },
    /// A mux expander whose lines are the interrupt outputs of 16 slave
    /// expanders: 256 lines. Slaves 0-7 sit on `slave_selects[0]`, 8-15 on
    /// `slave_selects[1]`.
    Cascade256 {
        mux: E,
        mux_select: u8,
        slaves: [E; CASCADE_SLAVES],
        slave_selects: [u8; 2],
    },
}

/// What the interrupt fast path found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Captured {
    Spurious,
    Single(DeviceRef),
    Flagged,
}

pub(crate) enum AlertState<E> {
    None,
    Single {
        device: DeviceRef,
        raised: bool,
    },
    Cascade16 {
        controller: E,
        ranges: RangeTable,
        flags: u16,
    },
    Cascade256 {
        mux: E,
        slaves: [E; CASCADE_SLAVES],
        ranges: RangeTable,
        flags: [u16; CASCADE_SLAVES],
    },
}

impl<E: InterruptExpander> AlertState<E> {
    /// Bring the controllers up and discard anything they latched before
    pub(crate) fn begin(alert: Alert<E>) -> HalResult<Self> {
        match alert {
            Alert::None => Ok(Self::None),
            Alert::Single { device } => Ok(Self::Single {
                device,
                raised: false,
            }),
            Alert::Cascade16 {
                mut controller,
                select,
            } => {
                controller.begin_interrupt(select, Level::Low, 0)?;
                controller.read_and_clear_interrupt_mask()?;
                Ok(Self::Cascade16 {
                    controller,
                    ranges: RangeTable::new(),
                    flags: 0,
                })
            }
            Alert::Cascade256 {
                mut mux,
                mux_select,
                mut slaves,
                slave_selects,
            } => {
                for (index, slave) in (0u8..).zip(slaves.iter_mut()) {
                    let select = slave_selects[usize::from(index / SLAVES_PER_SELECT)];
                    slave.begin_interrupt(select, Level::Low, index % SLAVES_PER_SELECT)?;
                    slave.read_and_clear_interrupt_mask()?;
                }
                mux.begin_interrupt(mux_select, Level::Low, 0)?;
                for line in 0..EXPANDER_LINES {
                    // Slave outputs stay low until their captures are read
                    mux.set_line_mode(line, Edge::WhileLow)?;
                    mux.enable_line(line)?;
                }
                mux.read_and_clear_interrupt_mask()?;
                Ok(Self::Cascade256 {
                    mux,
                    slaves,
                    ranges: RangeTable::new(),
                    flags: [0; CASCADE_SLAVES],
                })
            }
        }
    }

    /// Interrupt lines the alert provides
    pub(crate) fn lines(&self) -> u16 {
        match self {
            Self::None => 0,
            Self::Single { .. } => 1,
            Self::Cascade16 { .. } => u16::from(EXPANDER_LINES),
            Self::Cascade256 { .. } => u16::from(EXPANDER_LINES) * CASCADE_SLAVES as u16,
        }
    }

    fn ranges_mut(&mut self) -> HaResult<&mut RangeTable> {
        match self {
            Self::Cascade16 { ranges, .. } | Self::Cascade256 { ranges, .. } => Ok(ranges),
            _ => Err(HaError::NotSupported),
        }
    }

    fn ranges(&self) -> Option<&RangeTable> {
        match self {
            Self::Cascade16 { ranges, .. } | Self::Cascade256 { ranges, .. } => Some(ranges),
            _ => None,
        }
    }

    pub(crate) fn register(&mut self, index: usize, range: InterruptRange) -> HaResult<()> {
        let lines = self.lines();
        self.ranges_mut()?.register(index, range, lines)
    }

    pub(crate) fn range(&self, index: usize) -> Option<InterruptRange> {
        self.ranges().and_then(|r| r.get(index))
    }

    /// Interrupt fast path: latch which lines fired
    pub(crate) fn capture(&mut self) -> HalResult<Captured> {
        match self {
            Self::None => Ok(Captured::Spurious),
            Self::Single { device, raised } => {
                *raised = true;
                Ok(Captured::Single(*device))
            }
            Self::Cascade16 {
                controller, flags, ..
            } => {
                *flags |= controller.read_and_clear_interrupt_mask()?;
                Ok(Captured::Flagged)
            }
            Self::Cascade256 {
                mux, slaves, flags, ..
            } => {
                let fired = mux.read_and_clear_interrupt_mask()?;
                // Every fired mux line is re-armed even if its slave failed;
                // the slave keeps its capture and raises the line again
                let mut fault = None;
                for (index, slave) in (0u8..).zip(slaves.iter_mut()) {
                    if fired & (1 << index) == 0 {
                        continue;
                    }
                    match slave.read_and_clear_interrupt_mask() {
                        Ok(lines) => flags[usize::from(index)] |= lines,
                        Err(err) => fault = fault.or(Some(err)),
                    }
                    if let Err(err) = mux.enable_line(index) {
                        fault = fault.or(Some(err));
                    }
                }
                match fault {
                    Some(err) => Err(err),
                    None => Ok(Captured::Flagged),
                }
            }
        }
    }

    /// Clear and return the single-alert flag
    pub(crate) fn take_raised(&mut self) -> Option<DeviceRef> {
        match self {
            Self::Single { device, raised } if *raised => {
                *raised = false;
                Some(*device)
            }
            _ => None,
        }
    }

    /// Clear and return the lowest flagged line at or above `from`
    pub(crate) fn take_pending(&mut self, from: u16) -> Option<u16> {
        let lines = u16::from(EXPANDER_LINES);
        let flags: &mut [u16] = match self {
            Self::Cascade16 { flags, .. } => core::slice::from_mut(flags),
            Self::Cascade256 { flags, .. } => flags,
            _ => return None,
        };

        let start = usize::from(from / lines);
        for (word, bits) in flags.iter_mut().enumerate().skip(start) {
            let mut pending = *bits;
            if word == start {
                pending &= u16::MAX << (from % lines);
            }
            if pending != 0 {
                let bit = pending.trailing_zeros() as u16;
                *bits &= !(1 << bit);
                return Some(word as u16 * lines + bit);
            }
        }
        None
    }

    /// Lines flagged and not yet serviced
    pub(crate) fn pending(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Single { raised, .. } => u32::from(*raised),
            Self::Cascade16 { flags, .. } => flags.count_ones(),
            Self::Cascade256 { flags, .. } => flags.iter().map(|f| f.count_ones()).sum(),
        }
    }

    pub(crate) fn resolve(&self, line: u16) -> HaResult<DeviceRef> {
        match self {
            Self::None => Err(HaError::NotSupported),
            Self::Single { device, .. } if line == 0 => Ok(*device),
            Self::Single { .. } => Err(HaError::NoCoveringRange),
            Self::Cascade16 { ranges, .. } | Self::Cascade256 { ranges, .. } => ranges.resolve(line),
        }
    }

    pub(crate) fn find_line(&self, device: DeviceRef) -> HaResult<u16> {
        match self {
            Self::None => Err(HaError::NotSupported),
            Self::Single { device: own, .. } if *own == device => Ok(0),
            Self::Single { .. } => Err(HaError::NoCoveringRange),
            Self::Cascade16 { ranges, .. } | Self::Cascade256 { ranges, .. } => ranges.find_line(device),
        }
    }

    /// Controller and local line owning channel line `line`
    fn line_owner(&mut self, line: u16) -> HaResult<(&mut E, u8)> {
        let lines = u16::from(EXPANDER_LINES);
        match self {
            Self::Cascade16 { controller, .. } if line < lines => Ok((controller, line as u8)),
            Self::Cascade256 { slaves, .. } => {
                let slave = slaves
                    .get_mut(usize::from(line / lines))
                    .ok_or(HaError::PinOutOfRange)?;
                Ok((slave, (line % lines) as u8))
            }
            Self::Cascade16 { .. } => Err(HaError::PinOutOfRange),
            _ => Err(HaError::NotSupported),
        }
    }

    pub(crate) fn enable_line(&mut self, line: u16) -> HaResult<()> {
        let (controller, local) = self.line_owner(line)?;
        Ok(controller.enable_line(local)?)
    }

    pub(crate) fn set_line_mode(&mut self, line: u16, edge: Edge) -> HaResult<()> {
        let (controller, local) = self.line_owner(line)?;
        Ok(controller.set_line_mode(local, edge)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Unwired;
    use ha_core::DeviceType;

    fn cascade16(flags: u16) -> AlertState<Unwired> {
        AlertState::Cascade16 {
            controller: Unwired,
            ranges: RangeTable::new(),
            flags,
        }
    }

    #[test]
    fn test_take_pending_lowest_first() {
        let mut state = cascade16(0b1001_0000_0000_1010);
        assert_eq!(state.pending(), 4);
        assert_eq!(state.take_pending(0), Some(1));
        assert_eq!(state.take_pending(2), Some(3));
        assert_eq!(state.take_pending(4), Some(12));
        assert_eq!(state.take_pending(13), Some(15));
        assert_eq!(state.take_pending(16), None);
        assert_eq!(state.pending(), 0);
    }

    #[test]
    fn test_take_pending_spans_slaves() {
        let mut flags = [0u16; CASCADE_SLAVES];
        flags[0] = 1 << 15;
        flags[3] = 1 << 2;
        flags[15] = 1;
        let mut state = AlertState::Cascade256 {
            mux: Unwired,
            slaves: [Unwired; CASCADE_SLAVES],
            ranges: RangeTable::new(),
            flags,
        };
        assert_eq!(state.take_pending(0), Some(15));
        assert_eq!(state.take_pending(16), Some(50));
        assert_eq!(state.take_pending(51), Some(240));
        assert_eq!(state.take_pending(241), None);
    }

    #[test]
    fn test_single_alert_raises_once() {
        let device = DeviceRef::new(DeviceType::Fire, 2);
        let mut state: AlertState<Unwired> = AlertState::Single {
            device,
            raised: false,
        };
        assert_eq!(state.capture(), Ok(Captured::Single(device)));
        assert_eq!(state.take_raised(), Some(device));
        assert_eq!(state.take_raised(), None);
        assert_eq!(state.resolve(0), Ok(device));
        assert_eq!(state.find_line(device), Ok(0));
        assert_eq!(state.register(0, InterruptRange::new(0, 1, DeviceType::Fire, 0)), Err(HaError::NotSupported));
    }

    #[test]
    fn test_line_routing_errors() {
        let mut state = cascade16(0);
        assert_eq!(state.enable_line(16), Err(HaError::PinOutOfRange));
        // Unwired controller reports the line as unsupported hardware
        assert_eq!(state.enable_line(3), Err(HaError::NotSupported));
        let mut none: AlertState<Unwired> = AlertState::None;
        assert_eq!(none.set_line_mode(0, Edge::Falling), Err(HaError::NotSupported));
    }
}
