//! The closed set of objects a wakeup can be routed to

use core::fmt;

/// A channel woken by its periodic daemon
pub trait ChannelTarget: Sync {
    fn on_daemon(&self, arg: u8);
}

/// A device woken to continue a multi-step operation
pub trait DeviceTarget: Sync {
    fn on_wakeup(&self, arg: u8);
}

/// A zone woken to re-evaluate its rules
pub trait ZoneTarget: Sync {
    fn on_wakeup(&self, arg: u8);
}

/// Object bound to a context slot
#[derive(Clone, Copy)]
pub enum Participant {
    Channel(&'static dyn ChannelTarget),
    Device(&'static dyn DeviceTarget),
    Zone(&'static dyn ZoneTarget),
}

/// Discriminant of a [`Participant`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Channel,
    Device,
    Zone,
}

impl Participant {
    pub fn kind(&self) -> ParticipantKind {
        match self {
            Self::Channel(_) => ParticipantKind::Channel,
            Self::Device(_) => ParticipantKind::Device,
            Self::Zone(_) => ParticipantKind::Zone,
        }
    }

    pub(crate) fn invoke(&self, arg: u8) {
        match self {
            Self::Channel(chan) => chan.on_daemon(arg),
            Self::Device(dev) => dev.on_wakeup(arg),
            Self::Zone(zone) => zone.on_wakeup(arg),
        }
    }
}

impl fmt::Debug for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Participant::{:?}", self.kind())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ParticipantKind {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Channel => defmt::write!(fmt, "Channel"),
            Self::Device => defmt::write!(fmt, "Device"),
            Self::Zone => defmt::write!(fmt, "Zone"),
        }
    }
}
