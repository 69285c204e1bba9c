//! Diagnostic record types

use core::fmt;

/// Every diagnostic the runtime can raise
///
/// The discriminant doubles as the bit index in the filter mask, so values
/// must stay below 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DiagKind {
    // [1-4] Wakeup scheduler
    SchedulerFull = 1,
    InvalidDuration = 2,
    PendingOverflow = 3,
    WakeupMiss = 4,

    // [8-9] Context switcher
    ContextFull = 8,
    StaleContext = 9,

    // [16-24] Channels
    ChannelBusy = 16,
    PinOutOfRange = 17,
    RangeMiss = 18,
    RangeOutOfBounds = 19,
    BadConfig = 20,
    SpuriousInterrupt = 21,
    DaemonStartFailed = 22,
    VectorOutOfRange = 23,
    ControllerFault = 24,
}

impl DiagKind {
    /// Bit of this kind in the filter mask
    pub const fn mask(self) -> u32 {
        1u32 << (self as u8)
    }

    /// Short tag used when rendering the record
    pub const fn tag(self) -> &'static str {
        match self {
            Self::SchedulerFull => "wakeup full",
            Self::InvalidDuration => "bad duration",
            Self::PendingOverflow => "pending overflow",
            Self::WakeupMiss => "no such sleeper",
            Self::ContextFull => "out of contexts",
            Self::StaleContext => "stale context",
            Self::ChannelBusy => "channel busy",
            Self::PinOutOfRange => "pin OOB",
            Self::RangeMiss => "no range for line",
            Self::RangeOutOfBounds => "range idx OOB",
            Self::BadConfig => "bad channel config",
            Self::SpuriousInterrupt => "spurious interrupt",
            Self::DaemonStartFailed => "daemon not started",
            Self::VectorOutOfRange => "bad interrupt vector",
            Self::ControllerFault => "expander fault",
        }
    }
}

impl fmt::Display for DiagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DiagKind {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.tag());
    }
}

/// One captured diagnostic
///
/// `a` and `b` carry kind-specific detail such as a pin or a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagRecord {
    pub seq: u16,
    pub kind: DiagKind,
    pub a: u16,
    pub b: u16,
}

impl fmt::Display for DiagRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({}, {})", self.seq, self.kind, self.a, self.b)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DiagRecord {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "[{}] {} ({}, {})", self.seq, self.kind, self.a, self.b);
    }
}
