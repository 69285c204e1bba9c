//! Pin levels and interrupt edges

use embedded_hal::digital::PinState;

/// GPIO pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    /// Low level (0V)
    #[default]
    Low,
    /// High level (VCC)
    High,
}

impl Level {
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<Level> for PinState {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => PinState::Low,
            Level::High => PinState::High,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Level {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Low => defmt::write!(fmt, "Low"),
            Self::High => defmt::write!(fmt, "High"),
        }
    }
}

/// Interrupt trigger condition on an expander line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Rising edge
    Rising,
    /// Falling edge
    Falling,
    /// Both edges
    Both,
    /// Level-triggered while the line is held low
    WhileLow,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Edge {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Rising => defmt::write!(fmt, "Rising"),
            Self::Falling => defmt::write!(fmt, "Falling"),
            Self::Both => defmt::write!(fmt, "Both"),
            Self::WhileLow => defmt::write!(fmt, "WhileLow"),
        }
    }
}
