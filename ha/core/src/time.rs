//! Time units, wakeup durations and dispatch flags

use core::fmt;

/// Unit in which a wakeup duration is expressed
///
/// Durations are always held internally as milliseconds in a `u32`, which
/// caps any single wakeup at a little under 50 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Milliseconds in one unit
    pub const fn millis_per_unit(self) -> u32 {
        match self {
            Self::Millis => 1,
            Self::Seconds => 1_000,
            Self::Minutes => 60_000,
            Self::Hours => 3_600_000,
            Self::Days => 86_400_000,
        }
    }

    /// Largest value representable in this unit without overflowing the
    /// millisecond base
    pub const fn max_value(self) -> u32 {
        match self {
            Self::Millis => u32::MAX,
            Self::Seconds => 4_294_967,
            Self::Minutes => 71_582,
            Self::Hours => 1_193,
            Self::Days => 49,
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Millis => "ms",
            Self::Seconds => "s",
            Self::Minutes => "min",
            Self::Hours => "h",
            Self::Days => "d",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimeUnit {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.suffix());
    }
}

/// A wakeup delay as requested by a caller: a value and its unit
///
/// Matching for cancel/reset is done on the converted millisecond value, so
/// `2 s` and `2000 ms` name the same sleeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeDuration {
    value: u32,
    unit: TimeUnit,
}

impl WakeDuration {
    /// Create a duration from a value and unit
    pub const fn new(value: u32, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    pub const fn from_millis(millis: u32) -> Self {
        Self::new(millis, TimeUnit::Millis)
    }

    pub const fn from_secs(secs: u32) -> Self {
        Self::new(secs, TimeUnit::Seconds)
    }

    pub const fn from_mins(mins: u32) -> Self {
        Self::new(mins, TimeUnit::Minutes)
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self::new(hours, TimeUnit::Hours)
    }

    pub const fn from_days(days: u32) -> Self {
        Self::new(days, TimeUnit::Days)
    }

    /// Raw value in the requested unit
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Requested unit
    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Convert to the millisecond base
    ///
    /// Returns `None` when the value exceeds the unit maximum or converts
    /// to zero; neither can be scheduled.
    pub const fn as_millis(&self) -> Option<u32> {
        if self.value == 0 || self.value > self.unit.max_value() {
            None
        } else {
            Some(self.value * self.unit.millis_per_unit())
        }
    }
}

impl fmt::Display for WakeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for WakeDuration {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}{}", self.value, self.unit);
    }
}

/// Where an expired sleeper runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchClass {
    /// Inside the heartbeat interrupt, interrupts disabled. Must be short.
    Interrupt,
    /// From the main loop's `poll()`; may take as long as it likes.
    Cooperative,
}

#[cfg(feature = "defmt")]
impl defmt::Format for DispatchClass {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Interrupt => defmt::write!(fmt, "Interrupt"),
            Self::Cooperative => defmt::write!(fmt, "Cooperative"),
        }
    }
}

/// Whether a sleeper is re-armed after it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    OneShot,
    Repeating,
}

impl Recurrence {
    pub const fn is_repeating(&self) -> bool {
        matches!(self, Self::Repeating)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Recurrence {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OneShot => defmt::write!(fmt, "OneShot"),
            Self::Repeating => defmt::write!(fmt, "Repeating"),
        }
    }
}

/// Macro to create compile-time wakeup durations
#[macro_export]
macro_rules! wake_after {
    ($value:literal ms) => {
        $crate::WakeDuration::from_millis($value)
    };
    ($value:literal s) => {
        $crate::WakeDuration::from_secs($value)
    };
    ($value:literal min) => {
        $crate::WakeDuration::from_mins($value)
    };
    ($value:literal h) => {
        $crate::WakeDuration::from_hours($value)
    };
    ($value:literal d) => {
        $crate::WakeDuration::from_days($value)
    };
}
