#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # HA Core
//!
//! Core types shared by the wakeup scheduler, the context switcher and the
//! device channels of the home-automation controller.
//! Nothing in here touches hardware or global state.

use core::fmt;

pub mod device;
pub mod time;

pub use device::*;
pub use time::*;

/// Result type used throughout the HA runtime
pub type HaResult<T> = Result<T, HaError>;

/// Error types for HA runtime operations
///
/// Every variant is recoverable: callers degrade (for example by marking a
/// device unavailable) rather than retry in a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaError {
    /// No free sleeper slot in the wakeup table
    SchedulerFull,
    /// Duration converts to zero or exceeds the unit maximum
    InvalidDuration,
    /// No sleeper matches the (callback, duration, context) triple
    NotFound,
    /// No free slot in the context registry
    ContextFull,
    /// Context id does not name an occupied slot
    InvalidContext,
    /// Channel lock already held
    ChannelBusy,
    /// Virtual pin beyond the channel's configured pins
    PinOutOfRange,
    /// Interrupt range index beyond the channel's range table
    RangeOutOfBounds,
    /// Interrupt range overlaps or is out of order with its neighbours
    RangeOverlap,
    /// No configured range covers the interrupt line or device
    NoCoveringRange,
    /// Operation not available for the channel's access or alert kind
    NotSupported,
    /// Malformed channel configuration
    InvalidConfig,
    /// Collaborating driver reported a failure
    Hardware,
}

impl fmt::Display for HaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaError::SchedulerFull => write!(f, "No free wakeup slot"),
            HaError::InvalidDuration => write!(f, "Invalid wakeup duration"),
            HaError::NotFound => write!(f, "No matching sleeper"),
            HaError::ContextFull => write!(f, "No free context slot"),
            HaError::InvalidContext => write!(f, "Invalid context id"),
            HaError::ChannelBusy => write!(f, "Channel already locked"),
            HaError::PinOutOfRange => write!(f, "Pin out of range"),
            HaError::RangeOutOfBounds => write!(f, "Interrupt range index out of bounds"),
            HaError::RangeOverlap => write!(f, "Interrupt range overlaps a neighbour"),
            HaError::NoCoveringRange => write!(f, "No interrupt range covers the line"),
            HaError::NotSupported => write!(f, "Operation not supported by channel"),
            HaError::InvalidConfig => write!(f, "Invalid channel configuration"),
            HaError::Hardware => write!(f, "Hardware driver error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HaError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HaError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            HaError::SchedulerFull => defmt::write!(fmt, "SchedulerFull"),
            HaError::InvalidDuration => defmt::write!(fmt, "InvalidDuration"),
            HaError::NotFound => defmt::write!(fmt, "NotFound"),
            HaError::ContextFull => defmt::write!(fmt, "ContextFull"),
            HaError::InvalidContext => defmt::write!(fmt, "InvalidContext"),
            HaError::ChannelBusy => defmt::write!(fmt, "ChannelBusy"),
            HaError::PinOutOfRange => defmt::write!(fmt, "PinOutOfRange"),
            HaError::RangeOutOfBounds => defmt::write!(fmt, "RangeOutOfBounds"),
            HaError::RangeOverlap => defmt::write!(fmt, "RangeOverlap"),
            HaError::NoCoveringRange => defmt::write!(fmt, "NoCoveringRange"),
            HaError::NotSupported => defmt::write!(fmt, "NotSupported"),
            HaError::InvalidConfig => defmt::write!(fmt, "InvalidConfig"),
            HaError::Hardware => defmt::write!(fmt, "Hardware"),
        }
    }
}
