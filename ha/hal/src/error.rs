//! Common error types for HAL operations

use core::fmt;

use ha_core::HaError;

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Invalid parameter provided (line or interval out of range)
    InvalidParameter,
    /// Operation not supported by this implementation
    NotSupported,
    /// Peripheral is busy
    Busy,
    /// An output pin refused a level change
    PinError,
    /// Hardware error occurred
    HardwareError,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::NotSupported => write!(f, "operation not supported"),
            Self::Busy => write!(f, "peripheral busy"),
            Self::PinError => write!(f, "output pin error"),
            Self::HardwareError => write!(f, "hardware error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidParameter => defmt::write!(fmt, "InvalidParameter"),
            Self::NotSupported => defmt::write!(fmt, "NotSupported"),
            Self::Busy => defmt::write!(fmt, "Busy"),
            Self::PinError => defmt::write!(fmt, "PinError"),
            Self::HardwareError => defmt::write!(fmt, "HardwareError"),
        }
    }
}

impl From<HalError> for HaError {
    fn from(err: HalError) -> Self {
        match err {
            HalError::NotSupported => HaError::NotSupported,
            HalError::Busy => HaError::ChannelBusy,
            _ => HaError::Hardware,
        }
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
