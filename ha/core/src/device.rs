//! Device identities used to route interrupt notifications

use core::fmt;

/// Kinds of device the controller knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum DeviceType {
    Touch = 0,
    Fire = 1,
    Heat = 2,
    Luminance = 3,
    Motion = 4,
    Presence = 5,
    Rfid = 6,
    Open = 7,
    Power5A = 8,
    Power13A = 9,
    Lock = 10,
    Light = 11,
    Relay = 12,
}

impl DeviceType {
    /// Get the raw type code
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceType {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "DeviceType({})", self.raw());
    }
}

/// A single device: its type and its number within that type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceRef {
    pub device_type: DeviceType,
    pub number: u8,
}

impl DeviceRef {
    pub const fn new(device_type: DeviceType, number: u8) -> Self {
        Self {
            device_type,
            number,
        }
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.device_type, self.number)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceRef {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}#{}", self.device_type, self.number);
    }
}
