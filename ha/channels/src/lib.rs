#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # HA Channels
//!
//! A channel groups the devices that share a bus. It knows two things about
//! them: how to reach a device's virtual pin ([`Access`]) and how a device
//! asks for attention ([`Alert`]).
//!
//! Interrupt handling is split in two. The hardware vector calls
//! [`Channel::on_interrupt`], which only reads the expander capture
//! registers and latches the lines that fired. A repeating daemon scheduled
//! through the context switcher later runs [`Channel::on_tick`], which maps
//! each latched line to its device through the channel's
//! [`InterruptRange`]s, calls the device's [`DeviceHandler::follow_up`] and
//! re-arms the line.
//!
//! ```rust,ignore
//! static SENSORS: Channel<Unwired, Unwired, Mcp23s17> =
//!     Channel::new(Protocol::Spi, 16);
//!
//! SENSORS.set_alert(Alert::Cascade16 { controller, select: 10 }, &DEVICES)?;
//! SENSORS.register_device_range(0, InterruptRange::new(0, 8, DeviceType::Motion, 0))?;
//! SENSORS.register_device_range(1, InterruptRange::new(8, 8, DeviceType::Touch, 0))?;
//! SENSORS.start_daemon(&WAKEUP)?;
//! VECTORS.register(2, &SENSORS)?;
//! ```

mod access;
mod alert;
mod channel;
mod range;
mod vectors;

pub use access::{Access, Unwired};
pub use alert::{Alert, CASCADE_SLAVES};
pub use channel::{Channel, ChannelGuard, DeviceHandler, Protocol, MAX_PINS, MAX_SERIAL_PORT};
pub use range::{InterruptRange, RangeTable, MAX_RANGES};
pub use vectors::{InterruptSource, InterruptVectors, EXTERNAL_INTERRUPTS};

pub use ha_core::{DeviceRef, DeviceType};
pub use ha_hal::{Edge, Level};
