//! Hardware collaborators of the HA runtime
//!
//! The scheduler and the channels never touch registers themselves. They
//! drive a heartbeat timer, a chain of shift registers and GPIO-expander
//! interrupt controllers through the traits in this crate; board support
//! crates implement them for real silicon and tests implement them with
//! recording mocks.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod expander;
pub mod gpio;
pub mod shift;
pub mod timer;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use expander::{InterruptExpander, EXPANDER_LINES};
pub use gpio::{Edge, Level};
pub use shift::{BitBangShifter, ShiftOut};
pub use timer::HeartbeatTimer;
