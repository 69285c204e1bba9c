//! Heartbeat timer abstraction

use crate::error::HalResult;

/// A single hardware interval timer driving the wakeup heartbeat
///
/// The timer fires `handler` once every programmed interval until stopped.
/// `handler` is a plain function because it is installed as (or called
/// from) a hardware vector.
pub trait HeartbeatTimer {
    /// Program the interval and the function to call when it elapses.
    ///
    /// Restarts the current period, so `elapsed_us` reads zero afterwards.
    fn attach(&mut self, interval_us: u32, handler: fn()) -> HalResult<()>;

    /// Start (or resume) counting
    fn start(&mut self) -> HalResult<()>;

    /// Stop counting; no further interrupts until restarted
    fn stop(&mut self) -> HalResult<()>;

    /// Microseconds elapsed in the current period
    fn elapsed_us(&self) -> u32;
}
