#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # HA Wakeup
//!
//! Lets many independent sleepers be woken after a delay without blocking
//! the main loop. A single hardware timer is programmed for the shortest
//! remaining delay (the heartbeat); each time it fires every sleeper is
//! counted down and the ones that are due are dispatched:
//!
//! - **interrupt class**: run straight away inside the heartbeat
//!   interrupt. They must be short.
//! - **cooperative class**: queued until the main loop calls
//!   [`Wakeup::poll`]. They may take as long as they like.
//!
//! One-shot sleepers leave the table once woken; repeating sleepers are
//! re-armed with their configured duration.
//!
//! Sleepers are identified by value, `(task, duration)`, not by handle.
//! Two registrations with the same task, context and duration are
//! indistinguishable to [`Wakeup::cancel`] and [`Wakeup::reset`].

pub mod config;
mod scheduler;
mod sleeper;
pub mod task;

pub use config::{WakeupConfig, WakeupConfigBuilder};
pub use scheduler::{Wakeup, DEFAULT_PENDING, DEFAULT_SLEEPERS};
pub use task::{Callback, Context, Task};

pub use ha_core::{wake_after, DispatchClass, HaError, HaResult, Recurrence, TimeUnit, WakeDuration};

/// Object-safe view of a scheduler
///
/// Lets the context switcher and the channels schedule work without
/// naming the timer type or table sizes.
pub trait Schedule: Sync {
    fn schedule(
        &self,
        task: Task,
        duration: WakeDuration,
        class: DispatchClass,
        recurrence: Recurrence,
    ) -> HaResult<()>;

    fn cancel(&self, task: Task, duration: WakeDuration) -> HaResult<()>;

    fn reset(&self, task: Task, duration: WakeDuration) -> HaResult<()>;

    /// Period at which channel daemons should run
    fn daemon_period_ms(&self) -> u32 {
        WakeupConfig::DEFAULT.daemon_period_ms
    }
}
