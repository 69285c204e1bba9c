#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # HA Switcher
//!
//! The wakeup scheduler calls plain functions with one opaque word. The
//! switcher lets it call *methods* instead: a [`Participant`] (a channel,
//! device or zone object) and a byte argument are parked in a context slot,
//! and the slot index becomes the word handed to the scheduler together
//! with the [`switcher`] trampoline. When the sleeper wakes the trampoline
//! looks the slot up and invokes the participant.
//!
//! A slot is released after its first dispatch unless it was saved as
//! repeating.
//!
//! ```rust,ignore
//! static HEATER: Heater = Heater::new();
//!
//! let id = schedule_context(
//!     &WAKEUP,
//!     Participant::Device(&HEATER),
//!     PHASE_READ,
//!     wake_after!(750 ms),
//!     DispatchClass::Cooperative,
//!     Recurrence::OneShot,
//! )?;
//! ```

mod participant;
mod table;

pub use participant::{ChannelTarget, DeviceTarget, Participant, ParticipantKind, ZoneTarget};
pub use table::{ContextId, ContextTable};

use core::cell::RefCell;

use critical_section::Mutex;
use ha_core::{DispatchClass, HaResult, Recurrence, WakeDuration};
use ha_trace::diag;
use ha_wakeup::{Context, Schedule, Task, DEFAULT_SLEEPERS};

/// One context slot per possible sleeper
pub const MAX_CONTEXTS: usize = DEFAULT_SLEEPERS;

static CONTEXTS: Mutex<RefCell<ContextTable<MAX_CONTEXTS>>> =
    Mutex::new(RefCell::new(ContextTable::new()));

/// Run `f` with exclusive access to the global context table
pub fn with_contexts<F, R>(f: F) -> R
where
    F: FnOnce(&mut ContextTable<MAX_CONTEXTS>) -> R,
{
    critical_section::with(|cs| {
        let mut table = CONTEXTS.borrow_ref_mut(cs);
        f(&mut table)
    })
}

/// Release every context slot
pub fn init() {
    with_contexts(|table| table.clear());
}

/// Park `participant` and `arg` in a free slot
pub fn save(participant: Participant, arg: u8, repeat: bool) -> HaResult<ContextId> {
    let saved = with_contexts(|table| table.save(participant, arg, repeat));
    if saved.is_err() {
        diag!(ContextFull, MAX_CONTEXTS);
    }
    saved
}

/// Rebind an occupied slot to another participant of the same kind
pub fn update(id: ContextId, participant: Participant, arg: u8, repeat: bool) -> HaResult<()> {
    with_contexts(|table| table.update(id, participant, arg, repeat))
}

pub fn free(id: ContextId) -> HaResult<()> {
    with_contexts(|table| table.free(id))
}

/// Kind of participant parked in `id`, if any
pub fn kind(id: ContextId) -> Option<ParticipantKind> {
    with_contexts(|table| table.kind(id))
}

pub fn free_slots() -> usize {
    with_contexts(|table| table.free_slots())
}

/// Invoke the participant parked in `id`
///
/// The slot is copied out (and freed unless repeating) before the call, so
/// the participant may save or free contexts itself.
pub fn dispatch(id: ContextId) {
    match with_contexts(|table| table.take(id)) {
        Some((participant, arg)) => participant.invoke(arg),
        None => diag!(StaleContext, id.0),
    }
}

/// Trampoline handed to the scheduler
pub fn switcher(ctx: Context) {
    dispatch(ContextId::from(ctx));
}

/// The scheduler task that dispatches `id`
pub fn context_task(id: ContextId) -> Task {
    Task::with_context(switcher, id.into())
}

/// Save a context and schedule its dispatch in one step
///
/// The slot repeats exactly when the sleeper does. If the scheduler refuses
/// the sleeper the slot is released again.
pub fn schedule_context(
    scheduler: &dyn Schedule,
    participant: Participant,
    arg: u8,
    duration: WakeDuration,
    class: DispatchClass,
    recurrence: Recurrence,
) -> HaResult<ContextId> {
    let id = save(participant, arg, recurrence.is_repeating())?;
    match scheduler.schedule(context_task(id), duration, class, recurrence) {
        Ok(()) => Ok(id),
        Err(err) => {
            let _ = free(id);
            Err(err)
        }
    }
}

/// Cancel a sleeper set up by [`schedule_context`] and release its slot
pub fn cancel_context(scheduler: &dyn Schedule, id: ContextId, duration: WakeDuration) -> HaResult<()> {
    scheduler.cancel(context_task(id), duration)?;
    free(id)
}
