#![cfg_attr(not(feature = "std"), no_std)]

//! HA Trace - best-effort diagnostics
//!
//! Capacity exhaustion, busy channels and unmapped interrupt lines are not
//! fatal, but they should leave a trail. Every such event is pushed into a
//! small global ring of [`DiagRecord`]s that the application can drain at
//! leisure, for example to a serial console.
//!
//! With the `defmt` feature each record is also mirrored to `defmt::warn!`.
//!
//! ```rust,no_run
//! use ha_trace::{diag, drain};
//!
//! diag!(ChannelBusy, 3);
//! drain(|rec| {
//!     let _ = rec;
//! });
//! ```

mod buffer;
mod macros;
mod types;

pub use buffer::TraceBuffer;
pub use types::{DiagKind, DiagRecord};

use core::cell::RefCell;
use critical_section::Mutex;

/// Records kept before the oldest is evicted
pub const TRACE_DEPTH: usize = 64;

static TRACE: Mutex<RefCell<TraceBuffer<TRACE_DEPTH>>> =
    Mutex::new(RefCell::new(TraceBuffer::new()));

/// Reset the global trace buffer
pub fn init() {
    critical_section::with(|cs| {
        TRACE.borrow_ref_mut(cs).init();
    });
}

/// Record a diagnostic; prefer the [`diag!`] macro
pub fn emit(kind: DiagKind, a: u16, b: u16) {
    let stored = critical_section::with(|cs| TRACE.borrow_ref_mut(cs).push(kind, a, b));

    #[cfg(feature = "defmt")]
    if let Some(record) = stored {
        defmt::warn!("{}", record);
    }
    #[cfg(not(feature = "defmt"))]
    let _ = stored;
}

/// Enable or disable one kind
pub fn set_filter(kind: DiagKind, enable: bool) {
    critical_section::with(|cs| {
        TRACE.borrow_ref_mut(cs).set_filter(kind, enable);
    });
}

/// Replace the whole filter mask
pub fn set_filter_mask(mask: u32) {
    critical_section::with(|cs| {
        TRACE.borrow_ref_mut(cs).set_filter_mask(mask);
    });
}

/// Take the oldest record
pub fn pop() -> Option<DiagRecord> {
    critical_section::with(|cs| TRACE.borrow_ref_mut(cs).pop())
}

/// Hand every buffered record to `f`, oldest first
///
/// Each record is removed inside its own short critical section; `f` itself
/// runs with interrupts enabled.
pub fn drain<F: FnMut(DiagRecord)>(mut f: F) {
    while let Some(record) = pop() {
        f(record);
    }
}

/// Buffered records of one kind
pub fn count(kind: DiagKind) -> usize {
    critical_section::with(|cs| TRACE.borrow_ref(cs).count(kind))
}

/// Records evicted before anyone read them
pub fn dropped() -> u32 {
    critical_section::with(|cs| TRACE.borrow_ref(cs).dropped())
}
