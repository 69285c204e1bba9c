//! External interrupt vectors to channel routing

use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;
use ha_core::{HaError, HaResult};
use ha_hal::{InterruptExpander, ShiftOut};
use ha_trace::diag;

use crate::channel::Channel;

/// External interrupt inputs on the controller board
pub const EXTERNAL_INTERRUPTS: usize = 6;

/// Something a hardware interrupt vector can be routed to
pub trait InterruptSource: Sync {
    fn on_interrupt(&self);
}

impl<S, P, E> InterruptSource for Channel<S, P, E>
where
    S: ShiftOut + Send,
    P: OutputPin + Send,
    E: InterruptExpander + Send,
{
    fn on_interrupt(&self) {
        Channel::on_interrupt(self);
    }
}

/// Interrupt number to channel table
///
/// The board glue binds each hardware vector to a plain function that calls
/// [`InterruptVectors::dispatch`] with its number:
///
/// ```rust,ignore
/// static VECTORS: InterruptVectors = InterruptVectors::new();
///
/// #[interrupt]
/// fn EXTI2() {
///     VECTORS.dispatch(2);
/// }
/// ```
pub struct InterruptVectors<const N: usize = EXTERNAL_INTERRUPTS> {
    routes: Mutex<Cell<[Option<&'static dyn InterruptSource>; N]>>,
}

impl<const N: usize> InterruptVectors<N> {
    pub const fn new() -> Self {
        Self {
            routes: Mutex::new(Cell::new([None; N])),
        }
    }

    /// Route interrupt `vector` to `source`, replacing any previous route
    pub fn register(&self, vector: u8, source: &'static dyn InterruptSource) -> HaResult<()> {
        self.set(vector, Some(source))
    }

    pub fn unregister(&self, vector: u8) -> HaResult<()> {
        self.set(vector, None)
    }

    pub fn is_registered(&self, vector: u8) -> bool {
        self.route(vector).is_some()
    }

    fn set(&self, vector: u8, source: Option<&'static dyn InterruptSource>) -> HaResult<()> {
        let index = usize::from(vector);
        if index >= N {
            diag!(VectorOutOfRange, vector, N);
            return Err(HaError::InvalidConfig);
        }
        critical_section::with(|cs| {
            let routes = self.routes.borrow(cs);
            let mut table = routes.get();
            table[index] = source;
            routes.set(table);
        });
        Ok(())
    }

    fn route(&self, vector: u8) -> Option<&'static dyn InterruptSource> {
        critical_section::with(|cs| {
            self.routes
                .borrow(cs)
                .get()
                .get(usize::from(vector))
                .copied()
                .flatten()
        })
    }

    /// Body of hardware vector `vector`
    pub fn dispatch(&self, vector: u8) {
        match self.route(vector) {
            Some(source) => source.on_interrupt(),
            None => diag!(SpuriousInterrupt, vector),
        }
    }
}

impl<const N: usize> Default for InterruptVectors<N> {
    fn default() -> Self {
        Self::new()
    }
}
