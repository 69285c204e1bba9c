//! Simulated heartbeat timer for host tests

use core::cell::Cell;

use critical_section::Mutex;
use ha_hal::{HalResult, HeartbeatTimer};

#[derive(Clone, Copy, Default)]
struct ClockState {
    interval_us: u32,
    elapsed_us: u32,
    running: bool,
    handler: Option<fn()>,
}

/// Time source shared between a test and the timer it hands to `Wakeup`
pub struct Clock {
    state: Mutex<Cell<ClockState>>,
}

impl Clock {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(ClockState {
                interval_us: 0,
                elapsed_us: 0,
                running: false,
                handler: None,
            })),
        }
    }

    fn get(&self) -> ClockState {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    fn update(&self, f: impl FnOnce(&mut ClockState)) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut s = cell.get();
            f(&mut s);
            cell.set(s);
        });
    }

    pub fn running(&self) -> bool {
        self.get().running
    }

    pub fn interval_us(&self) -> u32 {
        self.get().interval_us
    }

    /// Let `ms` of wall time pass, firing the handler at each interval
    pub fn advance_ms(&self, ms: u32) {
        let mut left = ms * 1_000;
        while left > 0 {
            let s = self.get();
            if !s.running || s.interval_us == 0 {
                return;
            }
            let to_fire = s.interval_us - s.elapsed_us.min(s.interval_us);
            if left < to_fire {
                self.update(|s| s.elapsed_us += left);
                return;
            }
            left -= to_fire;
            // Periodic: the counter wraps by itself even if nobody re-attaches
            self.update(|s| s.elapsed_us = 0);
            if let Some(handler) = s.handler {
                handler();
            }
        }
    }
}

pub struct SimTimer(pub &'static Clock);

impl HeartbeatTimer for SimTimer {
    fn attach(&mut self, interval_us: u32, handler: fn()) -> HalResult<()> {
        self.0.update(|s| {
            s.interval_us = interval_us;
            s.elapsed_us = 0;
            s.handler = Some(handler);
        });
        Ok(())
    }

    fn start(&mut self) -> HalResult<()> {
        self.0.update(|s| s.running = true);
        Ok(())
    }

    fn stop(&mut self) -> HalResult<()> {
        self.0.update(|s| s.running = false);
        Ok(())
    }

    fn elapsed_us(&self) -> u32 {
        self.0.get().elapsed_us
    }
}
