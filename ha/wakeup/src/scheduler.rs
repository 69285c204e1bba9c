//! The wakeup table, its pending queues and the heartbeat

use core::cell::{Cell, RefCell};

use critical_section::{CriticalSection, Mutex};
use ha_core::{DispatchClass, HaError, HaResult, Recurrence, WakeDuration};
use ha_hal::HeartbeatTimer;
use ha_trace::diag;
use heapless::{Deque, Vec};

use crate::config::WakeupConfig;
use crate::sleeper::Sleeper;
use crate::task::Task;
use crate::Schedule;

/// Sleeper table capacity used when none is given
pub const DEFAULT_SLEEPERS: usize = 32;
/// Pending queue depth used when none is given
pub const DEFAULT_PENDING: usize = 16;

struct State<T, const S: usize, const P: usize> {
    timer: T,
    config: WakeupConfig,
    /// Platform vector that calls `on_heartbeat`; set by `init`
    isr: Option<fn()>,
    sleepers: Vec<Sleeper, S>,
    /// Woken cooperative tasks, oldest first
    cooperative: Deque<Task, P>,
    /// Woken interrupt-class tasks awaiting dispatch in this heartbeat
    interrupt: Deque<Task, P>,
    /// Current heartbeat in ms; 0 while the timer is stopped
    heartbeat_ms: u32,
}

impl<T: HeartbeatTimer, const S: usize, const P: usize> State<T, S, P> {
    /// Charge the part of the current heartbeat already spent to every sleeper
    fn deduct_elapsed(&mut self) {
        if self.sleepers.is_empty() {
            return;
        }
        let elapsed_ms = self.timer.elapsed_us() / 1_000;
        if elapsed_ms > 0 {
            for sleeper in self.sleepers.iter_mut() {
                sleeper.advance(elapsed_ms);
            }
        }
    }

    /// Program the timer for the lightest sleeper, or stop it if none remain
    fn start_heartbeat(&mut self) -> HaResult<()> {
        if self.sleepers.is_empty() {
            self.heartbeat_ms = 0;
            self.timer.stop()?;
            return Ok(());
        }

        let isr = self.isr.ok_or(HaError::InvalidConfig)?;
        // A sleeper already due (remaining 0) wakes on the shortest beat
        let heartbeat = self
            .sleepers
            .iter()
            .map(|s| s.remaining_ms.max(1))
            .min()
            .unwrap_or(self.config.max_heartbeat_ms)
            .min(self.config.max_heartbeat_ms);

        self.heartbeat_ms = heartbeat;
        let interval = self.config.interval_us(heartbeat, self.sleepers.len());
        self.timer.attach(interval, isr)?;
        self.timer.start()?;
        Ok(())
    }

    /// Queue `task`; false if its queue is full
    fn enqueue(&mut self, task: Task, class: DispatchClass) -> bool {
        let queue = match class {
            DispatchClass::Interrupt => &mut self.interrupt,
            DispatchClass::Cooperative => &mut self.cooperative,
        };
        if queue.push_back(task).is_err() {
            diag!(PendingOverflow, class as u8, P);
            return false;
        }
        true
    }

    /// Count everybody down by `ms` and move the due to their queues
    ///
    /// A due sleeper whose queue is full keeps its bunk with nothing left
    /// to wait and is offered again on the next pass. Returns true if an
    /// interrupt-class sleeper was held back that way.
    fn collect_due(&mut self, ms: u32) -> bool {
        let mut held_back = false;
        let mut i = 0;
        while i < self.sleepers.len() {
            let sleeper = &mut self.sleepers[i];
            if !sleeper.advance(ms) {
                i += 1;
                continue;
            }

            let (task, class) = (sleeper.task, sleeper.class);
            if !self.enqueue(task, class) {
                held_back |= class == DispatchClass::Interrupt;
                i += 1;
                continue;
            }

            let sleeper = &mut self.sleepers[i];
            if sleeper.recurrence.is_repeating() {
                sleeper.rearm();
                i += 1;
            } else {
                // Last bunk moves into this one; index i is examined again
                self.sleepers.swap_remove(i);
            }
        }
        held_back
    }

    fn position(&self, task: &Task, duration: WakeDuration) -> HaResult<usize> {
        let duration_ms = duration.as_millis().ok_or(HaError::NotFound)?;
        self.sleepers
            .iter()
            .position(|s| s.matches(task, duration_ms))
            .ok_or(HaError::NotFound)
    }
}

/// Heartbeat-driven wakeup scheduler
///
/// Holds up to `S` sleepers and up to `P` woken tasks per dispatch class.
/// Meant to live in a `static`; every method takes `&self` and guards the
/// tables with a critical section.
///
/// ```rust,ignore
/// static WAKEUP: Wakeup<Timer1> = Wakeup::new(Timer1::new(), WakeupConfig::DEFAULT);
///
/// fn timer1_isr() {
///     WAKEUP.on_heartbeat();
/// }
///
/// WAKEUP.init(timer1_isr)?;
/// WAKEUP.schedule(Task::bare(blink), wake_after!(500 ms), DispatchClass::Cooperative, Recurrence::Repeating)?;
/// loop {
///     WAKEUP.poll();
///     WAKEUP.idle();
/// }
/// ```
pub struct Wakeup<T, const S: usize = DEFAULT_SLEEPERS, const P: usize = DEFAULT_PENDING> {
    state: Mutex<RefCell<State<T, S, P>>>,
    /// Set while interrupt-class tasks are being dispatched
    in_isr: Mutex<Cell<bool>>,
}

impl<T: HeartbeatTimer, const S: usize, const P: usize> Wakeup<T, S, P> {
    pub const fn new(timer: T, config: WakeupConfig) -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                timer,
                config,
                isr: None,
                sleepers: Vec::new(),
                cooperative: Deque::new(),
                interrupt: Deque::new(),
                heartbeat_ms: 0,
            })),
            in_isr: Mutex::new(Cell::new(false)),
        }
    }

    /// Bind the heartbeat vector and empty every table
    ///
    /// `heartbeat_isr` is the platform interrupt handler of the timer; it
    /// must do nothing but call [`Wakeup::on_heartbeat`] on this instance.
    pub fn init(&self, heartbeat_isr: fn()) -> HaResult<()> {
        critical_section::with(|cs| {
            let mut st = self.state.borrow_ref_mut(cs);
            st.isr = Some(heartbeat_isr);
            st.sleepers.clear();
            st.cooperative.clear();
            st.interrupt.clear();
            st.heartbeat_ms = 0;
            self.in_isr.borrow(cs).set(false);
            st.timer.stop()?;
            Ok(())
        })
    }

    /// Put `task` to sleep for `duration`
    ///
    /// On failure nothing changes: the table, the heartbeat and the timer
    /// are left as they were.
    pub fn schedule(
        &self,
        task: Task,
        duration: WakeDuration,
        class: DispatchClass,
        recurrence: Recurrence,
    ) -> HaResult<()> {
        let Some(duration_ms) = duration.as_millis() else {
            diag!(InvalidDuration, duration.value(), duration.value() >> 16);
            return Err(HaError::InvalidDuration);
        };

        critical_section::with(|cs| {
            let mut st = self.state.borrow_ref_mut(cs);
            if st.isr.is_none() {
                return Err(HaError::InvalidConfig);
            }
            if st.sleepers.is_full() {
                diag!(SchedulerFull, S);
                return Err(HaError::SchedulerFull);
            }

            let before = (st.sleepers.clone(), st.heartbeat_ms);
            st.deduct_elapsed();
            let sleeper = Sleeper::new(task, duration_ms, class, recurrence);
            st.sleepers
                .push(sleeper)
                .map_err(|_| HaError::SchedulerFull)?;

            if let Err(err) = st.start_heartbeat() {
                // The old beat still runs and will charge the elapsed part
                st.sleepers = before.0;
                st.heartbeat_ms = before.1;
                return Err(err);
            }
            Ok(())
        })
    }

    /// Remove the sleeper registered with exactly this task and duration
    pub fn cancel(&self, task: Task, duration: WakeDuration) -> HaResult<()> {
        critical_section::with(|cs| {
            let mut st = self.state.borrow_ref_mut(cs);
            let Ok(index) = st.position(&task, duration) else {
                diag!(WakeupMiss, duration.value());
                return Err(HaError::NotFound);
            };
            st.deduct_elapsed();
            st.sleepers.swap_remove(index);
            st.start_heartbeat()
        })
    }

    /// Restart the matching sleeper's countdown from its full duration
    pub fn reset(&self, task: Task, duration: WakeDuration) -> HaResult<()> {
        critical_section::with(|cs| {
            let mut st = self.state.borrow_ref_mut(cs);
            let Ok(index) = st.position(&task, duration) else {
                diag!(WakeupMiss, duration.value());
                return Err(HaError::NotFound);
            };
            st.deduct_elapsed();
            st.sleepers[index].rearm();
            st.start_heartbeat()
        })
    }

    /// Run every woken cooperative task, oldest first
    ///
    /// Call from the main loop as often as possible. Does nothing when
    /// invoked from an interrupt-class task. Returns how many tasks ran.
    pub fn poll(&self) -> usize {
        if critical_section::with(|cs| self.in_isr.borrow(cs).get()) {
            return 0;
        }

        let mut ran = 0;
        // The queue may grow while we drain it
        while let Some(task) =
            critical_section::with(|cs| self.state.borrow_ref_mut(cs).cooperative.pop_front())
        {
            task.run();
            ran += 1;
        }
        ran
    }

    /// Heartbeat handler; call from the timer interrupt only
    ///
    /// Interrupt-class tasks that woke run here, inside the critical
    /// section, before returning. Keep them short. Due interrupt-class
    /// sleepers beyond the queue depth run in the same beat once the queue
    /// drains; cooperative ones left over wait for the next beat.
    pub fn on_heartbeat(&self) {
        critical_section::with(|cs| {
            let mut held_back = {
                let mut st = self.state.borrow_ref_mut(cs);
                let beat = st.heartbeat_ms;
                st.collect_due(beat)
            };

            let in_isr = self.in_isr.borrow(cs);
            in_isr.set(true);
            loop {
                while let Some(task) = self.next_interrupt_task(cs) {
                    task.run();
                }
                if !held_back {
                    break;
                }
                // The queue is empty again; take the ones that did not fit
                held_back = self.state.borrow_ref_mut(cs).collect_due(0);
            }
            in_isr.set(false);

            // Interrupt context: nothing to report a timer failure to
            let _ = self.state.borrow_ref_mut(cs).start_heartbeat();
        });
    }

    fn next_interrupt_task(&self, cs: CriticalSection<'_>) -> Option<Task> {
        self.state.borrow_ref_mut(cs).interrupt.pop_front()
    }

    /// Sleep the core until the next interrupt if nothing is waiting to run
    pub fn idle(&self) {
        critical_section::with(|cs| {
            if self.state.borrow_ref(cs).cooperative.is_empty() {
                // WFI wakes on a pending interrupt even while masked
                #[cfg(feature = "cortex-m")]
                cortex_m::asm::wfi();
            }
        });
    }

    /// Number of empty bunks
    pub fn free_slots(&self) -> usize {
        critical_section::with(|cs| S - self.state.borrow_ref(cs).sleepers.len())
    }

    /// Number of occupied bunks
    pub fn sleepers(&self) -> usize {
        critical_section::with(|cs| self.state.borrow_ref(cs).sleepers.len())
    }

    /// Cooperative tasks woken but not yet run
    pub fn pending(&self) -> usize {
        critical_section::with(|cs| self.state.borrow_ref(cs).cooperative.len())
    }

    /// Current heartbeat, `None` while the timer is stopped
    pub fn heartbeat_ms(&self) -> Option<u32> {
        critical_section::with(|cs| match self.state.borrow_ref(cs).heartbeat_ms {
            0 => None,
            ms => Some(ms),
        })
    }

    pub fn config(&self) -> WakeupConfig {
        critical_section::with(|cs| self.state.borrow_ref(cs).config)
    }
}

impl<T: HeartbeatTimer + Send, const S: usize, const P: usize> Schedule for Wakeup<T, S, P> {
    fn schedule(
        &self,
        task: Task,
        duration: WakeDuration,
        class: DispatchClass,
        recurrence: Recurrence,
    ) -> HaResult<()> {
        Wakeup::schedule(self, task, duration, class, recurrence)
    }

    fn cancel(&self, task: Task, duration: WakeDuration) -> HaResult<()> {
        Wakeup::cancel(self, task, duration)
    }

    fn reset(&self, task: Task, duration: WakeDuration) -> HaResult<()> {
        Wakeup::reset(self, task, duration)
    }

    fn daemon_period_ms(&self) -> u32 {
        self.config().daemon_period_ms
    }
}
