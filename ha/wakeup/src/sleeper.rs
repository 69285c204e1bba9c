//! One occupied bunk in the wakeup table

use ha_core::{DispatchClass, Recurrence};

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sleeper {
    pub task: Task,
    pub class: DispatchClass,
    pub recurrence: Recurrence,
    /// Configured delay in ms; part of the cancel/reset match key
    pub duration_ms: u32,
    /// Time left before waking, in ms
    pub remaining_ms: u32,
}

impl Sleeper {
    pub fn new(task: Task, duration_ms: u32, class: DispatchClass, recurrence: Recurrence) -> Self {
        Self {
            task,
            class,
            recurrence,
            duration_ms,
            remaining_ms: duration_ms,
        }
    }

    pub fn matches(&self, task: &Task, duration_ms: u32) -> bool {
        self.task == *task && self.duration_ms == duration_ms
    }

    /// Deduct `ms`; returns true once the sleeper is due
    pub fn advance(&mut self, ms: u32) -> bool {
        self.remaining_ms = self.remaining_ms.saturating_sub(ms);
        self.remaining_ms == 0
    }

    pub fn rearm(&mut self) {
        self.remaining_ms = self.duration_ms;
    }
}
