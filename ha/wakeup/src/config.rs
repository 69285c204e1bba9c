//! Scheduler configuration

/// Tunables of the wakeup scheduler
///
/// Table capacities are const generics on [`crate::Wakeup`]; this struct
/// carries the run-time timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeupConfig {
    /// Longest heartbeat the timer is programmed for, in milliseconds.
    /// Bounded by the 16-bit timer at its slowest prescaler.
    pub max_heartbeat_ms: u32,
    /// Time the heartbeat handler spends per sleeper, in microseconds.
    /// Subtracted from each programmed interval to stop the schedule drifting.
    pub code_overhead_us: u32,
    /// Period of channel daemons, in milliseconds
    pub daemon_period_ms: u32,
}

impl WakeupConfig {
    pub const DEFAULT: Self = Self {
        max_heartbeat_ms: 8_350,
        code_overhead_us: 8,
        daemon_period_ms: 100,
    };

    /// Creates a new configuration builder.
    pub const fn builder() -> WakeupConfigBuilder {
        WakeupConfigBuilder {
            config: Self::DEFAULT,
        }
    }

    /// Timer interval for a heartbeat with `sleepers` active entries
    pub const fn interval_us(&self, heartbeat_ms: u32, sleepers: usize) -> u32 {
        let overhead = self.code_overhead_us.saturating_mul(sleepers as u32);
        let interval = heartbeat_ms.saturating_mul(1_000).saturating_sub(overhead);
        if interval == 0 {
            1
        } else {
            interval
        }
    }
}

impl Default for WakeupConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Builder for [`WakeupConfig`], usable in `const` context
#[derive(Debug, Clone, Copy)]
pub struct WakeupConfigBuilder {
    config: WakeupConfig,
}

impl WakeupConfigBuilder {
    /// Sets the heartbeat ceiling. Zero is raised to 1 ms.
    pub const fn max_heartbeat_ms(mut self, ms: u32) -> Self {
        self.config.max_heartbeat_ms = if ms == 0 { 1 } else { ms };
        self
    }

    /// Sets the per-sleeper handler overhead.
    pub const fn code_overhead_us(mut self, us: u32) -> Self {
        self.config.code_overhead_us = us;
        self
    }

    /// Sets the channel daemon period. Zero is raised to 1 ms.
    pub const fn daemon_period_ms(mut self, ms: u32) -> Self {
        self.config.daemon_period_ms = if ms == 0 { 1 } else { ms };
        self
    }

    pub const fn build(self) -> WakeupConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        const CFG: WakeupConfig = WakeupConfig::builder()
            .max_heartbeat_ms(200)
            .code_overhead_us(0)
            .build();

        assert_eq!(CFG.max_heartbeat_ms, 200);
        assert_eq!(CFG.code_overhead_us, 0);
        assert_eq!(CFG.daemon_period_ms, 100);
    }

    #[test]
    fn test_interval_deducts_overhead() {
        let cfg = WakeupConfig::DEFAULT;
        assert_eq!(cfg.interval_us(100, 0), 100_000);
        assert_eq!(cfg.interval_us(100, 4), 100_000 - 32);
        assert_eq!(cfg.interval_us(0, 4), 1);
    }
}
