//! Cost of one heartbeat with a full sleeper table

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ha_hal::{HalResult, HeartbeatTimer};
use ha_wakeup::{Context, DispatchClass, Recurrence, Task, WakeDuration, Wakeup, WakeupConfig};

struct FreeRunning;

impl HeartbeatTimer for FreeRunning {
    fn attach(&mut self, _interval_us: u32, _handler: fn()) -> HalResult<()> {
        Ok(())
    }
    fn start(&mut self) -> HalResult<()> {
        Ok(())
    }
    fn stop(&mut self) -> HalResult<()> {
        Ok(())
    }
    fn elapsed_us(&self) -> u32 {
        0
    }
}

static WAKEUP: Wakeup<FreeRunning> = Wakeup::new(FreeRunning, WakeupConfig::DEFAULT);

fn heartbeat_isr() {
    WAKEUP.on_heartbeat();
}

fn sink(ctx: Context) {
    black_box(ctx);
}

fn bench_heartbeat(c: &mut Criterion) {
    WAKEUP.init(heartbeat_isr).unwrap();
    // Staggered repeaters so a few wake on most beats
    for i in 0..32u32 {
        let task = Task::with_context(sink, Context(i as usize));
        let class = if i % 2 == 0 {
            DispatchClass::Interrupt
        } else {
            DispatchClass::Cooperative
        };
        WAKEUP
            .schedule(task, WakeDuration::from_millis(10 + i * 7), class, Recurrence::Repeating)
            .unwrap();
    }

    c.bench_function("heartbeat_32_sleepers", |b| {
        b.iter(|| {
            WAKEUP.on_heartbeat();
            black_box(WAKEUP.poll());
        })
    });
}

criterion_group!(benches, bench_heartbeat);
criterion_main!(benches);
