//! Channel daemon driven by the wakeup scheduler and the vector table
//!
//! One test per binary: the daemon occupies a slot of the global context
//! registry.

mod common;

use common::{Call, Devices, ExpanderState, MockExpander};
use ha_channels::{
    Alert, Channel, DeviceRef, DeviceType, InterruptRange, InterruptVectors, Protocol, Unwired,
};
use ha_hal::{HalResult, HeartbeatTimer};
use ha_switcher::ParticipantKind;
use ha_wakeup::{Wakeup, WakeupConfig};

/// Timer that never fires by itself; the test calls the heartbeat
struct ManualTimer;

impl HeartbeatTimer for ManualTimer {
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

static WAKEUP: Wakeup<ManualTimer> = Wakeup::new(ManualTimer, WakeupConfig::DEFAULT);
static VECTORS: InterruptVectors = InterruptVectors::new();
static EXP: ExpanderState = ExpanderState::new();
static DEVICES: Devices = Devices::new();
static SENSORS: Channel<Unwired, Unwired, MockExpander> = Channel::new(Protocol::Spi, 16);

fn heartbeat() {
    WAKEUP.on_heartbeat();
}

#[test]
fn test_daemon_delivers_on_each_period() {
    ha_switcher::init();
    WAKEUP.init(heartbeat).unwrap();

    SENSORS
        .set_alert(
            Alert::Cascade16 {
                controller: MockExpander(&EXP),
                select: 10,
            },
            &DEVICES,
        )
        .unwrap();
    SENSORS
        .register_device_range(0, InterruptRange::new(0, 16, DeviceType::Motion, 0))
        .unwrap();

    let daemon = SENSORS.start_daemon(&WAKEUP).unwrap();
    assert_eq!(ha_switcher::kind(daemon), Some(ParticipantKind::Channel));
    assert_eq!(WAKEUP.heartbeat_ms(), Some(WakeupConfig::DEFAULT.daemon_period_ms));

    VECTORS.register(2, &SENSORS).unwrap();
    EXP.fire(1 << 4);
    VECTORS.dispatch(2);
    assert_eq!(SENSORS.pending_lines(), 1);

    // The daemon wakes cooperatively: nothing happens inside the heartbeat
    heartbeat();
    assert!(DEVICES.calls().is_empty());
    assert_eq!(WAKEUP.poll(), 1);
    assert_eq!(
        DEVICES.calls(),
        vec![Call::FollowUp(DeviceRef::new(DeviceType::Motion, 4), 4)]
    );
    assert!(EXP.is_enabled(4));

    // Repeating: still booked, runs again next period with nothing to do
    assert_eq!(WAKEUP.sleepers(), 1);
    heartbeat();
    assert_eq!(WAKEUP.poll(), 1);
    assert_eq!(DEVICES.calls().len(), 1);
    assert_eq!(ha_switcher::kind(daemon), Some(ParticipantKind::Channel));
}
