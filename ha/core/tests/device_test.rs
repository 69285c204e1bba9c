//! Device identity tests for ha-core

use ha_core::{DeviceRef, DeviceType, HaError};

#[test]
fn test_device_type_raw_codes() {
    assert_eq!(DeviceType::Touch.raw(), 0);
    assert_eq!(DeviceType::Motion.raw(), 4);
    assert_eq!(DeviceType::Relay.raw(), 12);
}

#[test]
fn test_device_ref_display() {
    let dev = DeviceRef::new(DeviceType::Touch, 4);
    assert_eq!(format!("{}", dev), "Touch#4");
}

#[test]
fn test_error_display() {
    assert_eq!(format!("{}", HaError::SchedulerFull), "No free wakeup slot");
    assert_ne!(HaError::ChannelBusy, HaError::ContextFull);
}
