//! Global trace buffer tests
//!
//! Everything touching the global buffer lives in one test so the default
//! parallel runner cannot interleave with it.

use ha_trace::{diag, DiagKind};

#[test]
fn test_global_trace_lifecycle() {
    ha_trace::init();

    diag!(ChannelBusy);
    diag!(PinOutOfRange, 130, 128);
    assert_eq!(ha_trace::count(DiagKind::PinOutOfRange), 1);

    ha_trace::set_filter(DiagKind::RangeMiss, false);
    diag!(RangeMiss, 40);
    assert_eq!(ha_trace::count(DiagKind::RangeMiss), 0);

    let mut seen = Vec::new();
    ha_trace::drain(|rec| seen.push(rec));
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind, DiagKind::ChannelBusy);
    assert_eq!((seen[1].a, seen[1].b), (130, 128));
    assert_eq!(format!("{}", seen[1]), "[1] pin OOB (130, 128)");
    assert!(ha_trace::pop().is_none());

    for _ in 0..ha_trace::TRACE_DEPTH + 3 {
        diag!(SpuriousInterrupt);
    }
    assert_eq!(ha_trace::dropped(), 3);

    ha_trace::init();
    assert_eq!(ha_trace::dropped(), 0);
}
