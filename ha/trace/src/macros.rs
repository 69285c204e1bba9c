//! Diagnostic macros

/// Record a diagnostic by kind name
///
/// ```rust,ignore
/// diag!(ChannelBusy);
/// diag!(PinOutOfRange, pin, max_pins);
/// ```
#[macro_export]
macro_rules! diag {
    ($kind:ident) => {
        $crate::emit($crate::DiagKind::$kind, 0, 0)
    };
    ($kind:ident, $a:expr) => {
        $crate::emit($crate::DiagKind::$kind, ($a) as u16, 0)
    };
    ($kind:ident, $a:expr, $b:expr) => {
        $crate::emit($crate::DiagKind::$kind, ($a) as u16, ($b) as u16)
    };
}
