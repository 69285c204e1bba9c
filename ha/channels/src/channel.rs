//! The channel object

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;
use ha_core::{DeviceRef, DispatchClass, HaError, HaResult, Recurrence, WakeDuration};
use ha_hal::{Edge, InterruptExpander, Level, ShiftOut};
use ha_switcher::{schedule_context, ChannelTarget, ContextId, Participant};
use ha_trace::diag;
use ha_wakeup::Schedule;

use crate::access::{Access, AccessState, Unwired, SHADOW_BYTES};
use crate::alert::{Alert, AlertState, Captured};
use crate::range::InterruptRange;

/// Largest number of virtual pins on one channel
pub const MAX_PINS: u8 = 128;

/// Highest serial port index a channel may sit on
pub const MAX_SERIAL_PORT: u8 = 3;

/// Bus a channel's devices talk over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Direct,
    Serial { port: u8 },
    Spi,
    I2c,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Protocol {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Direct => defmt::write!(fmt, "Direct"),
            Self::Serial { port } => defmt::write!(fmt, "Serial({})", port),
            Self::Spi => defmt::write!(fmt, "Spi"),
            Self::I2c => defmt::write!(fmt, "I2c"),
        }
    }
}

/// Device side of an interrupt
pub trait DeviceHandler: Sync {
    /// Called from interrupt context on a single-alert channel; keep it short
    fn quick(&self, device: DeviceRef, line: u16);

    /// Called from the channel daemon for every serviced line
    fn follow_up(&self, device: DeviceRef, line: u16);
}

/// A group of devices sharing a bus, a pin access scheme and an interrupt
///
/// Lives in a `static`: built with the `const` [`Channel::new`], configured
/// once at boot through `&self`, then shared between the interrupt handler
/// and the daemon.
pub struct Channel<S = Unwired, P = Unwired, E = Unwired> {
    protocol: Protocol,
    max_pins: u8,
    locked: Mutex<Cell<bool>>,
    interrupts: Mutex<Cell<u32>>,
    handler: Mutex<Cell<Option<&'static dyn DeviceHandler>>>,
    access: Mutex<RefCell<AccessState<S, P>>>,
    alert: Mutex<RefCell<AlertState<E>>>,
}

/// Holds a channel's lock until dropped
pub struct ChannelGuard<'a, S, P, E> {
    channel: &'a Channel<S, P, E>,
}

impl<S, P, E> Drop for ChannelGuard<'_, S, P, E> {
    fn drop(&mut self) {
        self.channel.unlock();
    }
}

impl<S, P, E> Channel<S, P, E> {
    /// An unconfigured channel: direct access, no alert
    pub const fn new(protocol: Protocol, max_pins: u8) -> Self {
        Self {
            protocol,
            max_pins,
            locked: Mutex::new(Cell::new(false)),
            interrupts: Mutex::new(Cell::new(0)),
            handler: Mutex::new(Cell::new(None)),
            access: Mutex::new(RefCell::new(AccessState::Direct)),
            alert: Mutex::new(RefCell::new(AlertState::None)),
        }
    }

    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub const fn max_pins(&self) -> u8 {
        self.max_pins
    }

    /// Check pin count and serial port index
    pub fn validate(&self) -> HaResult<()> {
        let pins_ok = self.max_pins > 0 && self.max_pins <= MAX_PINS;
        let port_ok = match self.protocol {
            Protocol::Serial { port } => port <= MAX_SERIAL_PORT,
            _ => true,
        };
        if pins_ok && port_ok {
            Ok(())
        } else {
            diag!(BadConfig, self.max_pins);
            Err(HaError::InvalidConfig)
        }
    }

    /// Take the channel lock; `false` if it is already held
    pub fn lock(&self) -> bool {
        critical_section::with(|cs| {
            let locked = self.locked.borrow(cs);
            if locked.get() {
                false
            } else {
                locked.set(true);
                true
            }
        })
    }

    pub fn unlock(&self) {
        critical_section::with(|cs| self.locked.borrow(cs).set(false));
    }

    pub fn is_locked(&self) -> bool {
        critical_section::with(|cs| self.locked.borrow(cs).get())
    }

    /// Take the lock for the lifetime of the returned guard
    pub fn try_acquire(&self) -> Option<ChannelGuard<'_, S, P, E>> {
        self.lock().then(|| ChannelGuard { channel: self })
    }

    /// Hardware interrupts taken since boot
    pub fn interrupt_count(&self) -> u32 {
        critical_section::with(|cs| self.interrupts.borrow(cs).get())
    }

    fn handler(&self) -> Option<&'static dyn DeviceHandler> {
        critical_section::with(|cs| self.handler.borrow(cs).get())
    }

    fn check_pin(&self, pin: u8) -> HaResult<()> {
        if pin < self.max_pins {
            Ok(())
        } else {
            diag!(PinOutOfRange, pin, self.max_pins);
            Err(HaError::PinOutOfRange)
        }
    }
}

impl<S, P, E> Channel<S, P, E>
where
    S: ShiftOut,
    P: OutputPin,
    E: InterruptExpander,
{
    pub fn set_access(&self, access: Access<S, P>) -> HaResult<()> {
        self.validate()?;
        let state = AccessState::from_access(access, self.max_pins);
        critical_section::with(|cs| self.access.replace(cs, state));
        Ok(())
    }

    /// Bring up the interrupt controllers and route their lines to `handler`
    ///
    /// Any previously registered interrupt ranges are dropped.
    pub fn set_alert(&self, alert: Alert<E>, handler: &'static dyn DeviceHandler) -> HaResult<()> {
        self.validate()?;
        let state = AlertState::begin(alert).map_err(|err| {
            diag!(ControllerFault);
            HaError::from(err)
        })?;
        critical_section::with(|cs| {
            self.alert.replace(cs, state);
            self.handler.borrow(cs).set(Some(handler));
        });
        Ok(())
    }

    /// Install interrupt range `index` (0..4)
    pub fn register_device_range(&self, index: usize, range: InterruptRange) -> HaResult<()> {
        let registered = critical_section::with(|cs| self.alert.borrow_ref_mut(cs).register(index, range));
        match registered {
            Err(HaError::RangeOutOfBounds) => diag!(RangeOutOfBounds, index),
            Err(_) => diag!(BadConfig, range.line_start, range.line_count),
            Ok(()) => {}
        }
        registered
    }

    pub fn device_range(&self, index: usize) -> Option<InterruptRange> {
        critical_section::with(|cs| self.alert.borrow_ref(cs).range(index))
    }

    /// Route the shared I/O pin of a multiplexed channel to `pin`
    ///
    /// Only the holder of the channel lock may move the muxes.
    pub fn enable_pin(&self, guard: &ChannelGuard<'_, S, P, E>, pin: u8) -> HaResult<()> {
        if !core::ptr::eq(guard.channel, self) {
            return Err(HaError::ChannelBusy);
        }
        self.check_pin(pin)?;
        critical_section::with(|cs| self.access.borrow_ref_mut(cs).select(pin))
    }

    /// Drive a virtual pin
    ///
    /// Multiplexed channels select the pin under the channel lock and drive
    /// the shared I/O line. Latched power channels update one bit of the
    /// shadow vector and shift the whole vector out again; they take no lock.
    pub fn write(&self, pin: u8, level: Level) -> HaResult<()> {
        self.check_pin(pin)?;
        let multiplexed = critical_section::with(|cs| {
            matches!(*self.access.borrow_ref(cs), AccessState::Multiplexed { .. })
        });

        if !multiplexed {
            return critical_section::with(|cs| self.access.borrow_ref_mut(cs).latch_power(pin, level));
        }

        let guard = self.try_acquire().ok_or_else(|| {
            diag!(ChannelBusy, pin);
            HaError::ChannelBusy
        })?;
        self.enable_pin(&guard, pin)?;
        critical_section::with(|cs| self.access.borrow_ref_mut(cs).drive_io(level))
    }

    /// Last vector shifted out by a latched power channel
    pub fn latched_states(&self) -> Option<[u8; SHADOW_BYTES]> {
        critical_section::with(|cs| self.access.borrow_ref(cs).shadow())
    }

    /// Shift registers in the access chain
    pub fn shift_registers(&self) -> usize {
        critical_section::with(|cs| self.access.borrow_ref(cs).registers())
    }

    /// Channel interrupt handler
    ///
    /// Cascades only latch which lines fired; a single-alert channel calls
    /// the device's quick handler straight away.
    pub fn on_interrupt(&self) {
        let captured = critical_section::with(|cs| {
            let count = self.interrupts.borrow(cs);
            count.set(count.get().wrapping_add(1));
            self.alert.borrow_ref_mut(cs).capture()
        });

        match captured {
            Ok(Captured::Single(device)) => {
                if let Some(handler) = self.handler() {
                    handler.quick(device, 0);
                }
            }
            Ok(Captured::Flagged) => {}
            Ok(Captured::Spurious) => diag!(SpuriousInterrupt),
            Err(_) => diag!(ControllerFault),
        }
    }

    /// Daemon pass: hand every latched line to its device, then re-arm it
    ///
    /// A line no range covers is dropped with a diagnostic and stays
    /// disabled.
    pub fn on_tick(&self) {
        let handler = self.handler();

        if let Some(device) = critical_section::with(|cs| self.alert.borrow_ref_mut(cs).take_raised()) {
            if let Some(handler) = handler {
                handler.follow_up(device, 0);
            }
        }

        let mut from = 0;
        while let Some((line, device)) = critical_section::with(|cs| {
            let mut alert = self.alert.borrow_ref_mut(cs);
            alert.take_pending(from).map(|line| (line, alert.resolve(line)))
        }) {
            from = line + 1;
            let Ok(device) = device else {
                diag!(RangeMiss, line);
                continue;
            };

            if let Some(handler) = handler {
                handler.follow_up(device, line);
            }
            let rearmed = critical_section::with(|cs| self.alert.borrow_ref_mut(cs).enable_line(line));
            if rearmed.is_err() {
                diag!(ControllerFault, line);
            }
        }
    }

    /// Lines latched by the interrupt handler and not yet serviced
    pub fn pending_lines(&self) -> u32 {
        critical_section::with(|cs| self.alert.borrow_ref(cs).pending())
    }

    pub fn resolve_device(&self, line: u16) -> HaResult<DeviceRef> {
        critical_section::with(|cs| self.alert.borrow_ref(cs).resolve(line))
    }

    /// Interrupt line `device` is wired to
    pub fn find_line(&self, device: DeviceRef) -> HaResult<u16> {
        critical_section::with(|cs| self.alert.borrow_ref(cs).find_line(device))
    }

    /// Re-arm one interrupt line on whichever controller owns it
    pub fn enable_line(&self, line: u16) -> HaResult<()> {
        critical_section::with(|cs| self.alert.borrow_ref_mut(cs).enable_line(line))
    }

    pub fn set_line_mode(&self, line: u16, edge: Edge) -> HaResult<()> {
        critical_section::with(|cs| self.alert.borrow_ref_mut(cs).set_line_mode(line, edge))
    }
}

impl<S, P, E> Channel<S, P, E>
where
    S: ShiftOut + Send + 'static,
    P: OutputPin + Send + 'static,
    E: InterruptExpander + Send + 'static,
{
    /// Schedule the repeating daemon that runs [`Channel::on_tick`]
    pub fn start_daemon(&'static self, scheduler: &dyn Schedule) -> HaResult<ContextId> {
        schedule_context(
            scheduler,
            Participant::Channel(self),
            0,
            WakeDuration::from_millis(scheduler.daemon_period_ms()),
            DispatchClass::Cooperative,
            Recurrence::Repeating,
        )
        .map_err(|err| {
            diag!(DaemonStartFailed);
            err
        })
    }
}

impl<S, P, E> ChannelTarget for Channel<S, P, E>
where
    S: ShiftOut + Send,
    P: OutputPin + Send,
    E: InterruptExpander + Send,
{
    fn on_daemon(&self, _arg: u8) {
        self.on_tick();
    }
}
