//! Fixed table of context slots

use ha_core::{HaError, HaResult};
use ha_wakeup::Context;

use crate::participant::{Participant, ParticipantKind};

/// Index of an occupied context slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u8);

impl From<ContextId> for Context {
    fn from(id: ContextId) -> Self {
        Context(id.0 as usize)
    }
}

impl From<Context> for ContextId {
    fn from(ctx: Context) -> Self {
        // Out-of-range words map to a slot that can never be occupied
        ContextId(u8::try_from(ctx.0).unwrap_or(u8::MAX))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ContextId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ctx#{}", self.0);
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    participant: Participant,
    arg: u8,
    /// Kept after dispatch instead of being freed
    repeat: bool,
}

/// Context slots; `None` marks a free slot
///
/// `N` must not exceed 255 so every index fits a [`ContextId`].
pub struct ContextTable<const N: usize> {
    slots: [Option<Slot>; N],
    used: usize,
}

impl<const N: usize> ContextTable<N> {
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            used: 0,
        }
    }

    /// Release every slot
    pub fn clear(&mut self) {
        self.slots = [None; N];
        self.used = 0;
    }

    /// Claim the lowest free slot
    pub fn save(&mut self, participant: Participant, arg: u8, repeat: bool) -> HaResult<ContextId> {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .filter(|&i| i < usize::from(u8::MAX))
            .ok_or(HaError::ContextFull)?;

        self.slots[index] = Some(Slot {
            participant,
            arg,
            repeat,
        });
        self.used += 1;
        Ok(ContextId(index as u8))
    }

    fn slot_mut(&mut self, id: ContextId) -> HaResult<&mut Slot> {
        self.slots
            .get_mut(usize::from(id.0))
            .and_then(Option::as_mut)
            .ok_or(HaError::InvalidContext)
    }

    /// Rebind an occupied slot
    ///
    /// The new participant must be of the same kind as the old one.
    pub fn update(
        &mut self,
        id: ContextId,
        participant: Participant,
        arg: u8,
        repeat: bool,
    ) -> HaResult<()> {
        let slot = self.slot_mut(id)?;
        if slot.participant.kind() != participant.kind() {
            return Err(HaError::InvalidContext);
        }
        *slot = Slot {
            participant,
            arg,
            repeat,
        };
        Ok(())
    }

    pub fn free(&mut self, id: ContextId) -> HaResult<()> {
        let slot = self
            .slots
            .get_mut(usize::from(id.0))
            .ok_or(HaError::InvalidContext)?;
        if slot.take().is_some() {
            self.used -= 1;
        }
        Ok(())
    }

    pub fn kind(&self, id: ContextId) -> Option<ParticipantKind> {
        self.slots
            .get(usize::from(id.0))
            .and_then(|s| s.as_ref())
            .map(|s| s.participant.kind())
    }

    /// Copy the slot out for dispatch, freeing it unless it repeats
    pub fn take(&mut self, id: ContextId) -> Option<(Participant, u8)> {
        let slot = *self.slots.get(usize::from(id.0))?.as_ref()?;
        if !slot.repeat {
            self.slots[usize::from(id.0)] = None;
            self.used -= 1;
        }
        Some((slot.participant, slot.arg))
    }

    pub fn free_slots(&self) -> usize {
        N - self.used
    }
}

impl<const N: usize> Default for ContextTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::ZoneTarget;

    struct Quiet;

    impl ZoneTarget for Quiet {
        fn on_wakeup(&self, _arg: u8) {}
    }

    static QUIET: Quiet = Quiet;

    #[test]
    fn test_save_until_full() {
        let mut table: ContextTable<2> = ContextTable::new();
        assert_eq!(table.save(Participant::Zone(&QUIET), 1, false), Ok(ContextId(0)));
        assert_eq!(table.save(Participant::Zone(&QUIET), 2, false), Ok(ContextId(1)));
        assert_eq!(table.save(Participant::Zone(&QUIET), 3, false), Err(HaError::ContextFull));

        table.free(ContextId(0)).unwrap();
        assert_eq!(table.free_slots(), 1);
        assert_eq!(table.save(Participant::Zone(&QUIET), 4, false), Ok(ContextId(0)));
    }

    #[test]
    fn test_take_frees_one_shot_keeps_repeater() {
        let mut table: ContextTable<4> = ContextTable::new();
        let once = table.save(Participant::Zone(&QUIET), 9, false).unwrap();
        let again = table.save(Participant::Zone(&QUIET), 8, true).unwrap();

        assert_eq!(table.take(once).map(|(_, arg)| arg), Some(9));
        assert!(table.take(once).is_none());
        assert_eq!(table.take(again).map(|(_, arg)| arg), Some(8));
        assert_eq!(table.kind(again), Some(ParticipantKind::Zone));
        assert_eq!(table.free_slots(), 3);
    }

    #[test]
    fn test_out_of_range_context_is_invalid() {
        let mut table: ContextTable<4> = ContextTable::new();
        assert_eq!(ContextId::from(Context(300)), ContextId(u8::MAX));
        assert!(table.take(ContextId(u8::MAX)).is_none());
        assert_eq!(table.free(ContextId(200)), Err(HaError::InvalidContext));
    }
}
