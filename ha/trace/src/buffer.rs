//! Diagnostic ring buffer
//!
//! Holds the most recent records. When full, the oldest record is evicted
//! and the drop counter is bumped so a reader can tell history was lost.

use heapless::Deque;

use crate::types::{DiagKind, DiagRecord};

/// Fixed-capacity ring of diagnostic records
pub struct TraceBuffer<const N: usize> {
    records: Deque<DiagRecord, N>,
    /// Sequence number given to the next record
    seq: u16,
    /// One bit per `DiagKind`; all kinds pass by default
    filter: u32,
    /// Records evicted before being read
    dropped: u32,
}

impl<const N: usize> TraceBuffer<N> {
    pub const fn new() -> Self {
        Self {
            records: Deque::new(),
            seq: 0,
            filter: u32::MAX,
            dropped: 0,
        }
    }

    /// Clear records and counters, re-enable every kind
    pub fn init(&mut self) {
        self.records.clear();
        self.seq = 0;
        self.filter = u32::MAX;
        self.dropped = 0;
    }

    /// Whether records of `kind` are currently captured
    pub fn is_enabled(&self, kind: DiagKind) -> bool {
        self.filter & kind.mask() != 0
    }

    pub fn set_filter(&mut self, kind: DiagKind, enable: bool) {
        if enable {
            self.filter |= kind.mask();
        } else {
            self.filter &= !kind.mask();
        }
    }

    pub fn set_filter_mask(&mut self, mask: u32) {
        self.filter = mask;
    }

    pub fn filter_mask(&self) -> u32 {
        self.filter
    }

    /// Record a diagnostic
    ///
    /// Returns the stored record, or `None` when the kind is filtered out.
    pub fn push(&mut self, kind: DiagKind, a: u16, b: u16) -> Option<DiagRecord> {
        if !self.is_enabled(kind) {
            return None;
        }

        let record = DiagRecord {
            seq: self.seq,
            kind,
            a,
            b,
        };
        self.seq = self.seq.wrapping_add(1);

        if self.records.is_full() {
            self.records.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // Room was made above
        let _ = self.records.push_back(record);
        Some(record)
    }

    /// Take the oldest record
    pub fn pop(&mut self) -> Option<DiagRecord> {
        self.records.pop_front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Count buffered records of one kind
    pub fn count(&self, kind: DiagKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }
}

impl<const N: usize> Default for TraceBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
