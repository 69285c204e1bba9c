//! Interrupt line to device mapping

use ha_core::{DeviceRef, DeviceType, HaError, HaResult};

/// Ranges a cascaded channel can hold
pub const MAX_RANGES: usize = 4;

/// A contiguous band of interrupt lines wired to consecutive devices
///
/// Line `line_start + k` belongs to device number `device_start + k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptRange {
    pub line_start: u16,
    pub line_count: u16,
    pub device_type: DeviceType,
    pub device_start: u8,
}

impl InterruptRange {
    pub const fn new(line_start: u16, line_count: u16, device_type: DeviceType, device_start: u8) -> Self {
        Self {
            line_start,
            line_count,
            device_type,
            device_start,
        }
    }

    /// First line past the band
    pub const fn line_end(&self) -> u32 {
        self.line_start as u32 + self.line_count as u32
    }

    fn covers_line(&self, line: u16) -> bool {
        line >= self.line_start && u32::from(line) < self.line_end()
    }

    fn covers_device(&self, device: DeviceRef) -> bool {
        device.device_type == self.device_type
            && device.number >= self.device_start
            && u32::from(device.number) < u32::from(self.device_start) + u32::from(self.line_count)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptRange {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "lines {}+{} -> {}#{}",
            self.line_start,
            self.line_count,
            self.device_type,
            self.device_start
        );
    }
}

/// Ordered, non-overlapping ranges; the first empty slot ends the table
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeTable {
    ranges: [Option<InterruptRange>; MAX_RANGES],
}

impl RangeTable {
    pub const fn new() -> Self {
        Self {
            ranges: [None; MAX_RANGES],
        }
    }

    /// Install `range` at `index`, replacing what was there
    ///
    /// `lines` is the number of lines the owning controller provides.
    pub fn register(&mut self, index: usize, range: InterruptRange, lines: u16) -> HaResult<()> {
        if index >= MAX_RANGES {
            return Err(HaError::RangeOutOfBounds);
        }
        if range.line_count == 0
            || range.line_end() > u32::from(lines)
            || u32::from(range.device_start) + u32::from(range.line_count) > 256
        {
            return Err(HaError::InvalidConfig);
        }
        // Slots fill from 0 upwards, so a gap would hide later ranges
        if index > 0 && self.ranges[index - 1].is_none() {
            return Err(HaError::RangeOutOfBounds);
        }
        if let Some(prev) = index.checked_sub(1).and_then(|i| self.ranges[i]) {
            if prev.line_end() > u32::from(range.line_start) {
                return Err(HaError::RangeOverlap);
            }
        }
        if let Some(next) = self.ranges.get(index + 1).copied().flatten() {
            if range.line_end() > u32::from(next.line_start) {
                return Err(HaError::RangeOverlap);
            }
        }

        self.ranges[index] = Some(range);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<InterruptRange> {
        self.ranges.get(index).copied().flatten()
    }

    fn iter(&self) -> impl Iterator<Item = &InterruptRange> {
        self.ranges.iter().map_while(Option::as_ref)
    }

    /// Device wired to `line`
    pub fn resolve(&self, line: u16) -> HaResult<DeviceRef> {
        let range = self
            .iter()
            .take_while(|r| r.line_start <= line)
            .last()
            .filter(|r| r.covers_line(line))
            .ok_or(HaError::NoCoveringRange)?;

        let offset = (line - range.line_start) as u8;
        Ok(DeviceRef::new(range.device_type, range.device_start + offset))
    }

    /// Line `device` is wired to
    pub fn find_line(&self, device: DeviceRef) -> HaResult<u16> {
        self.iter()
            .find(|r| r.covers_device(device))
            .map(|r| r.line_start + u16::from(device.number - r.device_start))
            .ok_or(HaError::NoCoveringRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RangeTable {
        let mut table = RangeTable::new();
        table
            .register(0, InterruptRange::new(0, 8, DeviceType::Motion, 0), 16)
            .unwrap();
        table
            .register(1, InterruptRange::new(8, 8, DeviceType::Touch, 0), 16)
            .unwrap();
        table
    }

    #[test]
    fn test_resolve_band_boundaries() {
        let table = table();
        assert_eq!(table.resolve(0), Ok(DeviceRef::new(DeviceType::Motion, 0)));
        assert_eq!(table.resolve(7), Ok(DeviceRef::new(DeviceType::Motion, 7)));
        assert_eq!(table.resolve(8), Ok(DeviceRef::new(DeviceType::Touch, 0)));
        assert_eq!(table.resolve(15), Ok(DeviceRef::new(DeviceType::Touch, 7)));
        assert_eq!(table.resolve(16), Err(HaError::NoCoveringRange));
    }

    #[test]
    fn test_line_below_first_range_misses() {
        let mut table = RangeTable::new();
        table
            .register(0, InterruptRange::new(4, 4, DeviceType::Heat, 10), 16)
            .unwrap();
        assert_eq!(table.resolve(3), Err(HaError::NoCoveringRange));
        assert_eq!(table.resolve(4), Ok(DeviceRef::new(DeviceType::Heat, 10)));
        assert_eq!(table.resolve(8), Err(HaError::NoCoveringRange));
    }

    #[test]
    fn test_find_line_inverts_resolve() {
        let table = table();
        for line in 0..16 {
            let device = table.resolve(line).unwrap();
            assert_eq!(table.find_line(device), Ok(line));
        }
        assert_eq!(
            table.find_line(DeviceRef::new(DeviceType::Fire, 0)),
            Err(HaError::NoCoveringRange)
        );
    }

    #[test]
    fn test_register_rejects_bad_ranges() {
        let mut table = table();
        assert_eq!(
            table.register(4, InterruptRange::new(0, 1, DeviceType::Heat, 0), 16),
            Err(HaError::RangeOutOfBounds)
        );
        assert_eq!(
            table.register(3, InterruptRange::new(20, 1, DeviceType::Heat, 0), 256),
            Err(HaError::RangeOutOfBounds)
        );
        assert_eq!(
            table.register(1, InterruptRange::new(6, 4, DeviceType::Heat, 0), 16),
            Err(HaError::RangeOverlap)
        );
        assert_eq!(
            table.register(0, InterruptRange::new(0, 9, DeviceType::Heat, 0), 16),
            Err(HaError::RangeOverlap)
        );
        assert_eq!(
            table.register(2, InterruptRange::new(16, 1, DeviceType::Heat, 0), 16),
            Err(HaError::InvalidConfig)
        );
        assert_eq!(
            table.register(2, InterruptRange::new(200, 8, DeviceType::Heat, 250), 256),
            Err(HaError::InvalidConfig)
        );
        assert_eq!(table.get(2), None);
    }
}
