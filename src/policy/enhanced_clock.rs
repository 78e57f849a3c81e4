use super::Placement;
use crate::error::{Result, SimError};
use crate::memory::{Access, FrameSet};

/// Clock variant that prefers clean pages, using use and modify bits
///
/// Slots fall into four classes by `(use, modify)`. A fault takes the first
/// `(0,0)` slot from the hand, then the first `(0,1)` slot (clearing use bits
/// on the way), and only after clearing every use bit the first `(1,0)` or
/// `(1,1)` slot.
#[derive(Debug, Clone)]
pub struct EnhancedClock {
    total_pages: usize,
    use_bits: Vec<bool>,
    modify_bits: Vec<bool>,
    pointer: usize,
}

/// First slot found in each `(use, modify)` class during one scan
#[derive(Debug, Default)]
struct ClassScan {
    unused_clean: Option<usize>,
    unused_dirty: Option<usize>,
    used_clean: Option<usize>,
    used_dirty: Option<usize>,
}

impl EnhancedClock {
    pub fn new(frame_size: usize, total_pages: usize) -> Self {
        EnhancedClock {
            total_pages,
            use_bits: vec![false; frame_size],
            modify_bits: vec![false; frame_size],
            pointer: 0,
        }
    }

    pub fn frame_size(&self) -> usize {
        self.use_bits.len()
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn use_bits(&self) -> &[bool] {
        &self.use_bits
    }

    pub fn modify_bits(&self) -> &[bool] {
        &self.modify_bits
    }

    pub fn reset(&mut self) {
        self.use_bits.iter_mut().for_each(|b| *b = false);
        self.modify_bits.iter_mut().for_each(|b| *b = false);
        self.pointer = 0;
    }

    fn scan(&self) -> ClassScan {
        let n = self.use_bits.len();
        let mut found = ClassScan::default();
        for offset in 0..n {
            let slot = (self.pointer + offset) % n;
            let class = match (self.use_bits[slot], self.modify_bits[slot]) {
                (false, false) => &mut found.unused_clean,
                (false, true) => &mut found.unused_dirty,
                (true, false) => &mut found.used_clean,
                (true, true) => &mut found.used_dirty,
            };
            if class.is_none() {
                *class = Some(slot);
            }
        }
        found
    }

    fn select_victim(&mut self) -> Result<usize> {
        let n = self.use_bits.len();
        let found = self.scan();

        if let Some(slot) = found.unused_clean {
            return Ok(slot);
        }
        if let Some(slot) = found.unused_dirty {
            while self.pointer != slot {
                self.use_bits[self.pointer] = false;
                self.pointer = (self.pointer + 1) % n;
            }
            return Ok(slot);
        }

        self.use_bits.iter_mut().for_each(|b| *b = false);
        found.used_clean.or(found.used_dirty).ok_or_else(|| {
            SimError::PolicyMisuse(format!("enhanced clock found no victim among {} slots", n))
        })
    }

    pub(super) fn step(&mut self, access: Access, frames: &FrameSet) -> Result<Placement> {
        let dirty = access.mode.is_write();
        if let Some(slot) = frames.first_free() {
            self.use_bits[slot] = true;
            self.modify_bits[slot] = dirty;
            return Ok(Placement::free(slot));
        }

        let slot = self.select_victim()?;
        self.use_bits[slot] = true;
        self.modify_bits[slot] = dirty;
        self.pointer = (slot + 1) % self.use_bits.len();
        Ok(Placement::replace(slot, frames))
    }

    pub(super) fn update(&mut self, access: Access, frames: &FrameSet) -> Result<()> {
        let slot = super::resident_slot(frames, access.page)?;
        self.use_bits[slot] = true;
        self.modify_bits[slot] = access.mode.is_write();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{fault_positions, PolicyKind, ReplacementPolicy};
    use super::*;
    use crate::memory::AccessMode;

    fn full_frames(pages: &[usize]) -> FrameSet {
        let mut frames = FrameSet::new(pages.len());
        for (slot, &page) in pages.iter().enumerate() {
            frames.place(slot, page).unwrap();
        }
        frames
    }

    fn with_bits(use_bits: &[bool], modify_bits: &[bool], pointer: usize) -> EnhancedClock {
        let mut clock = EnhancedClock::new(use_bits.len(), 16);
        clock.use_bits = use_bits.to_vec();
        clock.modify_bits = modify_bits.to_vec();
        clock.pointer = pointer;
        clock
    }

    #[test]
    fn test_prefers_unused_clean() {
        let mut clock = with_bits(&[true, false, false, false], &[false, true, false, true], 0);
        let frames = full_frames(&[10, 11, 12, 13]);

        let placement = clock.step(Access::read(14), &frames).unwrap();
        assert_eq!(placement, Placement { slot: 2, evicted: Some(12) });
        // Use bits passed over stay untouched in the (0,0) case
        assert_eq!(clock.use_bits(), &[true, false, true, false]);
        assert_eq!(clock.pointer(), 3);
    }

    #[test]
    fn test_unused_dirty_clears_use_bits_on_the_way() {
        let mut clock = with_bits(&[true, true, false, true], &[false, true, true, false], 0);
        let frames = full_frames(&[10, 11, 12, 13]);

        let placement = clock.step(Access::write(14), &frames).unwrap();
        assert_eq!(placement, Placement { slot: 2, evicted: Some(12) });
        assert_eq!(clock.use_bits(), &[false, false, true, true]);
        assert_eq!(clock.modify_bits(), &[false, true, true, false]);
        assert_eq!(clock.pointer(), 3);
    }

    #[test]
    fn test_scan_starts_at_pointer() {
        // Slots 0 and 3 are both (0,0); the scan from slot 2 reaches 3 first
        let mut clock = with_bits(&[false, true, true, false], &[false; 4], 2);
        let frames = full_frames(&[10, 11, 12, 13]);

        let placement = clock.step(Access::read(14), &frames).unwrap();
        assert_eq!(placement.slot, 3);
        assert_eq!(clock.pointer(), 0);
    }

    #[test]
    fn test_all_used_prefers_clean() {
        let mut clock = with_bits(&[true; 4], &[true, true, false, true], 0);
        let frames = full_frames(&[10, 11, 12, 13]);

        let placement = clock.step(Access::read(14), &frames).unwrap();
        assert_eq!(placement, Placement { slot: 2, evicted: Some(12) });
        assert_eq!(clock.use_bits(), &[false, false, true, false]);
        assert_eq!(clock.modify_bits(), &[true, true, false, true]);
    }

    #[test]
    fn test_all_used_and_dirty() {
        let mut clock = with_bits(&[true; 3], &[true; 3], 1);
        let frames = full_frames(&[10, 11, 12]);

        let placement = clock.step(Access::read(14), &frames).unwrap();
        assert_eq!(placement, Placement { slot: 1, evicted: Some(11) });
        assert_eq!(clock.use_bits(), &[false, true, false]);
        assert_eq!(clock.modify_bits(), &[true, false, true]);
        assert_eq!(clock.pointer(), 2);
    }

    #[test]
    fn test_victim_without_any_slot_is_an_error() {
        // Bits out of step with a full frame set leave no class to pick from
        let mut clock = with_bits(&[], &[], 0);
        let frames = full_frames(&[10]);
        assert!(matches!(
            clock.step(Access::read(14), &frames),
            Err(SimError::PolicyMisuse(_))
        ));
    }

    #[test]
    fn test_hit_overwrites_modify_bit() {
        let mut clock = EnhancedClock::new(2, 8);
        let frames = full_frames(&[1, 2]);
        clock.update(Access::write(2), &frames).unwrap();
        assert_eq!(clock.modify_bits(), &[false, true]);
        clock.update(Access::read(2), &frames).unwrap();
        assert_eq!(clock.modify_bits(), &[false, false]);
        assert_eq!(clock.use_bits(), &[false, true]);
    }

    #[test]
    fn test_enhanced_clock_reference_run() {
        let pages = [0, 1, 3, 6, 2, 4, 5, 2, 5, 0, 3, 1, 2, 5, 4, 1, 0];
        let modes = [0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 0];
        let trace: Vec<Access> = pages
            .iter()
            .zip(modes.iter())
            .map(|(&p, &m)| Access::new(p, AccessMode::from_bit(m).unwrap()))
            .collect();
        let mut policy = ReplacementPolicy::new(PolicyKind::EnhancedClock, 4, 8, None).unwrap();
        assert_eq!(
            fault_positions(&mut policy, &trace, 4),
            vec![0, 1, 2, 3, 4, 5, 6, 9, 10, 11, 12, 13, 14, 15, 16]
        );
    }
}
