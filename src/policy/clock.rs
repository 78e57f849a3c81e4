use super::Placement;
use crate::error::Result;
use crate::memory::{Access, FrameSet};

/// Second-chance clock: one use bit per slot and a circular hand
#[derive(Debug, Clone)]
pub struct Clock {
    total_pages: usize,
    use_bits: Vec<bool>,
    pointer: usize,
}

impl Clock {
    pub fn new(frame_size: usize, total_pages: usize) -> Self {
        Clock {
            total_pages,
            use_bits: vec![false; frame_size],
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

    pub fn reset(&mut self) {
        self.use_bits.iter_mut().for_each(|b| *b = false);
        self.pointer = 0;
    }

    pub(super) fn step(&mut self, frames: &FrameSet) -> Placement {
        if let Some(slot) = frames.first_free() {
            self.use_bits[slot] = true;
            return Placement::free(slot);
        }

        let n = self.use_bits.len();
        let mut cleared = 0;
        while self.use_bits[self.pointer] {
            self.use_bits[self.pointer] = false;
            self.pointer = (self.pointer + 1) % n;
            cleared += 1;
            // every pass clears a bit, so one revolution exposes a victim
            debug_assert!(cleared <= n, "clock sweep did not terminate");
        }

        let slot = self.pointer;
        self.use_bits[slot] = true;
        self.pointer = (slot + 1) % n;
        Placement::replace(slot, frames)
    }

    pub(super) fn update(&mut self, access: Access, frames: &FrameSet) -> Result<()> {
        let slot = super::resident_slot(frames, access.page)?;
        self.use_bits[slot] = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{fault_positions, reads, PolicyKind, ReplacementPolicy};
    use super::*;

    fn full_frames(pages: &[usize]) -> FrameSet {
        let mut frames = FrameSet::new(pages.len());
        for (slot, &page) in pages.iter().enumerate() {
            frames.place(slot, page).unwrap();
        }
        frames
    }

    #[test]
    fn test_clock_fill_sets_use_bits() {
        let mut clock = Clock::new(3, 8);
        let mut frames = FrameSet::new(3);
        for page in 0..3 {
            let placement = clock.step(&frames);
            assert_eq!(placement, Placement { slot: page, evicted: None });
            frames.place(placement.slot, page).unwrap();
        }
        assert_eq!(clock.use_bits(), &[true, true, true]);
        assert_eq!(clock.pointer(), 0);
    }

    #[test]
    fn test_clock_full_sweep_evicts_at_pointer() {
        // All bits set: one revolution clears them and lands back on slot 0
        let mut clock = Clock::new(3, 8);
        clock.use_bits = vec![true, true, true];
        let frames = full_frames(&[4, 5, 6]);

        let placement = clock.step(&frames);
        assert_eq!(placement, Placement { slot: 0, evicted: Some(4) });
        assert_eq!(clock.use_bits(), &[true, false, false]);
        assert_eq!(clock.pointer(), 1);
    }

    #[test]
    fn test_clock_gives_second_chance() {
        let mut clock = Clock::new(3, 8);
        clock.use_bits = vec![false, true, false];
        clock.pointer = 1;
        let frames = full_frames(&[4, 5, 6]);

        let placement = clock.step(&frames);
        assert_eq!(placement, Placement { slot: 2, evicted: Some(6) });
        assert_eq!(clock.use_bits(), &[false, false, true]);
        assert_eq!(clock.pointer(), 0);
    }

    #[test]
    fn test_clock_hit_does_not_move_pointer() {
        let mut clock = Clock::new(2, 8);
        let frames = full_frames(&[1, 2]);
        clock.pointer = 1;
        clock.update(Access::read(1), &frames).unwrap();
        assert_eq!(clock.use_bits(), &[true, false]);
        assert_eq!(clock.pointer(), 1);
    }

    #[test]
    fn test_clock_textbook_string() {
        let trace = reads(&[1, 3, 4, 2, 5, 4, 7, 4]);
        let mut policy = ReplacementPolicy::new(PolicyKind::Clock, 4, 8, None).unwrap();
        assert_eq!(fault_positions(&mut policy, &trace, 4), vec![0, 1, 2, 3, 4, 6]);
    }
}
