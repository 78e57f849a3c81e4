use super::Placement;
use crate::memory::FrameSet;

/// First-in first-out replacement over a circular insertion pointer
#[derive(Debug, Clone)]
pub struct Fifo {
    frame_size: usize,
    total_pages: usize,
    pointer: usize,
}

impl Fifo {
    pub fn new(frame_size: usize, total_pages: usize) -> Self {
        Fifo {
            frame_size,
            total_pages,
            pointer: 0,
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn reset(&mut self) {
        self.pointer = 0;
    }

    pub(super) fn step(&mut self, frames: &FrameSet) -> Placement {
        if let Some(slot) = frames.first_free() {
            return Placement::free(slot);
        }
        let slot = self.pointer;
        self.pointer = (self.pointer + 1) % self.frame_size;
        Placement::replace(slot, frames)
    }
}
