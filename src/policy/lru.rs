use std::collections::BTreeMap;

use super::Placement;
use crate::error::{Result, SimError};
use crate::memory::{Access, FrameSet, Page};

/// Least-recently-used replacement keyed on trace positions
///
/// Only resident pages are tracked. Positions are unique, so the minimum is
/// unique too; should two ever match, the lower page id is chosen because
/// the scan runs in key order.
#[derive(Debug, Clone)]
pub struct Lru {
    frame_size: usize,
    total_pages: usize,
    last_use: BTreeMap<Page, usize>,
}

impl Lru {
    pub fn new(frame_size: usize, total_pages: usize) -> Self {
        Lru {
            frame_size,
            total_pages,
            last_use: BTreeMap::new(),
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Last recorded position of a resident page
    pub fn last_use(&self, page: Page) -> Option<usize> {
        self.last_use.get(&page).copied()
    }

    pub fn reset(&mut self) {
        self.last_use.clear();
    }

    pub(super) fn step(&mut self, frames: &FrameSet) -> Result<Placement> {
        if let Some(slot) = frames.first_free() {
            return Ok(Placement::free(slot));
        }
        if self.last_use.len() != frames.occupied() {
            return Err(SimError::PolicyMisuse(format!(
                "LRU tracks {} pages but {} are resident",
                self.last_use.len(),
                frames.occupied()
            )));
        }

        let victim = self
            .last_use
            .iter()
            .min_by_key(|&(_, &position)| position)
            .map(|(&page, _)| page)
            .ok_or_else(|| SimError::PolicyMisuse("LRU has no resident pages".to_string()))?;
        let slot = frames.find(victim).ok_or_else(|| {
            SimError::PolicyMisuse(format!("LRU victim {} is not resident", victim))
        })?;
        self.last_use.remove(&victim);
        Ok(Placement::replace(slot, frames))
    }

    pub(super) fn update(&mut self, access: Access, position: usize, frames: &FrameSet) -> Result<()> {
        super::resident_slot(frames, access.page)?;
        self.last_use.insert(access.page, position);
        Ok(())
    }
}
