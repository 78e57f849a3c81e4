use super::Placement;
use crate::error::{Result, SimError};
use crate::memory::{Access, FrameSet, Page};

/// Belady's optimal replacement, looking ahead in the full trace
///
/// Occurrences of every page are indexed once at construction so the next
/// use of a resident page is a binary search instead of a rescan.
#[derive(Debug, Clone)]
pub struct Opt {
    frame_size: usize,
    total_pages: usize,
    pages: Vec<Page>,
    occurrences: Vec<Vec<usize>>,
}

impl Opt {
    pub fn new(frame_size: usize, total_pages: usize, trace: &[Access]) -> Result<Self> {
        let mut occurrences = vec![Vec::new(); total_pages];
        for (position, access) in trace.iter().enumerate() {
            let positions = occurrences
                .get_mut(access.page)
                .ok_or(SimError::InvalidPageReference {
                    page: access.page,
                    total_pages,
                })?;
            positions.push(position);
        }
        Ok(Opt {
            frame_size,
            total_pages,
            pages: trace.iter().map(|a| a.page).collect(),
            occurrences,
        })
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Position of the first reference to `page` strictly after `position`
    pub fn next_use(&self, page: Page, position: usize) -> Option<usize> {
        let positions = self.occurrences.get(page)?;
        let idx = positions.partition_point(|&p| p <= position);
        positions.get(idx).copied()
    }

    pub(super) fn step(&mut self, access: Access, position: usize, frames: &FrameSet) -> Result<Placement> {
        match self.pages.get(position) {
            Some(&page) if page == access.page => {}
            Some(&page) => {
                return Err(SimError::MissingLookahead(format!(
                    "trace holds page {} at position {}, not {}",
                    page, position, access.page
                )));
            }
            None => {
                return Err(SimError::MissingLookahead(format!(
                    "position {} is past the end of a {}-access trace",
                    position,
                    self.pages.len()
                )));
            }
        }

        if let Some(slot) = frames.first_free() {
            return Ok(Placement::free(slot));
        }

        // a later candidate wins only with a strictly farther next use
        let mut victim: Option<(usize, usize)> = None;
        for (slot, page) in frames.resident() {
            let next = self.next_use(page, position).unwrap_or(usize::MAX);
            match victim {
                Some((_, farthest)) if next <= farthest => {}
                _ => victim = Some((slot, next)),
            }
        }
        let (slot, _) = victim
            .ok_or_else(|| SimError::PolicyMisuse("OPT found no resident pages".to_string()))?;
        Ok(Placement::replace(slot, frames))
    }
}
