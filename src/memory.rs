use std::fmt;

use crate::constants::{MODE_READ, MODE_WRITE};
use crate::error::{Result, SimError};

/// Logical page identifier, in `[0, total_pages)`
pub type Page = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    #[default]
    Read,
    Write,
}

impl AccessMode {
    /// Decode the 0/1 read-write bit used in trace files
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            MODE_READ => Some(AccessMode::Read),
            MODE_WRITE => Some(AccessMode::Write),
            _ => None,
        }
    }

    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            AccessMode::Read => MODE_READ,
            AccessMode::Write => MODE_WRITE,
        }
    }

    #[inline]
    pub fn is_write(self) -> bool {
        self == AccessMode::Write
    }
}

/// One entry of a reference trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub page: Page,
    pub mode: AccessMode,
}

impl Access {
    pub fn new(page: Page, mode: AccessMode) -> Self {
        Access { page, mode }
    }

    pub fn read(page: Page) -> Self {
        Access::new(page, AccessMode::Read)
    }

    pub fn write(page: Page) -> Self {
        Access::new(page, AccessMode::Write)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            AccessMode::Read => write!(f, "{}", self.page),
            AccessMode::Write => write!(f, "{}w", self.page),
        }
    }
}

/// Fixed-capacity set of frame slots allocated to one process
///
/// A page occupies at most one slot, and slots only ever hold pages
/// placed through [`FrameSet::place`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    slots: Vec<Option<Page>>,
}

impl FrameSet {
    /// Create a frame set with `capacity` empty slots
    pub fn new(capacity: usize) -> Self {
        FrameSet {
            slots: vec![None; capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Page held by `slot`, or `None` if the slot is empty or out of range
    #[inline]
    pub fn get(&self, slot: usize) -> Option<Page> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn slots(&self) -> &[Option<Page>] {
        &self.slots
    }

    /// Slot currently holding `page`
    pub fn find(&self, page: Page) -> Option<usize> {
        self.slots.iter().position(|&s| s == Some(page))
    }

    #[inline]
    pub fn contains(&self, page: Page) -> bool {
        self.find(page).is_some()
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Lowest-numbered empty slot
    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Iterate `(slot, page)` over occupied slots in slot order
    pub fn resident(&self) -> impl Iterator<Item = (usize, Page)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, page)| page.map(|p| (slot, p)))
    }

    /// Put `page` into `slot`, returning the page it displaced
    pub fn place(&mut self, slot: usize, page: Page) -> Result<Option<Page>> {
        if slot >= self.slots.len() {
            return Err(SimError::PolicyMisuse(format!(
                "slot {} out of range for {} frames",
                slot,
                self.slots.len()
            )));
        }
        if let Some(existing) = self.find(page) {
            return Err(SimError::PolicyMisuse(format!(
                "page {} already resident in slot {}",
                page, existing
            )));
        }
        Ok(self.slots[slot].replace(page))
    }

    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    pub fn snapshot(&self) -> Vec<Option<Page>> {
        self.slots.clone()
    }
}

/// Residency metadata for one logical page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTableEntry {
    /// Frame slot holding the page while it is valid
    pub frame: Option<usize>,
    pub valid: bool,
    pub access: bool,
    pub modify: bool,
    /// Backing-store address assigned when a dirty copy was written back
    pub swap: Option<usize>,
    pub last_access: Option<usize>,
}

/// Page table for a single process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTable {
    entries: Vec<PageTableEntry>,
    window: Option<usize>,
}

impl PageTable {
    /// Create a table of `total_pages` invalid entries
    pub fn new(total_pages: usize) -> Self {
        PageTable {
            entries: vec![PageTableEntry::default(); total_pages],
            window: None,
        }
    }

    /// Keep the access bit set only for pages touched in the last `window` accesses
    pub fn with_window(mut self, window: Option<usize>) -> Self {
        self.window = window;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window(&self) -> Option<usize> {
        self.window
    }

    /// Reject pages outside the address space
    #[inline]
    pub fn check(&self, page: Page) -> Result<()> {
        if page >= self.entries.len() {
            return Err(SimError::InvalidPageReference {
                page,
                total_pages: self.entries.len(),
            });
        }
        Ok(())
    }

    pub fn entry(&self, page: Page) -> Result<&PageTableEntry> {
        self.check(page)?;
        Ok(&self.entries[page])
    }

    pub fn is_resident(&self, page: Page) -> Result<bool> {
        Ok(self.entry(page)?.valid)
    }

    pub fn entries(&self) -> &[PageTableEntry] {
        &self.entries
    }

    /// Mark `page` as loaded into `slot`
    pub fn load(&mut self, page: Page, slot: usize, mode: AccessMode, position: usize) -> Result<()> {
        self.check(page)?;
        let entry = &mut self.entries[page];
        entry.frame = Some(slot);
        entry.valid = true;
        entry.access = true;
        entry.modify = mode.is_write();
        entry.last_access = Some(position);
        Ok(())
    }

    /// Refresh metadata of a resident page on a hit
    pub fn touch(&mut self, page: Page, mode: AccessMode, position: usize) -> Result<()> {
        self.check(page)?;
        let entry = &mut self.entries[page];
        if !entry.valid {
            return Err(SimError::PolicyMisuse(format!(
                "page {} touched while not resident",
                page
            )));
        }
        entry.access = true;
        entry.modify = mode.is_write();
        entry.last_access = Some(position);
        Ok(())
    }

    /// Invalidate `page`, returning whether it was dirty
    ///
    /// A dirty page keeps `swap_address` as its swap marker.
    pub fn evict(&mut self, page: Page, swap_address: usize) -> Result<bool> {
        self.check(page)?;
        let entry = &mut self.entries[page];
        let dirty = entry.modify;
        if dirty {
            entry.swap = Some(swap_address);
        }
        entry.frame = None;
        entry.valid = false;
        entry.access = false;
        entry.modify = false;
        Ok(dirty)
    }

    /// Clear access bits that fell out of the window ending at `position`
    pub fn age(&mut self, position: usize) {
        let Some(window) = self.window else {
            return;
        };
        for entry in self.entries.iter_mut().filter(|e| e.valid) {
            if let Some(last) = entry.last_access {
                if position.saturating_sub(last) >= window {
                    entry.access = false;
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.entries
            .iter_mut()
            .for_each(|e| *e = PageTableEntry::default());
    }
}
