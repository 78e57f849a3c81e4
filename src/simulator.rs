use std::fmt;

use log::{debug, info, trace};
use rayon::prelude::*;

use crate::error::{Result, SimError};
use crate::memory::{Access, FrameSet, Page, PageTable};
use crate::policy::{PolicyKind, ReplacementPolicy};

/// A process with its own frame allocation and page table
#[derive(Debug, Clone)]
pub struct Process {
    pid: u32,
    /// Physical block number behind each frame slot
    frame_list: Vec<usize>,
    logic_size: usize,
    page_size: usize,
    page_table: PageTable,
    frames: FrameSet,
}

impl Process {
    /// Create a process owning the physical blocks in `frame_list`
    ///
    /// The address space holds `logic_size / page_size` pages.
    pub fn new(pid: u32, frame_list: Vec<usize>, logic_size: usize, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(SimError::InvalidConfig("page size must be positive".to_string()));
        }
        if frame_list.is_empty() {
            return Err(SimError::InvalidConfig("process needs at least one frame".to_string()));
        }
        for (i, block) in frame_list.iter().enumerate() {
            if frame_list[..i].contains(block) {
                return Err(SimError::InvalidConfig(format!(
                    "physical frame {} allocated twice",
                    block
                )));
            }
        }
        let total_pages = logic_size / page_size;
        if total_pages == 0 {
            return Err(SimError::InvalidConfig(format!(
                "logical size {} is smaller than one {}-byte page",
                logic_size, page_size
            )));
        }

        let frames = FrameSet::new(frame_list.len());
        Ok(Process {
            pid,
            frame_list,
            logic_size,
            page_size,
            page_table: PageTable::new(total_pages),
            frames,
        })
    }

    pub fn with_window(mut self, window: Option<usize>) -> Self {
        self.page_table = self.page_table.with_window(window);
        self
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn frame_list(&self) -> &[usize] {
        &self.frame_list
    }

    pub fn frame_size(&self) -> usize {
        self.frame_list.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn logic_size(&self) -> usize {
        self.logic_size
    }

    pub fn total_pages(&self) -> usize {
        self.page_table.len()
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    /// Physical block number for a frame slot
    pub fn physical_frame(&self, slot: usize) -> Option<usize> {
        self.frame_list.get(slot).copied()
    }

    /// Backing-store address a page is written back to
    #[inline]
    pub fn swap_address(&self, page: Page) -> usize {
        page * self.page_size
    }

    /// Return to all-empty frames and an all-invalid page table
    pub fn reset(&mut self) {
        self.page_table.reset();
        self.frames.reset();
    }

    /// Check that the page table and frame set describe the same residency
    pub fn check_invariants(&self) -> Result<()> {
        for (page, entry) in self.page_table.entries().iter().enumerate() {
            let slot = self.frames.find(page);
            let consistent = match (entry.valid, entry.frame, slot) {
                (true, Some(frame), Some(slot)) => frame == slot,
                (false, None, None) => true,
                _ => false,
            };
            if !consistent {
                return Err(SimError::PolicyMisuse(format!(
                    "page {} has entry {:?} but frame slot {:?}",
                    page, entry, slot
                )));
            }
        }
        for (slot, page) in self.frames.resident() {
            if self.frames.find(page) != Some(slot) {
                return Err(SimError::PolicyMisuse(format!(
                    "page {} occupies more than one slot",
                    page
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Process {}:", self.pid)?;
        writeln!(f, "  Page size:          {} bytes", self.page_size)?;
        writeln!(f, "  Logical space:      {} bytes", self.logic_size)?;
        writeln!(f, "  Total pages:        {}", self.total_pages())?;
        writeln!(f, "  Allocated frames:   {}", self.frame_size())?;
        write!(f, "  Physical blocks:    {:?}", self.frame_list)
    }
}

/// Outcome of one access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub position: usize,
    pub access: Access,
    pub fault: bool,
    /// Slot holding the page after the access
    pub slot: usize,
    pub evicted: Option<Page>,
    /// The evicted page was dirty and got a swap marker
    pub write_back: bool,
    pub resident: Vec<Option<Page>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub policy: PolicyKind,
    pub accesses: usize,
    pub faults: usize,
    pub evictions: usize,
    pub write_backs: usize,
}

impl RunSummary {
    fn new(policy: PolicyKind) -> Self {
        RunSummary {
            policy,
            accesses: 0,
            faults: 0,
            evictions: 0,
            write_backs: 0,
        }
    }

    /// Faults per access, 0.0 for an empty trace
    pub fn fault_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.faults as f64 / self.accesses as f64
        }
    }

    fn record(&mut self, step: &StepResult) {
        self.accesses += 1;
        if step.fault {
            self.faults += 1;
        }
        if step.evicted.is_some() {
            self.evictions += 1;
        }
        if step.write_back {
            self.write_backs += 1;
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} faults / {} accesses ({:.2}%), {} write-backs",
            self.policy,
            self.faults,
            self.accesses,
            self.fault_rate() * 100.0,
            self.write_backs
        )
    }
}

/// A complete run of one policy over one trace
#[derive(Debug, Clone)]
pub struct Run {
    pub summary: RunSummary,
    pub steps: Vec<StepResult>,
    /// Page table as the run left it
    pub page_table: PageTable,
}

impl Run {
    pub fn fault_positions(&self) -> Vec<usize> {
        self.steps
            .iter()
            .filter(|s| s.fault)
            .map(|s| s.position)
            .collect()
    }
}

/// Feeds traces through a replacement policy on behalf of a process
#[derive(Debug, Clone)]
pub struct Simulator {
    process: Process,
}

impl Simulator {
    pub fn new(process: Process) -> Self {
        Simulator { process }
    }

    pub fn process(&self) -> &Process {
        &self.process
    }

    pub fn into_process(self) -> Process {
        self.process
    }

    /// Run a fresh `kind` policy over `trace` from empty frames
    pub fn run(&mut self, kind: PolicyKind, trace: &[Access]) -> Result<Run> {
        let mut policy = ReplacementPolicy::new(
            kind,
            self.process.frame_size(),
            self.process.total_pages(),
            Some(trace),
        )?;
        self.replay(&mut policy, trace)
    }

    /// Reset the process and `policy`, then feed every access of `trace`
    pub fn replay(&mut self, policy: &mut ReplacementPolicy, trace: &[Access]) -> Result<Run> {
        self.process.reset();
        policy.reset();

        let mut summary = RunSummary::new(policy.kind());
        let mut steps = Vec::with_capacity(trace.len());
        for (position, &access) in trace.iter().enumerate() {
            let step = self.access(policy, access, position)?;
            summary.record(&step);
            steps.push(step);
        }

        info!(
            "pid {} {}: {} faults over {} accesses",
            self.process.pid,
            summary.policy,
            summary.faults,
            summary.accesses
        );
        Ok(Run {
            summary,
            steps,
            page_table: self.process.page_table.clone(),
        })
    }

    /// Process a single access at trace `position`
    pub fn access(&mut self, policy: &mut ReplacementPolicy, access: Access, position: usize) -> Result<StepResult> {
        let page = access.page;
        let entry = self.process.page_table.entry(page)?;

        let (slot, fault, evicted, write_back) = match (entry.valid, entry.frame) {
            (true, Some(slot)) => {
                trace!("pid {} hit: {} in slot {}", self.process.pid, access, slot);
                self.process.page_table.touch(page, access.mode, position)?;
                (slot, false, None, false)
            }
            (true, None) => {
                return Err(SimError::PolicyMisuse(format!(
                    "page {} valid without a frame",
                    page
                )));
            }
            (false, _) => {
                let placement = policy.step(access, position, &self.process.frames)?;
                let displaced = self.process.frames.place(placement.slot, page)?;
                if displaced != placement.evicted {
                    return Err(SimError::PolicyMisuse(format!(
                        "{} reported evicting {:?} from slot {} which held {:?}",
                        policy.kind(),
                        placement.evicted,
                        placement.slot,
                        displaced
                    )));
                }

                let mut write_back = false;
                if let Some(old) = placement.evicted {
                    let swap = self.process.swap_address(old);
                    write_back = self.process.page_table.evict(old, swap)?;
                    debug!(
                        "pid {} fault at {}: {} replaces {} in block {:?}{}",
                        self.process.pid,
                        position,
                        access,
                        old,
                        self.process.physical_frame(placement.slot),
                        if write_back { " (written back)" } else { "" }
                    );
                } else {
                    debug!(
                        "pid {} fault at {}: {} loaded into free block {:?}",
                        self.process.pid,
                        position,
                        access,
                        self.process.physical_frame(placement.slot)
                    );
                }
                self.process
                    .page_table
                    .load(page, placement.slot, access.mode, position)?;
                (placement.slot, true, placement.evicted, write_back)
            }
        };

        self.process.page_table.age(position);
        policy.update(access, position, &self.process.frames)?;
        debug_assert!(self.process.check_invariants().is_ok());

        Ok(StepResult {
            position,
            access,
            fault,
            slot,
            evicted,
            write_back,
            resident: self.process.frames.snapshot(),
        })
    }
}

/// Run every policy in `kinds` over `trace`, each on its own copy of `process`
///
/// Runs share nothing, so they execute in parallel; results keep the order
/// of `kinds`.
pub fn compare(process: &Process, trace: &[Access], kinds: &[PolicyKind]) -> Result<Vec<Run>> {
    kinds
        .par_iter()
        .map(|&kind| Simulator::new(process.clone()).run(kind, trace))
        .collect()
}
