//! Page replacement policies
//!
//! Every policy answers the same two questions for the driver: on a fault,
//! which slot receives the new page (and who gets displaced); after every
//! access, what bookkeeping to record. The resident set itself lives in the
//! driver's [`FrameSet`] and is passed in read-only.

mod clock;
mod enhanced_clock;
mod fifo;
mod lru;
mod opt;

use std::fmt;
use std::str::FromStr;

pub use clock::Clock;
pub use enhanced_clock::EnhancedClock;
pub use fifo::Fifo;
pub use lru::Lru;
pub use opt::Opt;

use crate::error::{Result, SimError};
use crate::memory::{Access, FrameSet, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PolicyKind {
    Opt,
    Fifo,
    Lru,
    Clock,
    EnhancedClock,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Opt,
        PolicyKind::Fifo,
        PolicyKind::Lru,
        PolicyKind::Clock,
        PolicyKind::EnhancedClock,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Opt => "OPT",
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Lru => "LRU",
            PolicyKind::Clock => "CLOCK",
            PolicyKind::EnhancedClock => "E-CLOCK",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "opt" | "optimal" => Ok(PolicyKind::Opt),
            "fifo" => Ok(PolicyKind::Fifo),
            "lru" => Ok(PolicyKind::Lru),
            "clock" | "s_clock" | "second-chance" => Ok(PolicyKind::Clock),
            "eclock" | "e_clock" | "e-clock" | "enhanced-clock" => Ok(PolicyKind::EnhancedClock),
            _ => Err(SimError::InvalidConfig(format!("Unknown algorithm: {}", s))),
        }
    }
}

/// Verdict of a policy on a page fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub slot: usize,
    /// Page displaced from `slot`, `None` when the slot was free
    pub evicted: Option<Page>,
}

impl Placement {
    fn free(slot: usize) -> Self {
        Placement { slot, evicted: None }
    }

    fn replace(slot: usize, frames: &FrameSet) -> Self {
        Placement {
            slot,
            evicted: frames.get(slot),
        }
    }
}

/// A replacement policy instance with its private state
#[derive(Debug, Clone)]
pub enum ReplacementPolicy {
    Opt(Opt),
    Fifo(Fifo),
    Lru(Lru),
    Clock(Clock),
    EnhancedClock(EnhancedClock),
}

impl ReplacementPolicy {
    /// Build a fresh policy for `frame_size` slots over `total_pages` pages
    ///
    /// `lookahead` is the full trace and is mandatory for OPT.
    pub fn new(
        kind: PolicyKind,
        frame_size: usize,
        total_pages: usize,
        lookahead: Option<&[Access]>,
    ) -> Result<Self> {
        if frame_size == 0 {
            return Err(SimError::InvalidConfig(
                "frame size must be positive".to_string(),
            ));
        }
        let policy = match kind {
            PolicyKind::Opt => {
                let trace = lookahead.ok_or_else(|| {
                    SimError::MissingLookahead("no trace supplied".to_string())
                })?;
                ReplacementPolicy::Opt(Opt::new(frame_size, total_pages, trace)?)
            }
            PolicyKind::Fifo => ReplacementPolicy::Fifo(Fifo::new(frame_size, total_pages)),
            PolicyKind::Lru => ReplacementPolicy::Lru(Lru::new(frame_size, total_pages)),
            PolicyKind::Clock => ReplacementPolicy::Clock(Clock::new(frame_size, total_pages)),
            PolicyKind::EnhancedClock => {
                ReplacementPolicy::EnhancedClock(EnhancedClock::new(frame_size, total_pages))
            }
        };
        Ok(policy)
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            ReplacementPolicy::Opt(_) => PolicyKind::Opt,
            ReplacementPolicy::Fifo(_) => PolicyKind::Fifo,
            ReplacementPolicy::Lru(_) => PolicyKind::Lru,
            ReplacementPolicy::Clock(_) => PolicyKind::Clock,
            ReplacementPolicy::EnhancedClock(_) => PolicyKind::EnhancedClock,
        }
    }

    fn frame_size(&self) -> usize {
        match self {
            ReplacementPolicy::Opt(p) => p.frame_size(),
            ReplacementPolicy::Fifo(p) => p.frame_size(),
            ReplacementPolicy::Lru(p) => p.frame_size(),
            ReplacementPolicy::Clock(p) => p.frame_size(),
            ReplacementPolicy::EnhancedClock(p) => p.frame_size(),
        }
    }

    fn total_pages(&self) -> usize {
        match self {
            ReplacementPolicy::Opt(p) => p.total_pages(),
            ReplacementPolicy::Fifo(p) => p.total_pages(),
            ReplacementPolicy::Lru(p) => p.total_pages(),
            ReplacementPolicy::Clock(p) => p.total_pages(),
            ReplacementPolicy::EnhancedClock(p) => p.total_pages(),
        }
    }

    /// Clear pointers, bits and recency records
    pub fn reset(&mut self) {
        match self {
            ReplacementPolicy::Opt(_) => {}
            ReplacementPolicy::Fifo(p) => p.reset(),
            ReplacementPolicy::Lru(p) => p.reset(),
            ReplacementPolicy::Clock(p) => p.reset(),
            ReplacementPolicy::EnhancedClock(p) => p.reset(),
        }
    }

    /// Decide where a faulting page goes
    ///
    /// Must only be called on a miss.
    pub fn step(&mut self, access: Access, position: usize, frames: &FrameSet) -> Result<Placement> {
        self.check(access.page, frames)?;
        if frames.contains(access.page) {
            return Err(SimError::PolicyMisuse(format!(
                "step called for resident page {}",
                access.page
            )));
        }
        let placement = match self {
            ReplacementPolicy::Opt(p) => p.step(access, position, frames)?,
            ReplacementPolicy::Fifo(p) => p.step(frames),
            ReplacementPolicy::Lru(p) => p.step(frames)?,
            ReplacementPolicy::Clock(p) => p.step(frames),
            ReplacementPolicy::EnhancedClock(p) => p.step(access, frames)?,
        };
        debug_assert!(placement.slot < frames.capacity());
        Ok(placement)
    }

    /// Record the access at `position`; `frames` already reflects it
    pub fn update(&mut self, access: Access, position: usize, frames: &FrameSet) -> Result<()> {
        self.check(access.page, frames)?;
        match self {
            ReplacementPolicy::Opt(_) | ReplacementPolicy::Fifo(_) => Ok(()),
            ReplacementPolicy::Lru(p) => p.update(access, position, frames),
            ReplacementPolicy::Clock(p) => p.update(access, frames),
            ReplacementPolicy::EnhancedClock(p) => p.update(access, frames),
        }
    }

    fn check(&self, page: Page, frames: &FrameSet) -> Result<()> {
        if page >= self.total_pages() {
            return Err(SimError::InvalidPageReference {
                page,
                total_pages: self.total_pages(),
            });
        }
        if frames.capacity() != self.frame_size() {
            return Err(SimError::PolicyMisuse(format!(
                "policy built for {} frames driven with {}",
                self.frame_size(),
                frames.capacity()
            )));
        }
        Ok(())
    }
}

/// Slot the page must occupy in `frames`, for policies that key state by slot
fn resident_slot(frames: &FrameSet, page: Page) -> Result<usize> {
    frames.find(page).ok_or_else(|| {
        SimError::PolicyMisuse(format!("update called for non-resident page {}", page))
    })
}

/// Drive a policy over a trace without a page table, returning fault positions
#[cfg(test)]
pub(crate) fn fault_positions(policy: &mut ReplacementPolicy, trace: &[Access], frame_size: usize) -> Vec<usize> {
    let mut frames = FrameSet::new(frame_size);
    let mut faults = Vec::new();
    for (position, &access) in trace.iter().enumerate() {
        if !frames.contains(access.page) {
            let placement = policy.step(access, position, &frames).unwrap();
            let displaced = frames.place(placement.slot, access.page).unwrap();
            assert_eq!(displaced, placement.evicted);
            faults.push(position);
        }
        policy.update(access, position, &frames).unwrap();
    }
    faults
}

#[cfg(test)]
pub(crate) fn reads(pages: &[Page]) -> Vec<Access> {
    pages.iter().map(|&p| Access::read(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELADY: [Page; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];

    fn faults_for(kind: PolicyKind, trace: &[Access], frame_size: usize) -> Vec<usize> {
        let mut policy = ReplacementPolicy::new(kind, frame_size, 10, Some(trace)).unwrap();
        fault_positions(&mut policy, trace, frame_size)
    }

    #[test]
    fn test_policy_kind_parse() {
        assert_eq!("OPT".parse::<PolicyKind>().unwrap(), PolicyKind::Opt);
        assert_eq!("e_clock".parse::<PolicyKind>().unwrap(), PolicyKind::EnhancedClock);
        assert_eq!("clock".parse::<PolicyKind>().unwrap(), PolicyKind::Clock);
        assert!(matches!(
            "mru".parse::<PolicyKind>(),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_policy_kind_display_round_trip() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.to_string().parse::<PolicyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_reference_string_fault_positions() {
        let trace = reads(&BELADY);
        assert_eq!(
            faults_for(PolicyKind::Fifo, &trace, 4),
            vec![0, 1, 2, 3, 6, 7, 8, 9, 10, 11]
        );
        assert_eq!(faults_for(PolicyKind::Opt, &trace, 4), vec![0, 1, 2, 3, 6, 10]);
        assert_eq!(
            faults_for(PolicyKind::Lru, &trace, 4),
            vec![0, 1, 2, 3, 6, 9, 10, 11]
        );
        assert_eq!(
            faults_for(PolicyKind::Clock, &trace, 4),
            vec![0, 1, 2, 3, 6, 7, 8, 9, 10, 11]
        );
    }

    #[test]
    fn test_opt_requires_lookahead() {
        let result = ReplacementPolicy::new(PolicyKind::Opt, 3, 10, None);
        assert!(matches!(result, Err(SimError::MissingLookahead(_))));
    }

    #[test]
    fn test_zero_frames_rejected() {
        let result = ReplacementPolicy::new(PolicyKind::Fifo, 0, 10, None);
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_step_rejects_out_of_range_page() {
        for kind in PolicyKind::ALL {
            let trace = reads(&[1]);
            let mut policy = ReplacementPolicy::new(kind, 2, 4, Some(&trace)).unwrap();
            let frames = FrameSet::new(2);
            let result = policy.step(Access::read(4), 0, &frames);
            assert!(
                matches!(result, Err(SimError::InvalidPageReference { page: 4, total_pages: 4 })),
                "{} accepted page 4",
                kind
            );
        }
    }

    #[test]
    fn test_step_rejects_resident_page() {
        for kind in PolicyKind::ALL {
            let trace = reads(&[1, 1]);
            let mut policy = ReplacementPolicy::new(kind, 2, 4, Some(&trace)).unwrap();
            let mut frames = FrameSet::new(2);
            frames.place(0, 1).unwrap();
            let result = policy.step(Access::read(1), 1, &frames);
            assert!(matches!(result, Err(SimError::PolicyMisuse(_))), "{}", kind);
        }
    }

    #[test]
    fn test_mismatched_frame_set_rejected() {
        let mut policy = ReplacementPolicy::new(PolicyKind::Fifo, 2, 4, None).unwrap();
        let frames = FrameSet::new(3);
        let result = policy.step(Access::read(0), 0, &frames);
        assert!(matches!(result, Err(SimError::PolicyMisuse(_))));
    }

    #[test]
    fn test_clock_update_requires_residency() {
        for kind in [PolicyKind::Clock, PolicyKind::EnhancedClock] {
            let mut policy = ReplacementPolicy::new(kind, 2, 4, None).unwrap();
            let frames = FrameSet::new(2);
            let result = policy.update(Access::read(0), 0, &frames);
            assert!(matches!(result, Err(SimError::PolicyMisuse(_))), "{}", kind);
        }
    }

    #[test]
    fn test_reset_replays_identically() {
        let trace: Vec<Access> = [0, 3, 1, 3, 2, 4, 0, 1, 4, 2, 3, 0]
            .iter()
            .enumerate()
            .map(|(i, &p)| if i % 3 == 0 { Access::write(p) } else { Access::read(p) })
            .collect();
        for kind in PolicyKind::ALL {
            let mut policy = ReplacementPolicy::new(kind, 3, 5, Some(&trace)).unwrap();
            let first = fault_positions(&mut policy, &trace, 3);
            policy.reset();
            let second = fault_positions(&mut policy, &trace, 3);
            assert_eq!(first, second, "{} diverged after reset", kind);
        }
    }

    #[test]
    fn test_enough_frames_faults_once_per_page() {
        let trace = reads(&[2, 0, 2, 1, 0, 1, 2]);
        for kind in PolicyKind::ALL {
            assert_eq!(faults_for(kind, &trace, 3), vec![0, 1, 3], "{}", kind);
        }
    }

    #[test]
    fn test_empty_trace() {
        for kind in PolicyKind::ALL {
            assert!(faults_for(kind, &[], 3).is_empty());
        }
    }
}
