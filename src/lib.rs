pub mod constants;
pub mod error;
pub mod io;
pub mod memory;
pub mod policy;
pub mod report;
pub mod simulator;

// Re-export commonly used items for convenience
pub use error::{Result, SimError};
pub use memory::{Access, AccessMode, FrameSet, Page, PageTable, PageTableEntry};
pub use policy::{Placement, PolicyKind, ReplacementPolicy};
pub use simulator::{compare, Process, Run, RunSummary, Simulator, StepResult};
