//! Error types for the paging simulator.

use thiserror::Error;

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Every failure is fatal to the run that raised it; nothing is retried.
#[derive(Error, Debug)]
pub enum SimError {
    /// Trace referenced a page outside the process address space
    #[error("Page {page} exceeds process total pages {total_pages}")]
    InvalidPageReference { page: usize, total_pages: usize },

    /// OPT was built without the trace it needs to look ahead
    #[error("OPT requires the full reference trace: {0}")]
    MissingLookahead(String),

    /// A policy was driven outside its contract
    #[error("Policy misuse: {0}")]
    PolicyMisuse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid trace token '{token}' on line {line}")]
    Parse { line: usize, token: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
