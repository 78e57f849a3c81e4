use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SimError};
use crate::memory::{Access, AccessMode, Page};

/// Parsed contents of a trace file
///
/// Line 1 lists page numbers, line 2 (optional) the matching 0/1 modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceData {
    pub pages: Vec<Page>,
    pub modes: Vec<AccessMode>,
}

impl TraceData {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let lines: Vec<(usize, &str)> = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .collect();

        if lines.len() > 2 {
            return Err(SimError::InvalidConfig(format!(
                "trace file has {} lines, expected pages and optional modes",
                lines.len()
            )));
        }

        let pages = match lines.first() {
            Some(&(n, line)) => Self::parse_page_line(line, n)?,
            None => Vec::new(),
        };
        let modes = match lines.get(1) {
            Some(&(n, line)) => Self::parse_mode_line(line, n)?,
            None => vec![AccessMode::Read; pages.len()],
        };

        if modes.len() != pages.len() {
            return Err(SimError::InvalidConfig(format!(
                "{} pages but {} access modes",
                pages.len(),
                modes.len()
            )));
        }

        Ok(TraceData { pages, modes })
    }

    fn parse_page_line(line: &str, n: usize) -> Result<Vec<Page>> {
        line.split_whitespace()
            .map(|token| {
                token.parse().map_err(|_| SimError::Parse {
                    line: n,
                    token: token.to_string(),
                })
            })
            .collect()
    }

    fn parse_mode_line(line: &str, n: usize) -> Result<Vec<AccessMode>> {
        line.split_whitespace()
            .map(|token| {
                token
                    .parse::<u8>()
                    .ok()
                    .and_then(AccessMode::from_bit)
                    .ok_or_else(|| SimError::Parse {
                        line: n,
                        token: token.to_string(),
                    })
            })
            .collect()
    }

    pub fn accesses(&self) -> Vec<Access> {
        self.pages
            .iter()
            .zip(self.modes.iter())
            .map(|(&page, &mode)| Access::new(page, mode))
            .collect()
    }
}

/// Generate `length` uniform accesses over pages `[0, page_range)`
///
/// Each access is a write with probability `write_ratio`. A seed makes the
/// trace reproducible.
pub fn generate_trace(
    length: usize,
    page_range: usize,
    write_ratio: f64,
    seed: Option<u64>,
) -> Result<Vec<Access>> {
    if page_range == 0 {
        return Err(SimError::InvalidConfig("page range must be positive".to_string()));
    }
    if !(0.0..=1.0).contains(&write_ratio) {
        return Err(SimError::InvalidConfig(format!(
            "write ratio {} outside [0, 1]",
            write_ratio
        )));
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    Ok((0..length)
        .map(|_| {
            let page = rng.gen_range(0..page_range);
            let mode = if rng.gen_bool(write_ratio) {
                AccessMode::Write
            } else {
                AccessMode::Read
            };
            Access::new(page, mode)
        })
        .collect())
}

pub fn write_report<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    fs::write(path.as_ref(), content)?;
    Ok(())
}
