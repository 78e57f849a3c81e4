//! Plain-text tables for runs and page tables.

use crate::memory::PageTable;
use crate::simulator::{Process, Run, RunSummary};

const FAULT_MARK: &str = "*";

fn pad_row(cells: &[String], widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &w))| {
            if i == 0 {
                format!("{:<w$}", cell, w = w)
            } else {
                format!("{:^w$}", cell, w = w)
            }
        })
        .collect();
    let mut row = line.join(" | ").trim_end().to_string();
    row.push('\n');
    row
}

fn render(header: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = pad_row(&header, &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &rows {
        out.push_str(&pad_row(row, &widths));
    }
    out
}

/// Frame occupancy after every access, one row per physical block
///
/// The last row marks the accesses that faulted.
pub fn frame_table(process: &Process, run: &Run) -> String {
    let mut header = vec!["Visit".to_string()];
    header.extend(run.steps.iter().map(|s| s.access.to_string()));

    let mut rows: Vec<Vec<String>> = process
        .frame_list()
        .iter()
        .enumerate()
        .map(|(slot, block)| {
            let mut row = vec![format!("Block {}", block)];
            row.extend(run.steps.iter().map(|s| match s.resident.get(slot) {
                Some(Some(page)) => page.to_string(),
                _ => String::new(),
            }));
            row
        })
        .collect();

    let mut faults = vec!["Fault".to_string()];
    faults.extend(
        run.steps
            .iter()
            .map(|s| if s.fault { FAULT_MARK.to_string() } else { String::new() }),
    );
    rows.push(faults);

    render(header, rows)
}

/// Dump of `table`, with frames shown as the physical blocks of `process`
pub fn page_table(process: &Process, table: &PageTable) -> String {
    let header = ["Page", "Frame", "Valid", "Access", "Modify", "Swap"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let flag = |b: bool| (if b { "1" } else { "0" }).to_string();

    let rows = table
        .entries()
        .iter()
        .enumerate()
        .map(|(page, entry)| {
            vec![
                page.to_string(),
                entry
                    .frame
                    .and_then(|slot| process.physical_frame(slot))
                    .map_or_else(|| "-".to_string(), |b| b.to_string()),
                flag(entry.valid),
                flag(entry.access),
                flag(entry.modify),
                entry.swap.map_or_else(|| "-".to_string(), |a| a.to_string()),
            ]
        })
        .collect();

    render(header, rows)
}

/// Fault comparison across policies
pub fn summary_table(summaries: &[&RunSummary]) -> String {
    let header = ["Algorithm", "Faults", "Accesses", "Fault rate", "Write-backs"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = summaries
        .iter()
        .map(|s| {
            vec![
                s.policy.to_string(),
                s.faults.to_string(),
                s.accesses.to_string(),
                format!("{:.2}%", s.fault_rate() * 100.0),
                s.write_backs.to_string(),
            ]
        })
        .collect();
    render(header, rows)
}
