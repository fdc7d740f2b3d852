//! `get_memory_usage_info` report type (spec.md §6, SPEC_FULL.md §6
//! [ADDED]). A small struct rather than a pre-formatted string, so a caller
//! can both `println!("{}", report)` and inspect `report.bytes` /
//! `report.breakdown` programmatically — the generalisation SPEC_FULL.md
//! calls out from the teacher's own `BitSize`/`bitsize_full` gesture at a
//! breakdown (`src/traits.rs`, `src/leaf/mod.rs`).

use std::fmt;

/// Byte-size report for one façade instance, optionally broken down by
/// named component (e.g. `"leaves"`, `"internal nodes"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryUsage {
    pub bytes: usize,
    pub breakdown: Vec<(String, usize)>,
}

impl MemoryUsage {
    pub fn new(bytes: usize, breakdown: Vec<(&str, usize)>) -> Self {
        MemoryUsage {
            bytes,
            breakdown: breakdown.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

impl fmt::Display for MemoryUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} bytes total", self.bytes)?;
        for (label, bytes) in &self.breakdown {
            writeln!(f, "  {label}: {bytes} bytes")?;
        }
        Ok(())
    }
}
