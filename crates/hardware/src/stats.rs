//! Simulation statistics collection and reporting.
//!
//! This module tracks the metrics of a memory hierarchy run. It provides:
//! 1. **Access mix:** Counts of instruction fetches, loads and stores.
//! 2. **Read taxonomy:** Hits, cold, conflict and capacity misses at the top level.
//! 3. **Write taxonomy:** Hits, allocating misses and no-allocate misses at the top level.
//! 4. **Cycle estimate:** Cache hits and trips to the backing store, priced by `TimingConfig`.
//! 5. **Reporting:** Sectioned text reports and JSON via `serde`.

use std::io::{self, Write};
use std::time::Instant;

use serde::Serialize;

use crate::common::{AccessType, ReadMissKind, WriteMissKind};
use crate::config::TimingConfig;

/// Simulation statistics structure tracking all metrics of one session.
///
/// Classifications are those reported by the top of the hierarchy. When no cache is
/// configured every access is a memory `Hit` priced at `memory_cycles`.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Estimated cycles spent on memory accesses.
    pub cycles: u64,

    /// Instruction fetches issued.
    pub fetches: u64,
    /// Data loads issued.
    pub loads: u64,
    /// Data stores issued.
    pub stores: u64,

    /// Reads served by a resident line.
    pub read_hits: u64,
    /// Reads that filled an empty line.
    pub read_cold: u64,
    /// Reads that evicted a line from a full set.
    pub read_conflict: u64,
    /// Reads that evicted a line from a full fully-associative cache.
    pub read_capacity: u64,

    /// Writes that found their line resident.
    pub write_hits: u64,
    /// Writes that allocated a line.
    pub write_allocate: u64,
    /// Writes that bypassed the cache.
    pub write_no_allocate: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            fetches: 0,
            loads: 0,
            stores: 0,
            read_hits: 0,
            read_cold: 0,
            read_conflict: 0,
            read_capacity: 0,
            write_hits: 0,
            write_allocate: 0,
            write_no_allocate: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"accesses"`, `"reads"`, `"writes"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "accesses", "reads", "writes"];

impl SimStats {
    /// Counts one issued access.
    pub fn record_access(&mut self, access: AccessType) {
        match access {
            AccessType::Fetch => self.fetches += 1,
            AccessType::Read => self.loads += 1,
            AccessType::Write => self.stores += 1,
        }
    }

    /// Counts a read classification and charges its cycles.
    ///
    /// # Arguments
    ///
    /// * `kind` - Classification reported by the top level.
    /// * `timing` - Cycle costs.
    /// * `cached` - Whether the top level is a cache (otherwise the flat memory).
    pub fn record_read(&mut self, kind: ReadMissKind, timing: &TimingConfig, cached: bool) {
        match kind {
            ReadMissKind::Hit => self.read_hits += 1,
            ReadMissKind::Cold => self.read_cold += 1,
            ReadMissKind::Conflict => self.read_conflict += 1,
            ReadMissKind::Capacity => self.read_capacity += 1,
            ReadMissKind::None => {}
        }
        self.cycles += if !cached {
            timing.memory_cycles
        } else if kind.is_miss() {
            timing.hit_cycles + timing.memory_cycles
        } else {
            timing.hit_cycles
        };
    }

    /// Counts a write classification and charges its cycles.
    ///
    /// A no-allocate write costs one trip to memory; an allocating write costs a hit plus
    /// the fill.
    pub fn record_write(&mut self, kind: WriteMissKind, timing: &TimingConfig, cached: bool) {
        match kind {
            WriteMissKind::Hit => self.write_hits += 1,
            WriteMissKind::Allocate => self.write_allocate += 1,
            WriteMissKind::NoAllocate => self.write_no_allocate += 1,
            WriteMissKind::None => {}
        }
        self.cycles += match (cached, kind) {
            (false, _) | (true, WriteMissKind::NoAllocate) => timing.memory_cycles,
            (true, WriteMissKind::Allocate) => timing.hit_cycles + timing.memory_cycles,
            (true, _) => timing.hit_cycles,
        };
    }

    /// Total reads (fetches and loads).
    pub fn reads(&self) -> u64 {
        self.read_hits + self.read_cold + self.read_conflict + self.read_capacity
    }

    /// Total classified writes.
    pub fn writes(&self) -> u64 {
        self.write_hits + self.write_allocate + self.write_no_allocate
    }

    /// Fraction of reads served by a resident line; 0 when nothing was read.
    pub fn read_hit_rate(&self) -> f64 {
        ratio(self.read_hits, self.reads())
    }

    /// Fraction of writes that found their line resident; 0 when nothing was written.
    pub fn write_hit_rate(&self) -> f64 {
        ratio(self.write_hits, self.writes())
    }

    /// Writes the requested sections to `out`.
    ///
    /// # Arguments
    ///
    /// * `out` - Destination of the report.
    /// * `sections` - Names from [`STATS_SECTIONS`], or empty for all.
    pub fn write_sections(&self, out: &mut impl Write, sections: &[String]) -> io::Result<()> {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();

        writeln!(out, "==========================================================")?;
        writeln!(out, "MEMORY HIERARCHY SIMULATION STATISTICS")?;
        writeln!(out, "==========================================================")?;
        if want("summary") {
            writeln!(out, "host_seconds             {seconds:.4} s")?;
            writeln!(out, "sim_cycles               {}", self.cycles)?;
            writeln!(out, "sim_accesses             {}", self.fetches + self.loads + self.stores)?;
            writeln!(out, "read_hit_rate            {:.2}%", self.read_hit_rate() * 100.0)?;
            writeln!(out, "write_hit_rate           {:.2}%", self.write_hit_rate() * 100.0)?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("accesses") {
            writeln!(out, "ACCESS MIX")?;
            writeln!(out, "  access.fetch           {}", self.fetches)?;
            writeln!(out, "  access.load            {}", self.loads)?;
            writeln!(out, "  access.store           {}", self.stores)?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("reads") {
            let total = self.reads();
            writeln!(out, "READS")?;
            for (name, count) in [
                ("read.hit", self.read_hits),
                ("read.cold", self.read_cold),
                ("read.conflict", self.read_conflict),
                ("read.capacity", self.read_capacity),
            ] {
                writeln!(out, "  {name:<22} {count} ({:.2}%)", ratio(count, total) * 100.0)?;
            }
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("writes") {
            let total = self.writes();
            writeln!(out, "WRITES")?;
            for (name, count) in [
                ("write.hit", self.write_hits),
                ("write.allocate", self.write_allocate),
                ("write.no_allocate", self.write_no_allocate),
            ] {
                writeln!(out, "  {name:<22} {count} ({:.2}%)", ratio(count, total) * 100.0)?;
            }
        }
        writeln!(out, "==========================================================")
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Output errors are ignored.
    pub fn print_sections(&self, sections: &[String]) {
        let _ = self.write_sections(&mut io::stdout().lock(), sections);
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
