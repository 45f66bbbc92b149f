//! Simulation session.
//!
//! A `Session` stands in for the processor core: it issues fetches, loads and stores against
//! the top of a hierarchy, records each classification into `SimStats`, and replays traces.
//! The first fault aborts a replay; nothing is retried.

use tracing::{info, warn};

use super::trace::TraceEvent;
use crate::common::{AccessType, ConfigError, MemoryFault, ReadMissKind, WriteMissKind};
use crate::config::{Config, TimingConfig};
use crate::soc::builder::build_hierarchy;
use crate::soc::memory::Memory;
use crate::soc::traits::{MemoryComponent, backing_memory, backing_memory_mut};
use crate::stats::SimStats;

/// Result of one replayed event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A fetch or load returned `value` with classification `kind`.
    Read {
        /// Word read.
        value: i32,
        /// Classification by the top level.
        kind: ReadMissKind,
    },
    /// A store completed with classification `kind`.
    Write {
        /// Classification by the top level.
        kind: WriteMissKind,
    },
}

/// Drives one hierarchy and owns its statistics.
pub struct Session {
    hierarchy: Box<dyn MemoryComponent>,
    timing: TimingConfig,
    cached: bool,
    stats: SimStats,
}

impl Session {
    /// Builds the hierarchy described by `config`.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::with_hierarchy(build_hierarchy(config)?, config.timing))
    }

    /// Wraps an already assembled hierarchy.
    pub fn with_hierarchy(hierarchy: Box<dyn MemoryComponent>, timing: TimingConfig) -> Self {
        let cached = hierarchy.as_memory().is_none();
        Self {
            hierarchy,
            timing,
            cached,
            stats: SimStats::default(),
        }
    }

    /// Issues an instruction fetch.
    pub fn fetch(&mut self, addr: u32) -> Result<(i32, ReadMissKind), MemoryFault> {
        self.read(AccessType::Fetch, addr)
    }

    /// Issues a data load.
    pub fn load(&mut self, addr: u32) -> Result<(i32, ReadMissKind), MemoryFault> {
        self.read(AccessType::Read, addr)
    }

    /// Issues a data store.
    pub fn store(&mut self, addr: u32, value: i32) -> Result<WriteMissKind, MemoryFault> {
        let kind = self.hierarchy.write(addr, value)?;
        self.stats.record_access(AccessType::Write);
        self.stats.record_write(kind, &self.timing, self.cached);
        Ok(kind)
    }

    fn read(&mut self, access: AccessType, addr: u32) -> Result<(i32, ReadMissKind), MemoryFault> {
        let (value, kind) = self.hierarchy.read(addr)?;
        self.stats.record_access(access);
        self.stats.record_read(kind, &self.timing, self.cached);
        Ok((value, kind))
    }

    /// Replays one event.
    pub fn execute(&mut self, event: TraceEvent) -> Result<Outcome, MemoryFault> {
        Ok(match event {
            TraceEvent::Fetch(addr) => {
                let (value, kind) = self.fetch(addr)?;
                Outcome::Read { value, kind }
            }
            TraceEvent::Read(addr) => {
                let (value, kind) = self.load(addr)?;
                Outcome::Read { value, kind }
            }
            TraceEvent::Write(addr, value) => Outcome::Write {
                kind: self.store(addr, value)?,
            },
        })
    }

    /// Replays `events` in order, stopping at the first fault.
    ///
    /// # Returns
    ///
    /// The outcome of every event, or the fault that aborted the run. Statistics keep
    /// everything recorded before the fault.
    pub fn run(
        &mut self,
        events: impl IntoIterator<Item = TraceEvent>,
    ) -> Result<Vec<Outcome>, MemoryFault> {
        let mut outcomes = Vec::new();
        for (index, event) in events.into_iter().enumerate() {
            match self.execute(event) {
                Ok(outcome) => outcomes.push(outcome),
                Err(fault) => {
                    warn!(index, %event, %fault, internal = fault.is_internal(), "run aborted");
                    return Err(fault);
                }
            }
        }
        info!(events = outcomes.len(), cycles = self.stats.cycles, "run complete");
        Ok(outcomes)
    }

    /// Copies a program image into the backing memory, bypassing every cache.
    ///
    /// Meant for loading before the first access; lines already cached are not updated.
    pub fn load_words(&mut self, base: u32, words: &[i32]) -> Result<(), MemoryFault> {
        self.memory_mut()
            .ok_or(MemoryFault::Detached)?
            .load_words(base, words)
    }

    /// Writes every dirty line back down to the backing memory.
    pub fn finish(&mut self) -> Result<&SimStats, MemoryFault> {
        self.hierarchy.flush()?;
        Ok(&self.stats)
    }

    /// Statistics recorded so far.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Cycle costs in use.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Top of the hierarchy.
    pub fn hierarchy(&self) -> &dyn MemoryComponent {
        &*self.hierarchy
    }

    /// Mutable top of the hierarchy.
    pub fn hierarchy_mut(&mut self) -> &mut dyn MemoryComponent {
        &mut *self.hierarchy
    }

    /// The terminal backing memory.
    pub fn memory(&self) -> Option<&Memory> {
        backing_memory(&*self.hierarchy)
    }

    /// Mutable terminal backing memory.
    pub fn memory_mut(&mut self) -> Option<&mut Memory> {
        backing_memory_mut(&mut *self.hierarchy)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("top", &self.hierarchy.name())
            .field("timing", &self.timing)
            .field("stats", &self.stats)
            .finish()
    }
}
