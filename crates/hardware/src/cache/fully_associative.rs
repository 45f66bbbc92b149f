//! Fully-Associative Cache.
//!
//! Any block may occupy any line. Lines are appended lazily until the cache reaches capacity;
//! from then on every miss replaces the victim chosen by a single replacement simulator that
//! spans the whole cache. Evicting misses are classified as `Capacity`.

use std::fmt;

use tracing::trace;

use super::hooks::CacheHooks;
use super::line::CacheLine;
use super::policies::ReplacementSimulator;
use super::write_policy::{CacheWrite, WritePolicy};
use super::{Placement, check_aligned, unique_match};
use crate::common::{
    AddressLayout, AddressParts, ConsistencyFault, MemoryFault, ReadMissKind, WriteMissKind,
};
use crate::config::{CacheGeometry, WritePolicyKind};
use crate::soc::traits::{LineState, MemoryComponent};

/// Fully-associative cache level.
pub struct FullyAssociativeCache {
    name: String,
    geometry: CacheGeometry,
    layout: AddressLayout,
    lines: Vec<CacheLine>,
    replacement: Box<dyn ReplacementSimulator>,
    write_policy: &'static dyn WritePolicy,
    next: Box<dyn MemoryComponent>,
    hooks: CacheHooks,
}

impl FullyAssociativeCache {
    /// Creates an empty fully-associative cache.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Validated geometry; `geometry.lines` is the capacity.
    /// * `next` - The level behind this cache.
    /// * `write_policy` - Strategy applied to every write.
    /// * `replacement` - Simulator spanning the whole cache, sized to `geometry.lines`.
    pub fn new(
        geometry: CacheGeometry,
        next: Box<dyn MemoryComponent>,
        write_policy: &'static dyn WritePolicy,
        replacement: Box<dyn ReplacementSimulator>,
    ) -> Self {
        Self {
            name: String::from("FA cache"),
            geometry,
            layout: AddressLayout::fully_associative(geometry.line_bytes),
            lines: Vec::with_capacity(geometry.lines),
            replacement,
            write_policy,
            next,
            hooks: CacheHooks::default(),
        }
    }

    /// Renames the level (e.g., `"L1"`); used in logs and reports.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Maximum number of lines.
    pub fn capacity(&self) -> usize {
        self.geometry.lines
    }

    /// Validated geometry of this cache.
    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Address layout (no index field).
    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// Lines materialized so far, in allocation order.
    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    /// The replacement simulator.
    pub fn replacement(&self) -> &dyn ReplacementSimulator {
        &*self.replacement
    }

    /// Kind of the bound write policy.
    pub fn write_policy_kind(&self) -> WritePolicyKind {
        self.write_policy.kind()
    }

    /// Locates or materializes the line for `addr`.
    ///
    /// The simulator is consulted once, before the line array. Below capacity a miss appends a
    /// new line; at capacity it replaces the line holding the simulator's victim.
    fn resolve(&mut self, addr: u32) -> Result<(usize, Placement, AddressParts), MemoryFault> {
        check_aligned(addr)?;
        let parts = self.layout.split(addr);
        let tag = parts.tag;
        let decision = self.replacement.simulate(tag);

        if let Some(slot) = unique_match(&self.lines, tag, 0)? {
            self.hooks.hit(addr);
            return Ok((slot, Placement::Hit, parts));
        }

        if self.lines.len() < self.capacity() {
            let mut line = CacheLine::new(self.geometry.words_per_line());
            let _ = line.allocate(&mut *self.next, &self.layout, tag, 0)?;
            self.lines.push(line);
            self.hooks.cold_miss(addr);
            return Ok((self.lines.len() - 1, Placement::Cold, parts));
        }

        let victim = decision
            .victim
            .ok_or(ConsistencyFault::MissingEviction { tag, set: 0 })?;
        let slot = self
            .lines
            .iter()
            .position(|line| line.matches(victim))
            .ok_or(ConsistencyFault::VictimNotFound { victim, set: 0 })?;
        let _ = self.lines[slot].allocate(&mut *self.next, &self.layout, tag, 0)?;
        self.hooks.miss(addr);
        Ok((slot, Placement::Evicted, parts))
    }
}

impl fmt::Debug for FullyAssociativeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FullyAssociativeCache")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .field("resident", &self.lines.len())
            .field("write_policy", &self.write_policy.kind())
            .field("replacement", &self.replacement)
            .field("next", &self.next.name())
            .finish_non_exhaustive()
    }
}

impl CacheWrite for FullyAssociativeCache {
    fn write_replace(
        &mut self,
        addr: u32,
        value: i32,
    ) -> Result<(WriteMissKind, &mut CacheLine), MemoryFault> {
        let (slot, placement, parts) = self.resolve(addr)?;
        let line = &mut self.lines[slot];
        line.set_word(parts.word(), value);
        Ok((placement.write_kind(), line))
    }

    fn write_directly(&mut self, addr: u32, value: i32) -> Result<WriteMissKind, MemoryFault> {
        check_aligned(addr)?;
        let parts = self.layout.split(addr);
        let kind = match unique_match(&self.lines, parts.tag, 0)? {
            Some(slot) => {
                self.lines[slot].set_word(parts.word(), value);
                self.hooks.hit(addr);
                WriteMissKind::Hit
            }
            None => {
                self.hooks.miss(addr);
                WriteMissKind::NoAllocate
            }
        };
        let _ = self.next.write(addr, value)?;
        Ok(kind)
    }

    fn forward(&mut self, addr: u32, value: i32) -> Result<WriteMissKind, MemoryFault> {
        self.next.write(addr, value)
    }
}

impl MemoryComponent for FullyAssociativeCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn hooks_mut(&mut self) -> Option<&mut CacheHooks> {
        Some(&mut self.hooks)
    }

    fn read(&mut self, addr: u32) -> Result<(i32, ReadMissKind), MemoryFault> {
        let (slot, placement, parts) = self.resolve(addr)?;
        let value = self.lines[slot].word(parts.word());
        let kind = placement.read_kind(ReadMissKind::Capacity);
        trace!(cache = %self.name, addr, %kind, "read");
        Ok((value, kind))
    }

    fn write(&mut self, addr: u32, value: i32) -> Result<WriteMissKind, MemoryFault> {
        let policy = self.write_policy;
        let kind = policy.write(self, addr, value)?;
        trace!(cache = %self.name, addr, %kind, "write");
        Ok(kind)
    }

    fn next_level(&self) -> Option<&dyn MemoryComponent> {
        Some(&*self.next)
    }

    fn next_level_mut(&mut self) -> Option<&mut dyn MemoryComponent> {
        let next: &mut dyn MemoryComponent = &mut *self.next;
        Some(next)
    }

    fn flush(&mut self) -> Result<(), MemoryFault> {
        for line in &mut self.lines {
            let _ = line.write_back(&mut *self.next, &self.layout, 0)?;
        }
        self.next.flush()
    }

    fn line_states(&self) -> Vec<LineState> {
        self.lines
            .iter()
            .enumerate()
            .map(|(way, line)| LineState {
                set: 0,
                way,
                valid: line.valid,
                dirty: line.dirty,
                tag: line.tag,
            })
            .collect()
    }
}
