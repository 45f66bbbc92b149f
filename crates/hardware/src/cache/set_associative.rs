//! Set-Associative Cache.
//!
//! Lines are organized as `ways` banks of `sets` lines each; a block may occupy any way of the
//! set selected by its index bits. Every set owns an independent replacement simulator sized to
//! the way count. Evicting misses are classified as `Conflict`.

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

/// Set-associative cache level.
pub struct SetAssociativeCache {
    name: String,
    geometry: CacheGeometry,
    layout: AddressLayout,
    /// Indexed as `banks[way][set]`.
    banks: Vec<Vec<CacheLine>>,
    /// One simulator per set.
    replacements: Vec<Box<dyn ReplacementSimulator>>,
    write_policy: &'static dyn WritePolicy,
    next: Box<dyn MemoryComponent>,
    hooks: CacheHooks,
}

impl SetAssociativeCache {
    /// Creates a set-associative cache with every line invalid.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Validated geometry (ways already rounded to a power of two).
    /// * `next` - The level behind this cache.
    /// * `write_policy` - Strategy applied to every write.
    /// * `prototype` - Simulator of the desired policy; each set receives
    ///   `prototype.fresh_instance(geometry.ways)`.
    pub fn new(
        geometry: CacheGeometry,
        next: Box<dyn MemoryComponent>,
        write_policy: &'static dyn WritePolicy,
        prototype: &dyn ReplacementSimulator,
    ) -> Self {
        let words = geometry.words_per_line();
        let banks = (0..geometry.ways)
            .map(|_| (0..geometry.sets).map(|_| CacheLine::new(words)).collect())
            .collect();
        let replacements = (0..geometry.sets)
            .map(|_| prototype.fresh_instance(geometry.ways))
            .collect();

        Self {
            name: String::from("SA cache"),
            geometry,
            layout: AddressLayout::set_associative(
                geometry.size_bytes,
                geometry.line_bytes,
                geometry.ways,
            ),
            banks,
            replacements,
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

    /// Validated geometry of this cache.
    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Address layout.
    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// Returns the line at `way` of `set`.
    pub fn line(&self, set: usize, way: usize) -> Option<&CacheLine> {
        self.banks.get(way).and_then(|bank| bank.get(set))
    }

    /// The replacement simulator of `set`.
    pub fn replacement(&self, set: usize) -> Option<&dyn ReplacementSimulator> {
        self.replacements.get(set).map(|r| &**r)
    }

    /// Kind of the bound write policy.
    pub fn write_policy_kind(&self) -> WritePolicyKind {
        self.write_policy.kind()
    }

    fn find(&self, parts: &AddressParts) -> Result<Option<usize>, ConsistencyFault> {
        let set = parts.index as usize;
        unique_match(
            self.banks.iter().map(|bank| &bank[set]),
            parts.tag,
            parts.index,
        )
    }

    /// Locates or materializes the line for `addr`; returns its way.
    ///
    /// Order: resident line, then the first invalid way, then the way holding the set
    /// simulator's victim.
    fn resolve(&mut self, addr: u32) -> Result<(usize, Placement, AddressParts), MemoryFault> {
        check_aligned(addr)?;
        let parts = self.layout.split(addr);
        let (tag, index) = (parts.tag, parts.index);
        let set = index as usize;
        let decision = self.replacements[set].simulate(tag);

        if let Some(way) = self.find(&parts)? {
            self.hooks.hit(addr);
            return Ok((way, Placement::Hit, parts));
        }

        if let Some(way) = self.banks.iter().position(|bank| !bank[set].valid) {
            let _ = self.banks[way][set].allocate(&mut *self.next, &self.layout, tag, index)?;
            self.hooks.cold_miss(addr);
            return Ok((way, Placement::Cold, parts));
        }

        let victim = decision
            .victim
            .ok_or(ConsistencyFault::MissingEviction { tag, set: index })?;
        let way = self
            .banks
            .iter()
            .position(|bank| bank[set].matches(victim))
            .ok_or(ConsistencyFault::VictimNotFound { victim, set: index })?;
        let _ = self.banks[way][set].allocate(&mut *self.next, &self.layout, tag, index)?;
        self.hooks.miss(addr);
        Ok((way, Placement::Evicted, parts))
    }
}

impl fmt::Debug for SetAssociativeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetAssociativeCache")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .field("write_policy", &self.write_policy.kind())
            .field("next", &self.next.name())
            .finish_non_exhaustive()
    }
}

impl CacheWrite for SetAssociativeCache {
    fn write_replace(
        &mut self,
        addr: u32,
        value: i32,
    ) -> Result<(WriteMissKind, &mut CacheLine), MemoryFault> {
        let (way, placement, parts) = self.resolve(addr)?;
        let line = &mut self.banks[way][parts.index as usize];
        line.set_word(parts.word(), value);
        Ok((placement.write_kind(), line))
    }

    fn write_directly(&mut self, addr: u32, value: i32) -> Result<WriteMissKind, MemoryFault> {
        check_aligned(addr)?;
        let parts = self.layout.split(addr);
        let kind = match self.find(&parts)? {
            Some(way) => {
                self.banks[way][parts.index as usize].set_word(parts.word(), value);
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

impl MemoryComponent for SetAssociativeCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn hooks_mut(&mut self) -> Option<&mut CacheHooks> {
        Some(&mut self.hooks)
    }

    fn read(&mut self, addr: u32) -> Result<(i32, ReadMissKind), MemoryFault> {
        let (way, placement, parts) = self.resolve(addr)?;
        let value = self.banks[way][parts.index as usize].word(parts.word());
        let kind = placement.read_kind(ReadMissKind::Conflict);
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
        for bank in &mut self.banks {
            for (set, line) in bank.iter_mut().enumerate() {
                let _ = line.write_back(&mut *self.next, &self.layout, set as u32)?;
            }
        }
        self.next.flush()
    }

    fn line_states(&self) -> Vec<LineState> {
        let mut states = Vec::with_capacity(self.geometry.lines);
        for set in 0..self.geometry.sets {
            for (way, bank) in self.banks.iter().enumerate() {
                let line = &bank[set];
                states.push(LineState {
                    set,
                    way,
                    valid: line.valid,
                    dirty: line.dirty,
                    tag: line.tag,
                });
            }
        }
        states
    }
}
