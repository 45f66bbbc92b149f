//! Memory component trait for every level of the hierarchy.
//!
//! This module defines the `MemoryComponent` trait implemented by the flat backing memory and
//! by every cache level. It provides:
//! 1. **Access:** Word read and write returning the level's miss classification.
//! 2. **Chaining:** `next_level` links a cache to whatever sits behind it.
//! 3. **Maintenance:** Optional `flush` for levels that buffer dirty data.
//! 4. **Inspection:** Line-state snapshots and downcasts to the terminal `Memory`.
//! 5. **Observability:** Per-level hit and miss callbacks for cache levels.
//!
//! All implementors must be `Send` so a whole hierarchy can be moved into another thread.

use crate::cache::hooks::CacheHooks;
use crate::common::{MemoryFault, ReadMissKind, WriteMissKind};
use crate::soc::memory::Memory;

/// Snapshot of one cache line, as reported by [`MemoryComponent::line_states`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineState {
    /// Set index (0 for fully-associative caches).
    pub set: usize,
    /// Way within the set (slot position for fully-associative caches).
    pub way: usize,
    /// Whether the line holds a block.
    pub valid: bool,
    /// Whether the line holds data not yet written to the next level.
    pub dirty: bool,
    /// Tag of the held block; meaningful only when `valid`.
    pub tag: u32,
}

/// A level of the memory hierarchy.
///
/// Reads and writes take word-aligned byte addresses. Every error is fatal to the run: either
/// the address is invalid, or a cache detected an internal-consistency fault.
pub trait MemoryComponent: Send {
    /// Returns a short name for this level (e.g., `"memory"`, `"FA cache"`).
    fn name(&self) -> &str;

    /// Reads one word and reports how this level resolved the access.
    fn read(&mut self, addr: u32) -> Result<(i32, ReadMissKind), MemoryFault>;

    /// Writes one word and reports how this level resolved the access.
    fn write(&mut self, addr: u32, value: i32) -> Result<WriteMissKind, MemoryFault>;

    /// Returns the level behind this one; `None` at the terminal memory.
    fn next_level(&self) -> Option<&dyn MemoryComponent> {
        None
    }

    /// Mutable variant of [`next_level`](Self::next_level).
    fn next_level_mut(&mut self) -> Option<&mut dyn MemoryComponent> {
        None
    }

    /// Writes every dirty line back to the next level, then flushes that level.
    fn flush(&mut self) -> Result<(), MemoryFault> {
        Ok(())
    }

    /// Reports the state of every line held by this level (empty for the flat memory).
    fn line_states(&self) -> Vec<LineState> {
        Vec::new()
    }

    /// Hit and miss callbacks of this level; `None` for levels that do not classify accesses.
    fn hooks_mut(&mut self) -> Option<&mut CacheHooks> {
        None
    }

    /// Returns a reference as `Memory` if this level is the flat backing store.
    fn as_memory(&self) -> Option<&Memory> {
        None
    }

    /// Returns a mutable reference as `Memory` if this level is the flat backing store.
    fn as_memory_mut(&mut self) -> Option<&mut Memory> {
        None
    }
}

/// Walks the chain from `component` down to the terminal backing memory.
pub fn backing_memory(component: &dyn MemoryComponent) -> Option<&Memory> {
    if let Some(memory) = component.as_memory() {
        return Some(memory);
    }
    component.next_level().and_then(backing_memory)
}

/// Mutable variant of [`backing_memory`].
pub fn backing_memory_mut(component: &mut dyn MemoryComponent) -> Option<&mut Memory> {
    if component.as_memory().is_some() {
        return component.as_memory_mut();
    }
    component.next_level_mut().and_then(backing_memory_mut)
}

/// Number of levels in the chain starting at `component`, the backing memory included.
pub fn depth(component: &dyn MemoryComponent) -> usize {
    1 + component.next_level().map_or(0, depth)
}
