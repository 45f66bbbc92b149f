//! Cache Hierarchy Levels.
//!
//! This module implements the cache levels that sit between the access stream and the flat
//! backing memory. It provides:
//! 1. **Storage:** Lines holding blocks of words with valid, dirty and tag state.
//! 2. **Organization:** Fully-associative and set-associative caches behind `MemoryComponent`.
//! 3. **Replacement:** Simulators that choose victims from the tag stream alone.
//! 4. **Write Handling:** Write-back, write-through and write-through-no-allocate policies.
//! 5. **Assembly:** A factory binding geometry and policies to a new cache level.

/// Cache construction from configuration.
pub mod factory;

/// Fully-associative cache.
pub mod fully_associative;

/// Per-cache observability callbacks.
pub mod hooks;

/// Cache line storage and the allocation protocol.
pub mod line;

/// Replacement simulators (LRU, Random, Second-Chance, Unconditional).
pub mod policies;

/// Set-associative cache.
pub mod set_associative;

/// Write policies (write-back, write-through, write-through-no-allocate).
pub mod write_policy;

pub use factory::{build_cache, replacement_simulator};
pub use fully_associative::FullyAssociativeCache;
pub use hooks::{CacheHook, CacheHooks};
pub use line::CacheLine;
pub use policies::{Replacement, ReplacementSimulator};
pub use set_associative::SetAssociativeCache;
pub use write_policy::{CacheWrite, WritePolicy, write_policy};

use crate::common::constants::WORD_ALIGN_MASK;
use crate::common::{ConsistencyFault, MemoryFault, ReadMissKind, WriteMissKind};

/// How an access was placed into a cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    /// The block was resident.
    Hit,
    /// The block was installed into an empty line.
    Cold,
    /// The block replaced a victim.
    Evicted,
}

impl Placement {
    /// Read classification; `evicted` is `Capacity` or `Conflict` depending on the topology.
    pub(crate) fn read_kind(self, evicted: ReadMissKind) -> ReadMissKind {
        match self {
            Self::Hit => ReadMissKind::Hit,
            Self::Cold => ReadMissKind::Cold,
            Self::Evicted => evicted,
        }
    }

    /// Write classification of an allocating write.
    pub(crate) fn write_kind(self) -> WriteMissKind {
        match self {
            Self::Hit => WriteMissKind::Hit,
            Self::Cold | Self::Evicted => WriteMissKind::Allocate,
        }
    }
}

pub(crate) fn check_aligned(addr: u32) -> Result<(), MemoryFault> {
    if addr & WORD_ALIGN_MASK == 0 {
        Ok(())
    } else {
        Err(MemoryFault::Misaligned { addr })
    }
}

/// Returns the position of the single valid line holding `tag`.
///
/// More than one match is a consistency fault.
pub(crate) fn unique_match<'a>(
    lines: impl IntoIterator<Item = &'a CacheLine>,
    tag: u32,
    set: u32,
) -> Result<Option<usize>, ConsistencyFault> {
    let mut found = None;
    let mut count = 0;
    for (i, line) in lines.into_iter().enumerate() {
        if line.matches(tag) {
            count += 1;
            found = found.or(Some(i));
        }
    }
    if count > 1 {
        return Err(ConsistencyFault::MultipleMatch { tag, set, count });
    }
    Ok(found)
}
