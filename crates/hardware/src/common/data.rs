//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the simulator.
//! These types are used for the following:
//! 1. **Request Tagging:** Distinguishing instruction fetches from data loads and stores.
//! 2. **Miss Taxonomy:** Reporting how each level of the hierarchy resolved a read or a write.
//! 3. **Statistics Tracking:** Categorizing accesses for cycle accounting.

use std::fmt;

use serde::Serialize;

/// Type of memory access operation issued by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AccessType {
    /// Instruction fetch access.
    Fetch,

    /// Data read access (load instruction).
    Read,

    /// Data write access (store instruction).
    Write,
}

/// Classification of a read access.
///
/// A flat memory always answers `Hit`. Caches distinguish between the first use of an empty
/// slot (`Cold`), an eviction inside a full set (`Conflict`, set-associative only) and an
/// eviction inside a full cache (`Capacity`, fully-associative only).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ReadMissKind {
    /// The requested word was resident.
    Hit,
    /// A free line was filled from the next level.
    Cold,
    /// The target set was full; a resident line was evicted.
    Conflict,
    /// The whole cache was full; a resident line was evicted.
    Capacity,
    /// No classification applies.
    None,
}

impl ReadMissKind {
    /// Returns `true` for every classification that required a fill from the next level.
    #[inline]
    pub fn is_miss(self) -> bool {
        matches!(self, Self::Cold | Self::Conflict | Self::Capacity)
    }
}

impl fmt::Display for ReadMissKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hit => "HIT",
            Self::Cold => "COLD",
            Self::Conflict => "CONFLICT",
            Self::Capacity => "CAPACITY",
            Self::None => "NONE",
        };
        f.write_str(s)
    }
}

/// Classification of a write access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WriteMissKind {
    /// The target line was resident.
    Hit,
    /// The write missed and a line was installed for it.
    Allocate,
    /// The write missed and bypassed this level.
    NoAllocate,
    /// No classification applies.
    None,
}

impl WriteMissKind {
    /// Returns `true` if the write missed at this level.
    #[inline]
    pub fn is_miss(self) -> bool {
        matches!(self, Self::Allocate | Self::NoAllocate)
    }
}

impl fmt::Display for WriteMissKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hit => "HIT",
            Self::Allocate => "ALLOCATE",
            Self::NoAllocate => "NO_ALLOCATE",
            Self::None => "NONE",
        };
        f.write_str(s)
    }
}
