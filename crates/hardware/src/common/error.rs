//! Fault and Configuration Error definitions.
//!
//! This module defines the two error classes of the memory hierarchy. It provides:
//! 1. **Memory Faults:** Failures of an individual access (bad address, broken invariant).
//! 2. **Consistency Faults:** Disagreements between a replacement simulator and the line
//!    array it shadows. These indicate a modeling bug and must abort the run.
//! 3. **Configuration Errors:** Invalid tokens or geometry rejected before simulation starts.
//! 4. **Trace Errors:** Malformed access-trace input.

use thiserror::Error;

/// A broken invariant between a cache's replacement simulator and its storage.
///
/// None of these can be caused by user input once a cache has been built from a valid
/// configuration; they are never retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConsistencyFault {
    /// More than one valid line in a scope carries the same tag.
    #[error("mapping failure: {count} valid lines hold tag {tag:#x} in set {set}")]
    MultipleMatch {
        /// The duplicated tag.
        tag: u32,
        /// Set index of the scope (0 for fully-associative caches).
        set: u32,
        /// Number of matching lines found.
        count: usize,
    },

    /// The scope is full and missed, but the simulator asked for no eviction.
    #[error(
        "set {set} is full and tag {tag:#x} missed, but the replacement simulator requested no eviction"
    )]
    MissingEviction {
        /// Tag of the access that missed.
        tag: u32,
        /// Set index of the scope.
        set: u32,
    },

    /// The simulator chose a victim that no resident line holds.
    #[error("replacement simulator chose victim {victim:#x} in set {set}, but no line holds it")]
    VictimNotFound {
        /// Tag named as the victim.
        victim: u32,
        /// Set index of the scope.
        set: u32,
    },
}

/// Failure of a single memory access anywhere in the hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MemoryFault {
    /// The address lies beyond the end of the backing store.
    #[error("address {addr:#010x} is outside the {size}-byte backing memory")]
    OutOfRange {
        /// Faulting byte address.
        addr: u32,
        /// Backing store size in bytes.
        size: usize,
    },

    /// The address is not word aligned.
    #[error("address {addr:#010x} is not word aligned")]
    Misaligned {
        /// Faulting byte address.
        addr: u32,
    },

    /// A cache detected an internal-consistency violation.
    #[error("internal consistency fault: {0}")]
    Internal(#[from] ConsistencyFault),

    /// The hierarchy does not end in a flat backing memory.
    #[error("hierarchy has no backing memory")]
    Detached,
}

impl MemoryFault {
    /// Returns `true` for faults caused by a modeling bug rather than by the access itself.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Errors raised while assembling a hierarchy from configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Unknown cache topology token.
    #[error("invalid cache type `{0}` (expected SA or FA)")]
    InvalidTopology(String),

    /// Unknown write policy token.
    #[error("invalid write policy `{0}` (expected WB, WT or WT_NO)")]
    InvalidWritePolicy(String),

    /// Unknown replacement policy token.
    #[error("invalid replacement policy `{0}` (expected LRU, RAND, SCA or UNCOND)")]
    InvalidReplacementPolicy(String),

    /// A numeric argument could not be parsed.
    #[error("failed to parse {field}: `{value}`")]
    InvalidNumber {
        /// Name of the argument.
        field: &'static str,
        /// Raw text that failed to parse.
        value: String,
    },

    /// Wrong number of cache arguments.
    #[error("expected {expected} cache arguments, found {found}")]
    ArgumentCount {
        /// Accepted argument count description.
        expected: &'static str,
        /// Number of arguments supplied.
        found: usize,
    },

    /// A size is zero or not a power of two.
    #[error("{field} must be a positive power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: usize,
    },

    /// The line is larger than the whole cache.
    #[error("line size {line} exceeds cache size {size}")]
    LineExceedsCache {
        /// Line size in bytes.
        line: usize,
        /// Cache size in bytes.
        size: usize,
    },

    /// The cache is larger than the 32-bit address space it maps.
    #[error("cache size {0} exceeds the 4 GiB address space")]
    CacheExceedsAddressSpace(usize),

    /// The line cannot hold a single word.
    #[error("line size {0} is smaller than one word")]
    LineSmallerThanWord(usize),

    /// The way count, rounded up to a power of two, exceeds the line count or overflows.
    #[error("{ways} ways exceed the {lines} lines of the cache")]
    TooManyWays {
        /// Rounded way count.
        ways: usize,
        /// Total number of lines.
        lines: usize,
    },

    /// The backing store size is zero, not word aligned, or exceeds the address space.
    #[error("invalid memory size {0}: must be a non-zero multiple of 4 no larger than 4 GiB")]
    InvalidMemorySize(usize),

    /// A cache line would straddle the end of the backing memory.
    #[error("memory size {memory} is not a multiple of the {line}-byte cache line")]
    MemoryNotLineMultiple {
        /// Backing memory size in bytes.
        memory: usize,
        /// Line size of the offending cache level.
        line: usize,
    },

    /// A configuration document could not be read.
    #[error("failed to read configuration: {0}")]
    Io(String),

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors raised while reading an access trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// A line is not a valid trace event.
    #[error("line {line}: {reason}: `{text}`")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// Offending text, comments stripped.
        text: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The trace could not be read.
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
}

impl TraceError {
    /// Re-attributes a syntax error to `line`.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Self::Syntax { text, reason, .. } => Self::Syntax { line, text, reason },
            other => other,
        }
    }
}
