//! Global Simulator Constants.
//!
//! This module defines the constants shared by every level of the memory hierarchy:
//! 1. **Address Constants:** Address width and word geometry.
//! 2. **Timing Constants:** Default cycle costs used by the statistics collector.
//! 3. **Memory Constants:** Default size of the flat backing store.

/// Width of a simulated address in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Size of a machine word in bytes.
pub const WORD_BYTES: usize = 4;

/// Number of low address bits selecting a byte within a word.
pub const WORD_SHIFT: u32 = 2;

/// Mask of the address bits that must be zero for a word-aligned access.
pub const WORD_ALIGN_MASK: u32 = (WORD_BYTES as u32) - 1;

/// Estimated cycles for an access served by a cache.
pub const HIT_CYCLES: u64 = 1;

/// Estimated cycles for a trip to the flat backing store.
pub const MEMORY_CYCLES: u64 = 1000;

/// Default backing store size in bytes (16 MiB).
pub const DEFAULT_MEMORY_BYTES: usize = 16 * 1024 * 1024;
