//! Cache Address Decomposition.
//!
//! This module splits 32-bit byte addresses into the fields a cache indexes by. It provides:
//! 1. **Layout:** Field widths derived from cache geometry and fixed at construction.
//! 2. **Decomposition:** Shift-and-mask extraction of `{tag, index, offset}`.
//! 3. **Reassembly:** Shift-and-OR reconstruction of block start addresses for fills and write-backs.
//! 4. **Helpers:** Power-of-two arithmetic shared by configuration validation.

use super::constants::{ADDRESS_BITS, WORD_SHIFT};

/// The fields of a decomposed address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressParts {
    /// High-order bits naming the block.
    pub tag: u32,
    /// Set index (always 0 for a fully-associative cache).
    pub index: u32,
    /// Byte offset within the line.
    pub offset: u32,
}

impl AddressParts {
    /// Returns the index of the addressed word within its line.
    #[inline(always)]
    pub fn word(&self) -> usize {
        (self.offset >> WORD_SHIFT) as usize
    }
}

/// Field widths of a cache address.
///
/// `offset_bits + index_bits + tag_bits` always equals [`ADDRESS_BITS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    offset_bits: u32,
    index_bits: u32,
    tag_bits: u32,
}

impl AddressLayout {
    /// Builds the layout of a set-associative cache.
    ///
    /// # Arguments
    ///
    /// * `cache_bytes` - Total capacity in bytes (power of two).
    /// * `line_bytes` - Line size in bytes (power of two, at most `cache_bytes`).
    /// * `ways` - Associativity (power of two, at most the number of lines).
    ///
    /// The caller is responsible for validating the geometry; see
    /// [`CacheConfig::geometry`](crate::config::CacheConfig::geometry).
    pub fn set_associative(cache_bytes: usize, line_bytes: usize, ways: usize) -> Self {
        let sets = (cache_bytes / line_bytes / ways).max(1);
        Self::from_bits(log2(line_bytes), log2(sets))
    }

    /// Builds the layout of a fully-associative cache (no index field).
    pub fn fully_associative(line_bytes: usize) -> Self {
        Self::from_bits(log2(line_bytes), 0)
    }

    fn from_bits(offset_bits: u32, index_bits: u32) -> Self {
        Self {
            offset_bits,
            index_bits,
            tag_bits: ADDRESS_BITS.saturating_sub(offset_bits + index_bits),
        }
    }

    /// Width of the block-offset field.
    #[inline]
    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Width of the set-index field.
    #[inline]
    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Width of the tag field.
    #[inline]
    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Splits an address into `{tag, index, offset}`.
    #[inline]
    pub fn split(&self, addr: u32) -> AddressParts {
        let tag_shift = self.offset_bits + self.index_bits;
        AddressParts {
            tag: shr(addr, tag_shift) & mask(self.tag_bits),
            index: shr(addr, self.offset_bits) & mask(self.index_bits),
            offset: addr & mask(self.offset_bits),
        }
    }

    /// Reassembles an address from its fields.
    #[inline]
    pub fn join(&self, tag: u32, index: u32, offset: u32) -> u32 {
        let tag_shift = self.offset_bits + self.index_bits;
        shl(tag & mask(self.tag_bits), tag_shift)
            | shl(index & mask(self.index_bits), self.offset_bits)
            | (offset & mask(self.offset_bits))
    }

    /// Returns the address of the first byte of the block named by `tag` in set `index`.
    #[inline]
    pub fn block_start(&self, tag: u32, index: u32) -> u32 {
        self.join(tag, index, 0)
    }
}

/// Returns a mask of the low `bits` bits.
#[inline(always)]
fn mask(bits: u32) -> u32 {
    if bits >= u32::BITS {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

#[inline(always)]
fn shr(value: u32, bits: u32) -> u32 {
    value.checked_shr(bits).unwrap_or(0)
}

#[inline(always)]
fn shl(value: u32, bits: u32) -> u32 {
    value.checked_shl(bits).unwrap_or(0)
}

/// Integer base-2 logarithm (floor). Returns 0 for 0.
#[inline]
pub fn log2(value: usize) -> u32 {
    value.checked_ilog2().unwrap_or(0)
}

/// Rounds `value` up to the next power of two (0 rounds to 1).
///
/// Returns `None` when the result does not fit in a `usize`.
#[inline]
pub fn round_up_power_of_two(value: usize) -> Option<usize> {
    value.max(1).checked_next_power_of_two()
}
