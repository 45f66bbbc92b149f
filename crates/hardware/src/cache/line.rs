//! Cache Line Storage.
//!
//! A line holds one block of words plus its valid, dirty and tag state. This module also owns
//! the allocation protocol that moves blocks between a line and the next level: the victim's
//! dirty words are written back and the new block is read in, one word at a time.

use tracing::debug;

use crate::common::constants::WORD_SHIFT;
use crate::common::{AddressLayout, MemoryFault};
use crate::soc::traits::MemoryComponent;

/// Cache line entry containing tag, validity, dirty bit and data block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheLine {
    /// True after the first allocation; never cleared afterwards.
    pub valid: bool,
    /// True while the block holds data the next level has not seen.
    pub dirty: bool,
    /// Tag of the held block; meaningful only when `valid`.
    pub tag: u32,
    block: Box<[i32]>,
}

impl CacheLine {
    /// Creates an invalid line holding `words` zeroed words.
    pub fn new(words: usize) -> Self {
        Self {
            valid: false,
            dirty: false,
            tag: 0,
            block: vec![0; words].into_boxed_slice(),
        }
    }

    /// Returns `true` if the line is valid and holds `tag`.
    #[inline]
    pub fn matches(&self, tag: u32) -> bool {
        self.valid && self.tag == tag
    }

    /// Returns the word at index `word` of the block.
    #[inline]
    pub fn word(&self, word: usize) -> i32 {
        self.block[word]
    }

    /// Stores `value` at index `word` of the block.
    #[inline]
    pub fn set_word(&mut self, word: usize, value: i32) {
        self.block[word] = value;
    }

    /// The data block.
    pub fn block(&self) -> &[i32] {
        &self.block
    }

    /// Materializes the block named by `tag` in set `index`, evicting the current occupant.
    ///
    /// # Arguments
    ///
    /// * `next` - The next level of the hierarchy.
    /// * `layout` - Address layout of the owning cache.
    /// * `tag` - Tag of the incoming block.
    /// * `index` - Set index shared by the incoming and outgoing blocks.
    ///
    /// # Returns
    ///
    /// The tag of the evicted block, if the line held a different valid block.
    ///
    /// For every word, a dirty victim word is written back before the incoming word is read.
    /// Afterwards the line is valid, clean and tagged `tag`.
    pub fn allocate(
        &mut self,
        next: &mut dyn MemoryComponent,
        layout: &AddressLayout,
        tag: u32,
        index: u32,
    ) -> Result<Option<u32>, MemoryFault> {
        let evicted = (self.valid && self.tag != tag).then_some(self.tag);
        let write_back = evicted.is_some() && self.dirty;
        let block_start = layout.block_start(tag, index);
        let victim_start = layout.block_start(self.tag, index);

        if let Some(victim) = evicted {
            debug!(victim, tag, set = index, dirty = self.dirty, "evict");
        }

        for (i, word) in self.block.iter_mut().enumerate() {
            let offset = (i as u32) << WORD_SHIFT;
            if write_back {
                let _ = next.write(victim_start + offset, *word)?;
            }
            let (value, _) = next.read(block_start + offset)?;
            *word = value;
        }

        self.tag = tag;
        self.valid = true;
        self.dirty = false;
        Ok(evicted)
    }

    /// Writes a dirty block back to the next level and marks the line clean.
    ///
    /// # Returns
    ///
    /// `true` if anything was written.
    pub fn write_back(
        &mut self,
        next: &mut dyn MemoryComponent,
        layout: &AddressLayout,
        index: u32,
    ) -> Result<bool, MemoryFault> {
        if !(self.valid && self.dirty) {
            return Ok(false);
        }
        let start = layout.block_start(self.tag, index);
        debug!(tag = self.tag, set = index, "write back");
        for (i, word) in self.block.iter().enumerate() {
            let _ = next.write(start + ((i as u32) << WORD_SHIFT), *word)?;
        }
        self.dirty = false;
        Ok(true)
    }
}
