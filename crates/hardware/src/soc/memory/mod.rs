//! Flat Backing Memory.
//!
//! This module implements the terminal level of every hierarchy. It provides:
//! 1. **Storage:** A word array addressed by byte address.
//! 2. **Access:** `MemoryComponent` reads and writes that always classify as hits.
//! 3. **Loading:** Side-effect-free `peek`/`poke` used for program images and inspection.
//! 4. **Hooks:** Optional per-access callbacks for tracing traffic that reaches memory.

use std::fmt;

use crate::common::constants::{WORD_ALIGN_MASK, WORD_BYTES, WORD_SHIFT};
use crate::common::{MemoryFault, ReadMissKind, WriteMissKind};
use crate::soc::traits::MemoryComponent;

/// Callback invoked with `(address, value)` for every access that reaches memory.
pub type AccessHook = Box<dyn FnMut(u32, i32) + Send>;

/// Flat word-addressed backing store.
pub struct Memory {
    words: Vec<i32>,
    on_read: Option<AccessHook>,
    on_write: Option<AccessHook>,
}

impl Memory {
    /// Creates a zero-filled memory of `size_bytes` bytes.
    ///
    /// The size is rounded down to a whole number of words. Use
    /// [`MemoryConfig::validate`](crate::config::MemoryConfig::validate) to reject bad sizes.
    pub fn new(size_bytes: usize) -> Self {
        Self {
            words: vec![0; size_bytes / WORD_BYTES],
            on_read: None,
            on_write: None,
        }
    }

    /// Size of the memory in bytes.
    pub fn size_bytes(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Installs a callback fired on every `read`.
    pub fn set_on_read(&mut self, hook: Option<AccessHook>) {
        self.on_read = hook;
    }

    /// Installs a callback fired on every `write`.
    pub fn set_on_write(&mut self, hook: Option<AccessHook>) {
        self.on_write = hook;
    }

    /// Reads a word without firing hooks.
    pub fn peek(&self, addr: u32) -> Result<i32, MemoryFault> {
        let index = self.index(addr)?;
        Ok(self.words[index])
    }

    /// Writes a word without firing hooks.
    pub fn poke(&mut self, addr: u32, value: i32) -> Result<(), MemoryFault> {
        let index = self.index(addr)?;
        self.words[index] = value;
        Ok(())
    }

    /// Copies consecutive words into memory starting at `base`.
    ///
    /// Fails without writing anything if the image does not fit.
    pub fn load_words(&mut self, base: u32, data: &[i32]) -> Result<(), MemoryFault> {
        let start = self.index(base)?;
        let end = start + data.len();
        if end > self.words.len() {
            let last = base as usize + data.len().saturating_sub(1) * WORD_BYTES;
            return Err(MemoryFault::OutOfRange {
                addr: last as u32,
                size: self.size_bytes(),
            });
        }
        self.words[start..end].copy_from_slice(data);
        Ok(())
    }

    fn index(&self, addr: u32) -> Result<usize, MemoryFault> {
        if addr & WORD_ALIGN_MASK != 0 {
            return Err(MemoryFault::Misaligned { addr });
        }
        let index = (addr >> WORD_SHIFT) as usize;
        if index >= self.words.len() {
            return Err(MemoryFault::OutOfRange {
                addr,
                size: self.size_bytes(),
            });
        }
        Ok(index)
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("size_bytes", &self.size_bytes())
            .field("on_read", &self.on_read.is_some())
            .field("on_write", &self.on_write.is_some())
            .finish()
    }
}

impl MemoryComponent for Memory {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&mut self, addr: u32) -> Result<(i32, ReadMissKind), MemoryFault> {
        let value = self.peek(addr)?;
        if let Some(hook) = self.on_read.as_mut() {
            hook(addr, value);
        }
        Ok((value, ReadMissKind::Hit))
    }

    fn write(&mut self, addr: u32, value: i32) -> Result<WriteMissKind, MemoryFault> {
        self.poke(addr, value)?;
        if let Some(hook) = self.on_write.as_mut() {
            hook(addr, value);
        }
        Ok(WriteMissKind::Hit)
    }

    fn as_memory(&self) -> Option<&Memory> {
        Some(self)
    }

    fn as_memory_mut(&mut self) -> Option<&mut Memory> {
        Some(self)
    }
}
