//! Cache Write Policies.
//!
//! Stateless strategies that decide how a write interacts with a cache and the next level.
//! A policy is bound to a cache at construction and calls back into it through [`CacheWrite`].
//!
//! # Policies
//!
//! - `WriteBackPolicy`: Allocate on miss, mark the line dirty, defer the next level to eviction.
//! - `WriteThroughPolicy`: Allocate on miss, keep the line clean, forward every write.
//! - `WriteThroughNoAllocatePolicy`: Update a resident line if any, never allocate, always forward.

use std::fmt::Debug;

use super::line::CacheLine;
use crate::common::{MemoryFault, WriteMissKind};
use crate::config::WritePolicyKind;

/// Write primitives a cache exposes to its write policy.
pub trait CacheWrite {
    /// Stores `value` at `addr`, allocating the block on a miss.
    ///
    /// # Returns
    ///
    /// `Hit` or `Allocate`, together with the line now holding the word.
    fn write_replace(
        &mut self,
        addr: u32,
        value: i32,
    ) -> Result<(WriteMissKind, &mut CacheLine), MemoryFault>;

    /// Updates a resident line without allocating, then forwards the write to the next level.
    ///
    /// # Returns
    ///
    /// `Hit` if a resident line was updated, `NoAllocate` otherwise.
    fn write_directly(&mut self, addr: u32, value: i32) -> Result<WriteMissKind, MemoryFault>;

    /// Writes `value` to the next level.
    fn forward(&mut self, addr: u32, value: i32) -> Result<WriteMissKind, MemoryFault>;
}

/// Trait for cache write policies.
pub trait WritePolicy: Send + Sync + Debug {
    /// The configuration kind this policy implements.
    fn kind(&self) -> WritePolicyKind;

    /// Performs one write against `cache`.
    ///
    /// # Arguments
    ///
    /// * `cache` - The cache the policy is bound to.
    /// * `addr` - Word-aligned byte address.
    /// * `value` - Word to store.
    fn write(
        &self,
        cache: &mut dyn CacheWrite,
        addr: u32,
        value: i32,
    ) -> Result<WriteMissKind, MemoryFault>;
}

/// Write-back with allocate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteBackPolicy;

impl WritePolicy for WriteBackPolicy {
    fn kind(&self) -> WritePolicyKind {
        WritePolicyKind::WriteBack
    }

    fn write(
        &self,
        cache: &mut dyn CacheWrite,
        addr: u32,
        value: i32,
    ) -> Result<WriteMissKind, MemoryFault> {
        let (kind, line) = cache.write_replace(addr, value)?;
        line.dirty = true;
        Ok(kind)
    }
}

/// Write-through with allocate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteThroughPolicy;

impl WritePolicy for WriteThroughPolicy {
    fn kind(&self) -> WritePolicyKind {
        WritePolicyKind::WriteThrough
    }

    fn write(
        &self,
        cache: &mut dyn CacheWrite,
        addr: u32,
        value: i32,
    ) -> Result<WriteMissKind, MemoryFault> {
        let (kind, line) = cache.write_replace(addr, value)?;
        line.dirty = false;
        let _ = cache.forward(addr, value)?;
        Ok(kind)
    }
}

/// Write-through without allocate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteThroughNoAllocatePolicy;

impl WritePolicy for WriteThroughNoAllocatePolicy {
    fn kind(&self) -> WritePolicyKind {
        WritePolicyKind::WriteThroughNoAllocate
    }

    fn write(
        &self,
        cache: &mut dyn CacheWrite,
        addr: u32,
        value: i32,
    ) -> Result<WriteMissKind, MemoryFault> {
        cache.write_directly(addr, value)
    }
}

static WRITE_BACK: WriteBackPolicy = WriteBackPolicy;
static WRITE_THROUGH: WriteThroughPolicy = WriteThroughPolicy;
static WRITE_THROUGH_NO_ALLOCATE: WriteThroughNoAllocatePolicy = WriteThroughNoAllocatePolicy;

/// Returns the shared policy instance for `kind`.
pub fn write_policy(kind: WritePolicyKind) -> &'static dyn WritePolicy {
    match kind {
        WritePolicyKind::WriteBack => &WRITE_BACK,
        WritePolicyKind::WriteThrough => &WRITE_THROUGH,
        WritePolicyKind::WriteThroughNoAllocate => &WRITE_THROUGH_NO_ALLOCATE,
    }
}
