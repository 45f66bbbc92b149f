//! Memory hierarchy construction.
//!
//! This module builds a complete hierarchy from configuration. It performs:
//! 1. **Validation:** Rejects the backing memory size and every cache geometry up front.
//! 2. **Backing store:** Creates the flat `Memory` at the bottom of the chain.
//! 3. **Cache levels:** Stacks the configured caches from the last level up to L1.

use tracing::info;

use crate::cache::build_cache;
use crate::common::ConfigError;
use crate::config::Config;
use crate::soc::memory::Memory;
use crate::soc::traits::MemoryComponent;

/// Builds the hierarchy described by `config`.
///
/// # Arguments
///
/// * `config` - Memory size and cache levels, L1 first.
///
/// # Returns
///
/// The top of the hierarchy: L1 if any cache is configured, otherwise the flat memory.
/// Fails before allocating anything if any level is invalid.
pub fn build_hierarchy(config: &Config) -> Result<Box<dyn MemoryComponent>, ConfigError> {
    config.validate()?;

    let mut top: Box<dyn MemoryComponent> = Box::new(Memory::new(config.memory.size_bytes));
    for (level, cache) in config.caches.iter().enumerate().rev() {
        top = build_cache(&format!("L{}", level + 1), cache, top)?;
    }

    info!(
        memory_bytes = config.memory.size_bytes,
        levels = config.caches.len(),
        top = top.name(),
        "memory hierarchy ready"
    );
    Ok(top)
}
