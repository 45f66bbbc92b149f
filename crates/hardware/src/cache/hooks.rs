//! Per-cache observability callbacks.

use std::fmt;

/// Callback invoked with the accessed byte address.
pub type CacheHook = Box<dyn FnMut(u32) + Send>;

/// Optional callbacks fired as a cache classifies accesses.
#[derive(Default)]
pub struct CacheHooks {
    /// Fired when an access finds its block resident.
    pub on_hit: Option<CacheHook>,
    /// Fired when a block is installed into an empty line.
    pub on_cold_miss: Option<CacheHook>,
    /// Fired on a miss that evicts a block, and on a write that bypasses the cache.
    pub on_miss: Option<CacheHook>,
}

impl CacheHooks {
    pub(crate) fn hit(&mut self, addr: u32) {
        if let Some(hook) = self.on_hit.as_mut() {
            hook(addr);
        }
    }

    pub(crate) fn cold_miss(&mut self, addr: u32) {
        if let Some(hook) = self.on_cold_miss.as_mut() {
            hook(addr);
        }
    }

    pub(crate) fn miss(&mut self, addr: u32) {
        if let Some(hook) = self.on_miss.as_mut() {
            hook(addr);
        }
    }
}

impl fmt::Debug for CacheHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHooks")
            .field("on_hit", &self.on_hit.is_some())
            .field("on_cold_miss", &self.on_cold_miss.is_some())
            .field("on_miss", &self.on_miss.is_some())
            .finish()
    }
}
