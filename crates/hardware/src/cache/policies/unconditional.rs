//! Unconditional Replacement Simulator.
//!
//! Tracks a single resident tag regardless of scope capacity. Every tag that differs from the
//! resident one evicts it. Only useful for deterministic tests of the cache mechanics.

use super::{Replacement, ReplacementSimulator};

/// Single-resident simulator state.
#[derive(Debug, Clone, Default)]
pub struct UnconditionalSimulator {
    capacity: usize,
    resident: Option<u32>,
}

impl UnconditionalSimulator {
    /// Creates an empty simulator. `capacity` is reported but not enforced.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            resident: None,
        }
    }
}

impl ReplacementSimulator for UnconditionalSimulator {
    fn simulate(&mut self, tag: u32) -> Replacement {
        match self.resident.replace(tag) {
            Some(previous) if previous != tag => Replacement::evict(tag, previous),
            _ => Replacement::keep(tag),
        }
    }

    fn fresh_instance(&self, capacity: usize) -> Box<dyn ReplacementSimulator> {
        Box::new(Self::new(capacity))
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn residents(&self) -> Vec<u32> {
        self.resident.into_iter().collect()
    }
}
