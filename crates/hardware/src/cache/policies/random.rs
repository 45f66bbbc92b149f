//! Random Replacement Simulator.
//!
//! Evicts a uniformly chosen resident tag when a full scope misses. Victims come from a
//! 64-bit xorshift generator, so a given seed always yields the same eviction sequence.

use super::{Replacement, ReplacementSimulator};

/// Random simulator state.
#[derive(Debug, Clone)]
pub struct RandomSimulator {
    capacity: usize,
    residents: Vec<u32>,
    /// Seed the generator started from; reused by `fresh_instance`.
    seed: u64,
    /// Internal state for the pseudo-random number generator.
    state: u64,
}

impl RandomSimulator {
    /// Creates an empty Random simulator.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of lines in the scope (at least 1).
    /// * `seed` - Generator seed; zero is replaced by a fixed non-zero value since xorshift
    ///   never leaves the all-zero state.
    pub fn new(capacity: usize, seed: u64) -> Self {
        let capacity = capacity.max(1);
        let seed = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self {
            capacity,
            residents: Vec::with_capacity(capacity),
            seed,
            state: seed,
        }
    }

    fn next_index(&mut self, len: usize) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x % len as u64) as usize
    }
}

impl ReplacementSimulator for RandomSimulator {
    fn simulate(&mut self, tag: u32) -> Replacement {
        if self.residents.contains(&tag) {
            return Replacement::keep(tag);
        }

        if self.residents.len() < self.capacity {
            self.residents.push(tag);
            return Replacement::keep(tag);
        }

        let index = self.next_index(self.residents.len());
        let victim = self.residents.swap_remove(index);
        self.residents.push(tag);
        Replacement::evict(tag, victim)
    }

    fn fresh_instance(&self, capacity: usize) -> Box<dyn ReplacementSimulator> {
        Box::new(Self::new(capacity, self.seed))
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn residents(&self) -> Vec<u32> {
        self.residents.clone()
    }
}
