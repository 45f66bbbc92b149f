//! Second-Chance (Clock) Replacement Simulator.
//!
//! Resident tags sit in a ring with one reference bit each. A repeat touch sets the bit. When
//! a full ring misses, the `oldest` cursor sweeps forward clearing set bits until it reaches a
//! tag whose bit is already clear; that tag is the victim and the new tag takes its slot.

use super::{Replacement, ReplacementSimulator};

/// Second-chance simulator state.
#[derive(Debug, Clone)]
pub struct SecondChanceSimulator {
    capacity: usize,
    ring: Vec<u32>,
    referenced: Vec<bool>,
    /// Next slot the sweep inspects.
    oldest: usize,
}

impl SecondChanceSimulator {
    /// Creates an empty second-chance simulator.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of lines in the scope (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            ring: Vec::with_capacity(capacity),
            referenced: Vec::with_capacity(capacity),
            oldest: 0,
        }
    }

    /// Returns the reference bit of a resident tag.
    pub fn is_referenced(&self, tag: u32) -> Option<bool> {
        self.ring
            .iter()
            .position(|&t| t == tag)
            .map(|slot| self.referenced[slot])
    }

    fn advance(&mut self) {
        self.oldest = (self.oldest + 1) % self.capacity;
    }
}

impl ReplacementSimulator for SecondChanceSimulator {
    fn simulate(&mut self, tag: u32) -> Replacement {
        if let Some(slot) = self.ring.iter().position(|&t| t == tag) {
            self.referenced[slot] = true;
            return Replacement::keep(tag);
        }

        if self.ring.len() < self.capacity {
            self.ring.push(tag);
            self.referenced.push(false);
            return Replacement::keep(tag);
        }

        // Terminates within one lap: every slot passed has its bit cleared.
        while self.referenced[self.oldest] {
            self.referenced[self.oldest] = false;
            self.advance();
        }
        let victim = self.ring[self.oldest];
        self.ring[self.oldest] = tag;
        self.advance();

        Replacement::evict(tag, victim)
    }

    fn fresh_instance(&self, capacity: usize) -> Box<dyn ReplacementSimulator> {
        Box::new(Self::new(capacity))
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn residents(&self) -> Vec<u32> {
        self.ring.clone()
    }
}
