//! Least Recently Used (LRU) Replacement Simulator.
//!
//! Keeps resident tags ordered by recency. A touched tag moves to the front (Most Recently
//! Used position); on a miss in a full scope the tag at the back is evicted.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - hit: O(C) where C is the capacity (reordering the recency queue)
//!   - miss: O(1) membership test, O(1) eviction
//! - **Space Complexity:** O(C)
//! - **Best Case:** Working sets that fit the scope with good temporal locality
//! - **Worst Case:** Cyclic scans one block larger than the scope (every access misses)

use std::collections::{HashSet, VecDeque};

use super::{Replacement, ReplacementSimulator};

/// LRU simulator state.
#[derive(Debug, Clone)]
pub struct LruSimulator {
    capacity: usize,
    /// Index 0 is MRU, last index is LRU.
    order: VecDeque<u32>,
    members: HashSet<u32>,
}

impl LruSimulator {
    /// Creates an empty LRU simulator.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of lines in the scope (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }
}

impl ReplacementSimulator for LruSimulator {
    fn simulate(&mut self, tag: u32) -> Replacement {
        if self.members.contains(&tag) {
            if let Some(pos) = self.order.iter().position(|&t| t == tag) {
                let _ = self.order.remove(pos);
            }
            self.order.push_front(tag);
            return Replacement::keep(tag);
        }

        let victim = if self.order.len() >= self.capacity {
            self.order.pop_back()
        } else {
            None
        };
        if let Some(v) = victim {
            let _ = self.members.remove(&v);
        }
        self.order.push_front(tag);
        let _ = self.members.insert(tag);

        Replacement { tag, victim }
    }

    fn fresh_instance(&self, capacity: usize) -> Box<dyn ReplacementSimulator> {
        Box::new(Self::new(capacity))
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn residents(&self) -> Vec<u32> {
        self.order.iter().copied().collect()
    }
}
