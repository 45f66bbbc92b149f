//! Cache Replacement Simulators.
//!
//! Decides eviction victims from a stream of tags without touching cache data. A cache drives
//! its simulator exactly once per access, before consulting storage, and trusts the answer to
//! agree with its own occupancy.
//!
//! # Policies
//!
//! - `LruSimulator`: Least Recently Used.
//! - `RandomSimulator`: Uniform random victim from a seeded xorshift generator.
//! - `SecondChanceSimulator`: Clock with one reference bit per resident tag.
//! - `UnconditionalSimulator`: Single resident tag; for determinism tests only.

use std::fmt::Debug;

/// Least Recently Used replacement simulator.
pub mod lru;

/// Random replacement simulator.
pub mod random;

/// Second-chance (clock) replacement simulator.
pub mod second_chance;

/// Diagnostic single-resident simulator.
pub mod unconditional;

pub use lru::LruSimulator;
pub use random::RandomSimulator;
pub use second_chance::SecondChanceSimulator;
pub use unconditional::UnconditionalSimulator;

/// Outcome of presenting one tag to a replacement simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Replacement {
    /// The tag that was presented.
    pub tag: u32,
    /// Resident tag chosen for eviction, if the scope was full and `tag` was absent.
    pub victim: Option<u32>,
}

impl Replacement {
    /// Outcome with no eviction.
    #[inline]
    pub fn keep(tag: u32) -> Self {
        Self { tag, victim: None }
    }

    /// Outcome evicting `victim` in favour of `tag`.
    #[inline]
    pub fn evict(tag: u32, victim: u32) -> Self {
        Self {
            tag,
            victim: Some(victim),
        }
    }

    /// Returns `true` when the caller must evict `victim` to make room.
    #[inline]
    pub fn need_replace(&self) -> bool {
        self.victim.is_some()
    }
}

/// Trait for cache replacement simulators.
///
/// A simulator tracks the set of tags resident in one scope (one set of a set-associative
/// cache, or a whole fully-associative cache) and chooses which to evict.
pub trait ReplacementSimulator: Send + Debug {
    /// Records an access to `tag` and reports whether a resident tag must be evicted.
    ///
    /// # Arguments
    ///
    /// * `tag` - Tag of the block being accessed.
    ///
    /// # Returns
    ///
    /// A [`Replacement`] whose `victim` is set only when `tag` was not resident and the scope
    /// was already at capacity. After the call `tag` is resident.
    fn simulate(&mut self, tag: u32) -> Replacement;

    /// Builds an empty simulator of the same policy for a scope of `capacity` lines.
    ///
    /// Randomized policies reuse their configured seed so sibling instances are reproducible.
    fn fresh_instance(&self, capacity: usize) -> Box<dyn ReplacementSimulator>;

    /// Maximum number of resident tags.
    fn capacity(&self) -> usize;

    /// Currently resident tags, in policy-specific order.
    fn residents(&self) -> Vec<u32>;
}
