//! Cache Factory.
//!
//! Assembles a cache level from a [`CacheConfig`] and the level behind it. Geometry is
//! validated first, so an invalid configuration never yields a partially built cache.

use tracing::debug;

use super::fully_associative::FullyAssociativeCache;
use super::policies::{
    LruSimulator, RandomSimulator, ReplacementSimulator, SecondChanceSimulator,
    UnconditionalSimulator,
};
use super::set_associative::SetAssociativeCache;
use super::write_policy::write_policy;
use crate::common::ConfigError;
use crate::config::{CacheConfig, ReplacementPolicyKind, Topology};
use crate::soc::traits::MemoryComponent;

/// Builds an empty replacement simulator.
///
/// # Arguments
///
/// * `kind` - Replacement policy.
/// * `capacity` - Lines in the scope the simulator covers.
/// * `seed` - Generator seed; used by `Random` only.
pub fn replacement_simulator(
    kind: ReplacementPolicyKind,
    capacity: usize,
    seed: u64,
) -> Box<dyn ReplacementSimulator> {
    match kind {
        ReplacementPolicyKind::Lru => Box::new(LruSimulator::new(capacity)),
        ReplacementPolicyKind::Random => Box::new(RandomSimulator::new(capacity, seed)),
        ReplacementPolicyKind::SecondChance => Box::new(SecondChanceSimulator::new(capacity)),
        ReplacementPolicyKind::Unconditional => Box::new(UnconditionalSimulator::new(capacity)),
    }
}

/// Builds one cache level in front of `next`.
///
/// # Arguments
///
/// * `name` - Level name used in logs and reports (e.g., `"L1"`).
/// * `config` - Topology, geometry and policy selection.
/// * `next` - The level the new cache fills from and writes to.
///
/// # Returns
///
/// The new cache behind `MemoryComponent`, or the geometry error that rejected `config`.
pub fn build_cache(
    name: &str,
    config: &CacheConfig,
    next: Box<dyn MemoryComponent>,
) -> Result<Box<dyn MemoryComponent>, ConfigError> {
    let geometry = config.geometry()?;
    let policy = write_policy(config.write_policy);

    debug!(
        name,
        topology = %config.topology,
        size = geometry.size_bytes,
        line = geometry.line_bytes,
        ways = geometry.ways,
        sets = geometry.sets,
        write = %config.write_policy,
        replacement = %config.replacement,
        "build cache"
    );

    let cache: Box<dyn MemoryComponent> = match config.topology {
        Topology::FullyAssociative => {
            let replacement =
                replacement_simulator(config.replacement, geometry.lines, config.seed);
            Box::new(FullyAssociativeCache::new(geometry, next, policy, replacement).with_name(name))
        }
        Topology::SetAssociative => {
            let prototype = replacement_simulator(config.replacement, geometry.ways, config.seed);
            Box::new(SetAssociativeCache::new(geometry, next, policy, &*prototype).with_name(name))
        }
    };
    Ok(cache)
}
