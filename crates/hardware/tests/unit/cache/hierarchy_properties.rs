//! Hierarchy Property Tests.
//!
//! Drives randomly configured hierarchies with random read/write streams and checks them
//! against a flat reference model:
//! 1. **Coherence:** Every read returns the last value written to that address.
//! 2. **Uniqueness:** No set ever holds the same valid tag twice.
//! 3. **Accounting:** Every access is classified exactly once.
//! 4. **Durability:** After a flush the backing memory equals the model.

use std::collections::HashMap;

use memsim_core::Session;
use memsim_core::config::{CacheConfig, Config, ReplacementPolicyKind, Topology, WritePolicyKind};
use proptest::prelude::*;

use crate::common::harness::{assert_unique_tags, cache_config, single_level, TEST_MEMORY_BYTES};

#[derive(Clone, Copy, Debug)]
enum Op {
    Read(u32),
    Write(u32, i32),
}

fn cache_strategy() -> impl Strategy<Value = CacheConfig> {
    (
        prop::sample::select(vec![Topology::SetAssociative, Topology::FullyAssociative]),
        prop::sample::select(vec![64usize, 128]),
        prop::sample::select(vec![4usize, 8, 16]),
        prop::sample::select(vec![1usize, 2, 4]),
        prop::sample::select(vec![
            WritePolicyKind::WriteBack,
            WritePolicyKind::WriteThrough,
            WritePolicyKind::WriteThroughNoAllocate,
        ]),
        prop::sample::select(vec![
            ReplacementPolicyKind::Lru,
            ReplacementPolicyKind::Random,
            ReplacementPolicyKind::SecondChance,
            ReplacementPolicyKind::Unconditional,
        ]),
        any::<u64>(),
    )
        .prop_map(|(topology, size, line, ways, write, replacement, seed)| CacheConfig {
            seed,
            ..cache_config(topology, size, line, ways, write, replacement)
        })
}

/// Word accesses confined to 256 bytes, so small caches see plenty of evictions.
fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (0u32..64).prop_map(|i| Op::Read(i * 4)),
        (0u32..64, any::<i32>()).prop_map(|(i, v)| Op::Write(i * 4, v)),
    ];
    prop::collection::vec(op, 1..200)
}

fn replay(config: &Config, ops: &[Op]) -> Result<(), TestCaseError> {
    let mut session = Session::new(config).unwrap();
    let mut model: HashMap<u32, i32> = HashMap::new();
    let (mut reads, mut writes) = (0u64, 0u64);

    for op in ops {
        match *op {
            Op::Read(addr) => {
                let (value, _) = session.load(addr).unwrap();
                prop_assert_eq!(value, model.get(&addr).copied().unwrap_or(0), "read {:#x}", addr);
                reads += 1;
            }
            Op::Write(addr, value) => {
                let _ = session.store(addr, value).unwrap();
                let _ = model.insert(addr, value);
                writes += 1;
            }
        }
        assert_unique_tags(session.hierarchy());
    }

    prop_assert_eq!(session.stats().reads(), reads);
    prop_assert_eq!(session.stats().writes(), writes);

    let _ = session.finish().unwrap();
    let memory = session.memory().unwrap();
    for addr in (0..256u32).step_by(4) {
        prop_assert_eq!(
            memory.peek(addr).unwrap(),
            model.get(&addr).copied().unwrap_or(0),
            "memory {:#x} after flush",
            addr
        );
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn single_level_behaves_like_flat_memory(cache in cache_strategy(), ops in ops_strategy()) {
        replay(&single_level(cache), &ops)?;
    }

    #[test]
    fn two_levels_behave_like_flat_memory(
        l1 in cache_strategy(),
        l2 in cache_strategy(),
        ops in ops_strategy(),
    ) {
        let mut config = single_level(l1);
        config.caches.push(l2);
        prop_assert_eq!(config.memory.size_bytes, TEST_MEMORY_BYTES);
        replay(&config, &ops)?;
    }
}
