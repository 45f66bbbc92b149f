//! Fully-Associative Cache Tests.
//!
//! Verifies classification (cold, hit, capacity), victim selection through the replacement
//! simulator, the fill and write-back traffic seen by the next level, hooks, flushing and
//! consistency faults.
//!
//! Unless stated otherwise the cache is 64 bytes with 16-byte lines: 4 lines of 4 words, and
//! the tag is `addr >> 4`.

use std::sync::{Arc, Mutex};

use memsim_core::cache::{FullyAssociativeCache, write_policy};
use memsim_core::common::{ConsistencyFault, MemoryFault, ReadMissKind, WriteMissKind};
use memsim_core::config::{ReplacementPolicyKind, Topology, WritePolicyKind};
use memsim_core::soc::{LineState, MemoryComponent, backing_memory, backing_memory_mut};
use mockall::predicate::eq;
use pretty_assertions::assert_eq;

use crate::common::harness::{cache_config, fa_cache, fa_cache_with, init_tracing};
use crate::common::mocks::memory::{
    Access, MockNextLevel, NeverEvict, PhantomVictim, permissive_next_level,
};

fn lru_cache() -> (FullyAssociativeCache, crate::common::mocks::memory::AccessLog) {
    fa_cache(64, 16, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru)
}

fn poke(cache: &mut FullyAssociativeCache, addr: u32, value: i32) {
    backing_memory_mut(cache).unwrap().poke(addr, value).unwrap();
}

fn peek(cache: &FullyAssociativeCache, addr: u32) -> i32 {
    backing_memory(cache).unwrap().peek(addr).unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Classification
// ══════════════════════════════════════════════════════════

#[test]
fn first_touch_is_cold_then_hit() {
    init_tracing();
    let (mut cache, _) = lru_cache();
    poke(&mut cache, 0x8, 42);

    assert_eq!(cache.read(0x8).unwrap(), (42, ReadMissKind::Cold));
    assert_eq!(cache.read(0x8).unwrap(), (42, ReadMissKind::Hit));
    // Same block, different word.
    assert_eq!(cache.read(0xC).unwrap().1, ReadMissKind::Hit);
}

#[test]
fn fills_every_line_before_evicting() {
    let (mut cache, _) = lru_cache();
    for addr in [0, 16, 32, 48] {
        assert_eq!(cache.read(addr).unwrap().1, ReadMissKind::Cold);
    }
    assert_eq!(cache.lines().len(), 4);
    assert_eq!(cache.read(64).unwrap().1, ReadMissKind::Capacity);
}

/// The LRU victim of a full cache is replaced in place; the other slots keep their blocks.
#[test]
fn capacity_miss_replaces_lru_victim() {
    let (mut cache, _) = lru_cache();
    for addr in [0, 16, 32, 48, 0] {
        let _ = cache.read(addr).unwrap();
    }

    assert_eq!(cache.read(64).unwrap().1, ReadMissKind::Capacity);
    let tags: Vec<u32> = cache.lines().iter().map(|l| l.tag).collect();
    assert_eq!(tags, vec![0, 4, 2, 3]);

    // Tag 1 was evicted; bringing it back evicts tag 2.
    assert_eq!(cache.read(16).unwrap().1, ReadMissKind::Capacity);
    let tags: Vec<u32> = cache.lines().iter().map(|l| l.tag).collect();
    assert_eq!(tags, vec![0, 4, 1, 3]);
}

#[test]
fn back_to_back_capacity_misses() {
    let (mut cache, _) = lru_cache();
    for addr in [0, 16, 32, 48] {
        let _ = cache.read(addr).unwrap();
    }
    for addr in [64, 80, 96, 112, 0] {
        assert_eq!(cache.read(addr).unwrap().1, ReadMissKind::Capacity);
    }
    assert_eq!(cache.replacement().residents().len(), 4);
}

/// Any block may occupy any line: blocks that would share a set elsewhere coexist here.
#[test]
fn no_conflict_misses() {
    let (mut cache, _) = lru_cache();
    for addr in [0x000, 0x400, 0x800, 0xC00] {
        assert_eq!(cache.read(addr).unwrap().1, ReadMissKind::Cold);
    }
    for addr in [0x000, 0x400, 0x800, 0xC00] {
        assert_eq!(cache.read(addr).unwrap().1, ReadMissKind::Hit);
    }
}

// ══════════════════════════════════════════════════════════
// 2. Next-level traffic
// ══════════════════════════════════════════════════════════

#[test]
fn fill_reads_whole_block_in_order() {
    let (mut cache, log) = lru_cache();
    let _ = cache.read(0x28).unwrap();
    assert_eq!(log.reads(), vec![0x20, 0x24, 0x28, 0x2C]);
    assert!(log.writes().is_empty());
}

#[test]
fn clean_eviction_writes_nothing() {
    let (mut cache, log) = lru_cache();
    for addr in [0, 16, 32, 48] {
        let _ = cache.read(addr).unwrap();
    }
    let _ = log.take();
    let _ = cache.read(64).unwrap();
    assert_eq!(log.reads(), vec![64, 68, 72, 76]);
    assert!(log.writes().is_empty());
}

/// A dirty victim is written back word by word, each write preceding the read of the
/// incoming word at the same offset.
#[test]
fn dirty_eviction_interleaves_write_back_and_fill() {
    let (mut cache, log) = fa_cache(32, 16, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    assert_eq!(cache.write(0, 5).unwrap(), WriteMissKind::Allocate);
    assert_eq!(peek(&cache, 0), 0);
    let _ = cache.read(16).unwrap();
    let _ = log.take();

    assert_eq!(cache.read(32).unwrap().1, ReadMissKind::Capacity);
    assert_eq!(
        log.snapshot(),
        vec![
            Access::Write(0, 5),
            Access::Read(32),
            Access::Write(4, 0),
            Access::Read(36),
            Access::Write(8, 0),
            Access::Read(40),
            Access::Write(12, 0),
            Access::Read(44),
        ]
    );
    assert_eq!(peek(&cache, 0), 5);
}

#[test]
fn fill_through_mock_next_level() {
    let config = cache_config(
        Topology::FullyAssociative,
        16,
        16,
        1,
        WritePolicyKind::WriteBack,
        ReplacementPolicyKind::Lru,
    );
    let mut next = MockNextLevel::new();
    let _ = next.expect_name().return_const("mock");
    for addr in [0x40u32, 0x44, 0x48, 0x4C] {
        let _ = next
            .expect_read()
            .with(eq(addr))
            .times(1)
            .returning(|a| Ok((a as i32, ReadMissKind::Hit)));
    }
    let _ = next.expect_write().never();

    let mut cache = FullyAssociativeCache::new(
        config.geometry().unwrap(),
        Box::new(next),
        write_policy(WritePolicyKind::WriteBack),
        memsim_core::cache::replacement_simulator(ReplacementPolicyKind::Lru, 1, 0),
    );
    assert_eq!(cache.read(0x44).unwrap(), (0x44, ReadMissKind::Cold));
    assert_eq!(cache.read(0x4C).unwrap(), (0x4C, ReadMissKind::Hit));
}

#[test]
fn next_level_fault_propagates() {
    let config = cache_config(
        Topology::FullyAssociative,
        16,
        16,
        1,
        WritePolicyKind::WriteBack,
        ReplacementPolicyKind::Lru,
    );
    let mut next = MockNextLevel::new();
    let _ = next.expect_name().return_const("mock");
    let _ = next.expect_read()
        .returning(|addr| Err(MemoryFault::OutOfRange { addr, size: 0 }));

    let mut cache = FullyAssociativeCache::new(
        config.geometry().unwrap(),
        Box::new(next),
        write_policy(WritePolicyKind::WriteBack),
        memsim_core::cache::replacement_simulator(ReplacementPolicyKind::Lru, 1, 0),
    );
    assert_eq!(
        cache.read(0x10),
        Err(MemoryFault::OutOfRange { addr: 0x10, size: 0 })
    );
}

// ══════════════════════════════════════════════════════════
// 3. Faults
// ══════════════════════════════════════════════════════════

#[test]
fn misaligned_access_is_rejected() {
    let (mut cache, log) = lru_cache();
    assert_eq!(cache.read(2), Err(MemoryFault::Misaligned { addr: 2 }));
    assert_eq!(cache.write(5, 1), Err(MemoryFault::Misaligned { addr: 5 }));
    assert!(log.snapshot().is_empty());
}

#[test]
fn address_beyond_memory_is_rejected() {
    let (mut cache, _) = lru_cache();
    assert_eq!(
        cache.read(4096),
        Err(MemoryFault::OutOfRange {
            addr: 4096,
            size: 4096
        })
    );
}

#[test]
fn simulator_without_eviction_is_a_consistency_fault() {
    let (mut cache, _) = fa_cache_with(8, 4, WritePolicyKind::WriteBack, Box::new(NeverEvict));
    let _ = cache.read(0).unwrap();
    let _ = cache.read(4).unwrap();
    let fault = cache.read(8).unwrap_err();
    assert_eq!(
        fault,
        MemoryFault::Internal(ConsistencyFault::MissingEviction { tag: 2, set: 0 })
    );
    assert!(fault.is_internal());
}

#[test]
fn victim_not_resident_is_a_consistency_fault() {
    let (mut cache, _) = fa_cache_with(
        8,
        4,
        WritePolicyKind::WriteBack,
        Box::new(PhantomVictim(0xDEAD)),
    );
    let _ = cache.read(0).unwrap();
    let _ = cache.read(4).unwrap();
    assert_eq!(
        cache.read(8),
        Err(MemoryFault::Internal(ConsistencyFault::VictimNotFound {
            victim: 0xDEAD,
            set: 0
        }))
    );
}

// ══════════════════════════════════════════════════════════
// 4. Hooks, flush and inspection
// ══════════════════════════════════════════════════════════

#[test]
fn hooks_report_each_classification() {
    let (mut cache, _) = fa_cache(32, 16, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    let events = Arc::new(Mutex::new(Vec::new()));
    let (hit, cold, miss) = (events.clone(), events.clone(), events.clone());
    let hooks = cache.hooks_mut().unwrap();
    hooks.on_hit = Some(Box::new(move |a: u32| hit.lock().unwrap().push(("hit", a))));
    hooks.on_cold_miss = Some(Box::new(move |a: u32| cold.lock().unwrap().push(("cold", a))));
    hooks.on_miss = Some(Box::new(move |a: u32| miss.lock().unwrap().push(("miss", a))));

    let _ = cache.read(0).unwrap();
    let _ = cache.read(4).unwrap();
    let _ = cache.write(16, 1).unwrap();
    let _ = cache.read(32).unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![("cold", 0), ("hit", 4), ("cold", 16), ("miss", 32)]
    );
}

#[test]
fn flush_writes_back_dirty_lines_once() {
    let (mut cache, log) = lru_cache();
    let _ = cache.write(0x10, 3).unwrap();
    let _ = cache.read(0x20).unwrap();
    let _ = log.take();

    cache.flush().unwrap();
    assert_eq!(log.writes(), vec![(0x10, 3), (0x14, 0), (0x18, 0), (0x1C, 0)]);
    assert_eq!(peek(&cache, 0x10), 3);
    assert!(cache.lines().iter().all(|l| !l.dirty));

    let _ = log.take();
    cache.flush().unwrap();
    assert!(log.snapshot().is_empty());
}

#[test]
fn line_states_report_slots() {
    let (mut cache, _) = lru_cache();
    let _ = cache.write(0x30, 1).unwrap();
    let _ = cache.read(0x0).unwrap();
    assert_eq!(
        cache.line_states(),
        vec![
            LineState {
                set: 0,
                way: 0,
                valid: true,
                dirty: true,
                tag: 3
            },
            LineState {
                set: 0,
                way: 1,
                valid: true,
                dirty: false,
                tag: 0
            },
        ]
    );
}

#[test]
fn accessors_and_naming() {
    let (cache, _) = lru_cache();
    assert_eq!(cache.name(), "FA cache");
    assert_eq!(cache.capacity(), 4);
    assert_eq!(cache.layout().tag_bits(), 28);
    assert_eq!(cache.write_policy_kind(), WritePolicyKind::WriteBack);
    assert_eq!(cache.next_level().map(|n| n.name()), Some("memory"));

    let renamed = cache.with_name("L1");
    assert_eq!(renamed.name(), "L1");
}

#[test]
fn permissive_next_level_serves_fills() {
    let config = cache_config(
        Topology::FullyAssociative,
        32,
        16,
        1,
        WritePolicyKind::WriteThrough,
        ReplacementPolicyKind::SecondChance,
    );
    let mut cache = FullyAssociativeCache::new(
        config.geometry().unwrap(),
        Box::new(permissive_next_level(-1)),
        write_policy(WritePolicyKind::WriteThrough),
        memsim_core::cache::replacement_simulator(ReplacementPolicyKind::SecondChance, 2, 0),
    );
    assert_eq!(cache.read(0x100).unwrap(), (-1, ReadMissKind::Cold));
    assert_eq!(cache.write(0x104, 9).unwrap(), WriteMissKind::Hit);
    assert_eq!(cache.read(0x104).unwrap(), (9, ReadMissKind::Hit));
}
