//! Set-Associative Cache Tests.
//!
//! Verifies set indexing, conflict classification, per-set replacement state, way rounding,
//! write-back traffic and consistency faults.
//!
//! Geometry notes:
//!   - 32 B / 16 B lines / 1 way: 2 sets, index = bit 4, tag = `addr >> 5`.
//!   - 64 B / 16 B lines / 2 ways: 2 sets, index = bit 4, tag = `addr >> 5`.

use memsim_core::common::{ConsistencyFault, MemoryFault, ReadMissKind, WriteMissKind};
use memsim_core::config::{ReplacementPolicyKind, WritePolicyKind};
use memsim_core::soc::{LineState, MemoryComponent, backing_memory};
use pretty_assertions::assert_eq;

use crate::common::harness::{sa_cache, sa_cache_with};
use crate::common::mocks::memory::{Access, NeverEvict};

// ══════════════════════════════════════════════════════════
// 1. Direct-mapped
// ══════════════════════════════════════════════════════════

#[test]
fn blocks_in_different_sets_do_not_interfere() {
    let (mut cache, _) = sa_cache(32, 16, 1, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    assert_eq!(cache.read(0x00).unwrap().1, ReadMissKind::Cold);
    assert_eq!(cache.read(0x10).unwrap().1, ReadMissKind::Cold);
    assert_eq!(cache.read(0x04).unwrap().1, ReadMissKind::Hit);
    assert_eq!(cache.read(0x1C).unwrap().1, ReadMissKind::Hit);
}

#[test]
fn same_set_different_tag_is_conflict() {
    let (mut cache, _) = sa_cache(32, 16, 1, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    let _ = cache.read(0x00).unwrap();
    assert_eq!(cache.read(0x20).unwrap().1, ReadMissKind::Conflict);
    assert_eq!(cache.read(0x00).unwrap().1, ReadMissKind::Conflict);
    // The other set is still empty.
    assert!(!cache.line(1, 0).unwrap().valid);
}

/// A dirty block is written back before the conflicting block is read, word by word.
#[test]
fn conflict_writes_back_dirty_victim() {
    let (mut cache, log) = sa_cache(32, 16, 1, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    assert_eq!(cache.write(0, 7).unwrap(), WriteMissKind::Allocate);
    assert_eq!(cache.write(0, 9).unwrap(), WriteMissKind::Hit);
    assert_eq!(log.reads(), vec![0, 4, 8, 12]);
    assert!(log.writes().is_empty());
    let _ = log.take();

    assert_eq!(cache.read(32).unwrap(), (0, ReadMissKind::Conflict));
    assert_eq!(
        log.snapshot(),
        vec![
            Access::Write(0, 9),
            Access::Read(32),
            Access::Write(4, 0),
            Access::Read(36),
            Access::Write(8, 0),
            Access::Read(40),
            Access::Write(12, 0),
            Access::Read(44),
        ]
    );
    assert_eq!(backing_memory(&cache).unwrap().peek(0).unwrap(), 9);
    assert!(!cache.line(0, 0).unwrap().dirty);
}

// ══════════════════════════════════════════════════════════
// 2. Associativity
// ══════════════════════════════════════════════════════════

#[test]
fn ways_absorb_conflicts_until_set_is_full() {
    let (mut cache, _) = sa_cache(64, 16, 2, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    assert_eq!(cache.read(0).unwrap().1, ReadMissKind::Cold);
    assert_eq!(cache.read(32).unwrap().1, ReadMissKind::Cold);
    assert_eq!(cache.read(0).unwrap().1, ReadMissKind::Hit);

    assert_eq!(cache.read(64).unwrap().1, ReadMissKind::Conflict);
    assert_eq!(cache.line(0, 0).unwrap().tag, 0);
    assert_eq!(cache.line(0, 1).unwrap().tag, 2);
    assert!(!cache.line(1, 0).unwrap().valid);
}

#[test]
fn each_set_has_its_own_simulator() {
    let (mut cache, _) = sa_cache(64, 16, 2, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    for addr in [0x00, 0x10, 0x20, 0x30] {
        let _ = cache.read(addr).unwrap();
    }
    assert_eq!(cache.replacement(0).unwrap().residents(), vec![1, 0]);
    assert_eq!(cache.replacement(1).unwrap().residents(), vec![1, 0]);
    assert!(cache.replacement(2).is_none());
}

/// Way counts are rounded up to a power of two.
#[test]
fn ways_are_rounded_up() {
    let (mut cache, _) = sa_cache(64, 16, 3, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    assert_eq!(cache.geometry().ways, 4);
    assert_eq!(cache.geometry().sets, 1);
    for addr in [0, 16, 32, 48] {
        assert_eq!(cache.read(addr).unwrap().1, ReadMissKind::Cold);
    }
    assert_eq!(cache.read(64).unwrap().1, ReadMissKind::Conflict);
}

#[test]
fn second_chance_spares_recently_used_way() {
    let (mut cache, _) = sa_cache(
        64,
        16,
        2,
        WritePolicyKind::WriteBack,
        ReplacementPolicyKind::SecondChance,
    );
    let _ = cache.read(0).unwrap();
    let _ = cache.read(32).unwrap();
    let _ = cache.read(0).unwrap();
    let _ = cache.read(64).unwrap();
    // Tag 1 (addr 32) lost its slot; tag 0 survived on its reference bit.
    assert_eq!(cache.read(0).unwrap().1, ReadMissKind::Hit);
    assert_eq!(cache.read(32).unwrap().1, ReadMissKind::Conflict);
}

// ══════════════════════════════════════════════════════════
// 3. Faults and inspection
// ══════════════════════════════════════════════════════════

#[test]
fn simulator_without_eviction_is_a_consistency_fault() {
    let (mut cache, _) = sa_cache_with(32, 16, 1, WritePolicyKind::WriteBack, &NeverEvict);
    let _ = cache.read(0).unwrap();
    assert_eq!(
        cache.read(32),
        Err(MemoryFault::Internal(ConsistencyFault::MissingEviction {
            tag: 1,
            set: 0
        }))
    );
}

#[test]
fn misaligned_write_is_rejected() {
    let (mut cache, log) = sa_cache(
        32,
        16,
        1,
        WritePolicyKind::WriteThroughNoAllocate,
        ReplacementPolicyKind::Lru,
    );
    assert_eq!(cache.write(6, 1), Err(MemoryFault::Misaligned { addr: 6 }));
    assert!(log.snapshot().is_empty());
}

#[test]
fn line_states_are_set_major() {
    let (mut cache, _) = sa_cache(64, 16, 2, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    let _ = cache.write(0x10, 1).unwrap();
    let states = cache.line_states();
    assert_eq!(states.len(), 4);
    assert_eq!(
        states[2],
        LineState {
            set: 1,
            way: 0,
            valid: true,
            dirty: true,
            tag: 0
        }
    );
    assert!(states.iter().filter(|s| s.valid).count() == 1);
}

#[test]
fn flush_visits_every_set() {
    let (mut cache, log) = sa_cache(64, 16, 2, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    let _ = cache.write(0x00, 1).unwrap();
    let _ = cache.write(0x10, 2).unwrap();
    let _ = cache.write(0x24, 3).unwrap();
    let _ = log.take();

    cache.flush().unwrap();
    let mut written: Vec<u32> = log.writes().into_iter().map(|(a, _)| a).collect();
    written.sort_unstable();
    assert_eq!(
        written,
        vec![0x00, 0x04, 0x08, 0x0C, 0x10, 0x14, 0x18, 0x1C, 0x20, 0x24, 0x28, 0x2C]
    );
    let memory = backing_memory(&cache).unwrap();
    assert_eq!(memory.peek(0x00).unwrap(), 1);
    assert_eq!(memory.peek(0x10).unwrap(), 2);
    assert_eq!(memory.peek(0x24).unwrap(), 3);
}

#[test]
fn default_name() {
    let (cache, _) = sa_cache(32, 16, 1, WritePolicyKind::WriteBack, ReplacementPolicyKind::Lru);
    assert_eq!(cache.name(), "SA cache");
    assert_eq!(cache.write_policy_kind(), WritePolicyKind::WriteBack);
    assert_eq!(cache.layout().index_bits(), 1);
}
