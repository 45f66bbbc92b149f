//! Cache memory hierarchy simulator library.
//!
//! This crate models a layered memory subsystem issued word accesses by a processor core:
//! 1. **Caches:** Fully- and set-associative levels with pluggable replacement and write policies.
//! 2. **Memory:** A flat word-addressed backing store at the bottom of every hierarchy.
//! 3. **Classification:** Every access is reported as a hit or a cold, conflict or capacity miss.
//! 4. **Simulation:** Configuration, hierarchy assembly, trace replay and statistics collection.

/// Cache levels (lines, replacement simulators, write policies, factory).
pub mod cache;
/// Common types and constants (address layout, miss taxonomy, errors).
pub mod common;
/// Simulator configuration (defaults, policy enums, hierarchical config structures).
pub mod config;
/// Trace format and the session that replays it.
pub mod sim;
/// Hierarchy plumbing (component trait, flat memory, builder).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Trace-driven session owning a hierarchy and its statistics.
pub use crate::sim::Session;
/// Capability shared by every level of the hierarchy.
pub use crate::soc::MemoryComponent;
/// Flat backing memory.
pub use crate::soc::Memory;
