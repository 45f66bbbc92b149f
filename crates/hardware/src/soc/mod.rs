//! Memory hierarchy plumbing.
//!
//! This module organizes the pieces every hierarchy is assembled from: the component trait
//! shared by all levels, the flat backing memory, and the builder that stacks cache levels
//! on top of it.

/// Hierarchy builder.
pub mod builder;

/// Flat backing memory.
pub mod memory;

/// Memory component trait shared by every level.
pub mod traits;

pub use builder::build_hierarchy;
pub use memory::Memory;
pub use traits::{LineState, MemoryComponent, backing_memory, backing_memory_mut, depth};
