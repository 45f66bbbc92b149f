//! Common utilities and types used throughout the memory hierarchy simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Address Layout:** Decomposition of addresses into tag, set index and block offset.
//! 2. **Constants:** Word geometry, address width and default timing.
//! 3. **Memory Access:** Access types and the read/write miss taxonomy.
//! 4. **Error Handling:** Memory faults, consistency faults, configuration and trace errors.

/// Address decomposition and power-of-two helpers.
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access and miss classification types.
pub mod data;

/// Fault and configuration error types.
pub mod error;

pub use addr::{AddressLayout, AddressParts};
pub use constants::{WORD_BYTES, WORD_SHIFT};
pub use data::{AccessType, ReadMissKind, WriteMissKind};
pub use error::{ConfigError, ConsistencyFault, MemoryFault, TraceError};
