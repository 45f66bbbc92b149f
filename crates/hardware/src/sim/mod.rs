//! Trace-driven simulation.
//!
//! Provides the access-trace format and the session that replays it against a hierarchy
//! while collecting statistics.

/// Session driving a hierarchy.
pub mod session;

/// Access trace format and parser.
pub mod trace;

pub use session::{Outcome, Session};
pub use trace::{TraceEvent, parse_trace};
