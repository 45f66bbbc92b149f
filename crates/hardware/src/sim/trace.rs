//! Access Trace Parsing.
//!
//! A trace is plain text with one event per line:
//!
//! ```text
//! # comment
//! F 0x0000      instruction fetch
//! R 64          data load
//! W 0x40 -7     data store of a word
//! ```
//!
//! Addresses and values are decimal or `0x`-prefixed hex. Values may be negative; hex values
//! are taken as raw 32-bit patterns. Blank lines and everything after `#` are ignored.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::common::{AccessType, TraceError};

/// One access issued by the stand-in core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Instruction fetch from an address.
    Fetch(u32),
    /// Data load from an address.
    Read(u32),
    /// Data store of a value to an address.
    Write(u32, i32),
}

impl TraceEvent {
    /// The accessed address.
    pub fn addr(&self) -> u32 {
        match *self {
            Self::Fetch(addr) | Self::Read(addr) | Self::Write(addr, _) => addr,
        }
    }

    /// The access category used for statistics.
    pub fn access_type(&self) -> AccessType {
        match self {
            Self::Fetch(_) => AccessType::Fetch,
            Self::Read(_) => AccessType::Read,
            Self::Write(..) => AccessType::Write,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(addr) => write!(f, "F {addr:#x}"),
            Self::Read(addr) => write!(f, "R {addr:#x}"),
            Self::Write(addr, value) => write!(f, "W {addr:#x} {value}"),
        }
    }
}

impl FromStr for TraceEvent {
    type Err = TraceError;

    /// Parses a single event; errors are reported as line 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = strip_comment(s);
        let syntax = |reason| TraceError::Syntax {
            line: 1,
            text: text.to_string(),
            reason,
        };

        let mut fields = text.split_whitespace();
        let kind = fields.next().ok_or_else(|| syntax("empty event"))?;
        let addr = fields
            .next()
            .ok_or_else(|| syntax("missing address"))
            .and_then(|a| parse_u32(a).ok_or_else(|| syntax("invalid address")))?;

        let event = match kind {
            "F" | "f" => Self::Fetch(addr),
            "R" | "r" => Self::Read(addr),
            "W" | "w" => {
                let value = fields
                    .next()
                    .ok_or_else(|| syntax("missing value"))
                    .and_then(|v| parse_i32(v).ok_or_else(|| syntax("invalid value")))?;
                Self::Write(addr, value)
            }
            _ => return Err(syntax("unknown access kind")),
        };

        if fields.next().is_some() {
            return Err(syntax("trailing fields"));
        }
        Ok(event)
    }
}

/// Parses a whole trace.
///
/// # Returns
///
/// Every event in order, or the first error with its 1-based line number.
pub fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceEvent>, TraceError> {
    let mut events = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if strip_comment(&line).is_empty() {
            continue;
        }
        events.push(line.parse().map_err(|e: TraceError| e.at_line(n + 1))?);
    }
    Ok(events)
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code).trim()
}

fn parse_u32(text: &str) -> Option<u32> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn parse_i32(text: &str) -> Option<i32> {
    match text.strip_prefix('-') {
        Some(magnitude) => i32::try_from(-i64::from(parse_u32(magnitude)?)).ok(),
        None => parse_u32(text).map(|bits| bits as i32),
    }
}
