//! Configuration system for the memory hierarchy simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline memory size, cache geometry and cycle costs.
//! 2. **Structures:** Hierarchical config for the backing memory, each cache level and timing.
//! 3. **Enums:** Cache topology, write policy and replacement policy kinds.
//! 4. **Validation:** Geometry checks that reject invalid caches before anything is built.
//!
//! Configuration is supplied as JSON (`Config::from_json_str` / `Config::from_file`), as CLI
//! tokens (`CacheConfig::from_args`), or via `Config::default()` for a flat memory.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::addr::round_up_power_of_two;
use crate::common::constants::{ADDRESS_BITS, WORD_BYTES};
use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Backing store size in bytes (16 MiB).
    pub const MEMORY_SIZE: usize = crate::common::constants::DEFAULT_MEMORY_BYTES;

    /// Default cache size in bytes (1 KiB).
    pub const CACHE_SIZE: usize = 1024;

    /// Default cache line size in bytes (16 bytes = 4 words).
    pub const CACHE_LINE: usize = 16;

    /// Default cache associativity (1 way = direct-mapped).
    pub const CACHE_WAYS: usize = 1;

    /// Default seed of the random replacement generator.
    pub const RANDOM_SEED: u64 = 123_456_789;

    /// Cycles charged for an access served by a cache.
    pub const HIT_CYCLES: u64 = crate::common::constants::HIT_CYCLES;

    /// Cycles charged for a trip to the backing store.
    pub const MEMORY_CYCLES: u64 = crate::common::constants::MEMORY_CYCLES;
}

/// Cache organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Topology {
    /// Set-associative (`SA`); one way count per set.
    #[default]
    #[serde(rename = "SA", alias = "SetAssociative")]
    SetAssociative,
    /// Fully-associative (`FA`); any block may occupy any line.
    #[serde(rename = "FA", alias = "FullyAssociative")]
    FullyAssociative,
}

/// Write policy kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum WritePolicyKind {
    /// Write-back (`WB`): writes mark the line dirty; data reaches the next level on eviction.
    #[default]
    #[serde(rename = "WB", alias = "WriteBack")]
    WriteBack,
    /// Write-through with allocate (`WT`): writes install the line and forward immediately.
    #[serde(rename = "WT", alias = "WriteThrough")]
    WriteThrough,
    /// Write-through without allocate (`WT_NO`): write misses bypass the cache.
    #[serde(rename = "WT_NO", alias = "WriteThroughNoAllocate")]
    WriteThroughNoAllocate,
}

/// Replacement policy kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ReplacementPolicyKind {
    /// Least Recently Used (`LRU`).
    #[default]
    #[serde(rename = "LRU", alias = "Lru")]
    Lru,
    /// Uniform random victim (`RAND`).
    #[serde(rename = "RAND", alias = "Random")]
    Random,
    /// Second-chance clock (`SCA`).
    #[serde(rename = "SCA", alias = "SecondChance")]
    SecondChance,
    /// Diagnostic single-resident simulator (`UNCOND`); for determinism tests only.
    #[serde(rename = "UNCOND", alias = "Unconditional")]
    Unconditional,
}

macro_rules! token_enum {
    ($ty:ty, $err:path, { $($token:literal => $variant:path),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok($variant),)+
                    other => Err($err(other.to_string())),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let token = match self {
                    $($variant => $token,)+
                };
                f.write_str(token)
            }
        }
    };
}

token_enum!(Topology, ConfigError::InvalidTopology, {
    "SA" => Topology::SetAssociative,
    "FA" => Topology::FullyAssociative,
});

token_enum!(WritePolicyKind, ConfigError::InvalidWritePolicy, {
    "WB" => WritePolicyKind::WriteBack,
    "WT" => WritePolicyKind::WriteThrough,
    "WT_NO" => WritePolicyKind::WriteThroughNoAllocate,
});

token_enum!(ReplacementPolicyKind, ConfigError::InvalidReplacementPolicy, {
    "LRU" => ReplacementPolicyKind::Lru,
    "RAND" => ReplacementPolicyKind::Random,
    "SCA" => ReplacementPolicyKind::SecondChance,
    "UNCOND" => ReplacementPolicyKind::Unconditional,
});

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use memsim_core::config::{Config, ReplacementPolicyKind, Topology, WritePolicyKind};
///
/// let json = r#"{
///     "memory": { "size_bytes": 65536 },
///     "caches": [
///         {
///             "topology": "SA",
///             "size_bytes": 1024,
///             "line_bytes": 16,
///             "ways": 4,
///             "write_policy": "WB",
///             "replacement": "LRU"
///         },
///         {
///             "topology": "FA",
///             "size_bytes": 4096,
///             "line_bytes": 32,
///             "write_policy": "WT",
///             "replacement": "SCA"
///         }
///     ]
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.memory.size_bytes, 65536);
/// assert_eq!(config.caches[0].ways, 4);
/// assert_eq!(config.caches[1].topology, Topology::FullyAssociative);
/// assert_eq!(config.caches[1].write_policy, WritePolicyKind::WriteThrough);
/// assert_eq!(config.caches[1].replacement, ReplacementPolicyKind::SecondChance);
/// assert_eq!(config.timing.memory_cycles, 1000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Flat backing store.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Cache levels ordered from the CPU side (L1 first). Empty means no cache.
    #[serde(default)]
    pub caches: Vec<CacheConfig>,
    /// Cycle costs used by the statistics collector.
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Config {
    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validates every level without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.memory.validate()?;
        for cache in &self.caches {
            let geometry = cache.geometry()?;
            if self.memory.size_bytes % geometry.line_bytes != 0 {
                return Err(ConfigError::MemoryNotLineMultiple {
                    memory: self.memory.size_bytes,
                    line: geometry.line_bytes,
                });
            }
        }
        Ok(())
    }
}

/// Flat backing store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// Size of the backing store in bytes.
    #[serde(default = "MemoryConfig::default_size")]
    pub size_bytes: usize,
}

impl MemoryConfig {
    fn default_size() -> usize {
        defaults::MEMORY_SIZE
    }

    /// Rejects sizes that are zero, not word multiples, or larger than the address space.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = 1u64 << ADDRESS_BITS;
        if self.size_bytes == 0
            || self.size_bytes % WORD_BYTES != 0
            || self.size_bytes as u64 > max
        {
            return Err(ConfigError::InvalidMemorySize(self.size_bytes));
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::MEMORY_SIZE,
        }
    }
}

/// Configuration of a single cache level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Set- or fully-associative organization.
    #[serde(default)]
    pub topology: Topology,
    /// Total capacity in bytes (power of two).
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,
    /// Line size in bytes (power of two, at least one word).
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,
    /// Associativity; rounded up to a power of two. Ignored for fully-associative caches.
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,
    /// Write policy.
    #[serde(default)]
    pub write_policy: WritePolicyKind,
    /// Replacement policy.
    #[serde(default)]
    pub replacement: ReplacementPolicyKind,
    /// Seed of the random replacement generator.
    #[serde(default = "CacheConfig::default_seed")]
    pub seed: u64,
}

impl CacheConfig {
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    fn default_seed() -> u64 {
        defaults::RANDOM_SEED
    }

    /// Parses the CLI token form `<type> <size> <line> <write> <replace> [ways]`.
    ///
    /// A missing or unparsable way count falls back to 1. Every other token is mandatory and
    /// an invalid one is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use memsim_core::config::{CacheConfig, Topology, WritePolicyKind};
    ///
    /// let cache = CacheConfig::from_args(&["SA", "1024", "16", "WT_NO", "RAND", "4"]).unwrap();
    /// assert_eq!(cache.topology, Topology::SetAssociative);
    /// assert_eq!(cache.write_policy, WritePolicyKind::WriteThroughNoAllocate);
    /// assert_eq!(cache.ways, 4);
    ///
    /// let cache = CacheConfig::from_args(&["SA", "1024", "16", "WB", "LRU", "many"]).unwrap();
    /// assert_eq!(cache.ways, 1);
    /// ```
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ConfigError> {
        if !(5..=6).contains(&args.len()) {
            return Err(ConfigError::ArgumentCount {
                expected: "5 or 6",
                found: args.len(),
            });
        }
        let arg = |i: usize| args[i].as_ref();

        let size_bytes = parse_number("cache size", arg(1))?;
        let line_bytes = parse_number("cache line size", arg(2))?;
        let write_policy = arg(3).parse()?;
        let replacement = arg(4).parse()?;
        let ways = args
            .get(5)
            .and_then(|w| w.as_ref().parse::<usize>().ok())
            .unwrap_or(defaults::CACHE_WAYS);
        let topology = arg(0).parse()?;

        Ok(Self {
            topology,
            size_bytes,
            line_bytes,
            ways,
            write_policy,
            replacement,
            seed: defaults::RANDOM_SEED,
        })
    }

    /// Validates the geometry and derives line, set and way counts.
    ///
    /// # Returns
    ///
    /// The normalized geometry: the way count is rounded up to a power of two for
    /// set-associative caches, and equals the line count for fully-associative ones.
    pub fn geometry(&self) -> Result<CacheGeometry, ConfigError> {
        if !self.size_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "cache size",
                value: self.size_bytes,
            });
        }
        if !self.line_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "cache line size",
                value: self.line_bytes,
            });
        }
        if self.size_bytes as u64 > 1u64 << ADDRESS_BITS {
            return Err(ConfigError::CacheExceedsAddressSpace(self.size_bytes));
        }
        if self.line_bytes < WORD_BYTES {
            return Err(ConfigError::LineSmallerThanWord(self.line_bytes));
        }
        if self.line_bytes > self.size_bytes {
            return Err(ConfigError::LineExceedsCache {
                line: self.line_bytes,
                size: self.size_bytes,
            });
        }

        let lines = self.size_bytes / self.line_bytes;
        let ways = match self.topology {
            Topology::FullyAssociative => lines,
            Topology::SetAssociative => {
                round_up_power_of_two(self.ways).ok_or(ConfigError::TooManyWays {
                    ways: self.ways,
                    lines,
                })?
            }
        };
        if ways > lines {
            return Err(ConfigError::TooManyWays { ways, lines });
        }

        Ok(CacheGeometry {
            size_bytes: self.size_bytes,
            line_bytes: self.line_bytes,
            lines,
            ways,
            sets: lines / ways,
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            topology: Topology::default(),
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            write_policy: WritePolicyKind::default(),
            replacement: ReplacementPolicyKind::default(),
            seed: defaults::RANDOM_SEED,
        }
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Validated cache geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Total capacity in bytes.
    pub size_bytes: usize,
    /// Line size in bytes.
    pub line_bytes: usize,
    /// Total number of lines.
    pub lines: usize,
    /// Lines per set (power of two).
    pub ways: usize,
    /// Number of sets.
    pub sets: usize,
}

impl CacheGeometry {
    /// Number of words held by each line.
    #[inline]
    pub fn words_per_line(&self) -> usize {
        self.line_bytes / WORD_BYTES
    }
}

/// Cycle costs charged by the statistics collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Cycles for an access served by a cache.
    #[serde(default = "TimingConfig::default_hit")]
    pub hit_cycles: u64,
    /// Cycles for a trip to the backing store.
    #[serde(default = "TimingConfig::default_memory")]
    pub memory_cycles: u64,
}

impl TimingConfig {
    fn default_hit() -> u64 {
        defaults::HIT_CYCLES
    }

    fn default_memory() -> u64 {
        defaults::MEMORY_CYCLES
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            hit_cycles: defaults::HIT_CYCLES,
            memory_cycles: defaults::MEMORY_CYCLES,
        }
    }
}
