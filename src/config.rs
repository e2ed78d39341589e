//! Centralized configuration and builder for VShadow block indexes.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - BlockConfig::from_env() reads VS_* variables; builder setters override them.
//! - IndexBuilder produces a ready BlockIndex (axis + config).
//!
//! Env:
//! - VS_BLOCK_SIZE         — размер блока store в байтах (default 0x4000); 0x-префикс допустим.
//! - VS_MAX_OVERLAY_DEPTH  — guard на длину overlay-цепочки (default 1<<20).
//! - VS_TEARDOWN_ORDER     — forward|reverse, порядок освобождения цепочек при clear().

use std::fmt;

use crate::block::{IndexOrder, TeardownOrder};
use crate::consts::{BLOCK_SIZE, DEFAULT_MAX_OVERLAY_DEPTH};
use crate::index::BlockIndex;

/// Top-level configuration for block indexing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockConfig {
    /// Size of one store block in bytes (range width for containment lookups).
    /// Env: VS_BLOCK_SIZE (default 0x4000)
    pub block_size: u64,

    /// Maximum descriptors in one overlay chain (clone budget and insert guard).
    /// Env: VS_MAX_OVERLAY_DEPTH (default 1048576)
    pub max_overlay_depth: usize,

    /// Chain release order used when an index is cleared.
    /// Env: VS_TEARDOWN_ORDER = forward|reverse (default forward)
    pub teardown_order: TeardownOrder,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            max_overlay_depth: DEFAULT_MAX_OVERLAY_DEPTH,
            teardown_order: TeardownOrder::Forward,
        }
    }
}

fn parse_u64(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse::<u64>().ok(),
    }
}

impl BlockConfig {
    /// Load configuration from environment variables. Invalid values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("VS_BLOCK_SIZE") {
            match parse_u64(&v) {
                Some(n) if n > 0 => cfg.block_size = n,
                _ => log::warn!("VS_BLOCK_SIZE='{}' ignored (expected positive integer)", v),
            }
        }

        if let Ok(v) = std::env::var("VS_MAX_OVERLAY_DEPTH") {
            match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => cfg.max_overlay_depth = n,
                _ => log::warn!("VS_MAX_OVERLAY_DEPTH='{}' ignored (expected positive integer)", v),
            }
        }

        if let Ok(v) = std::env::var("VS_TEARDOWN_ORDER") {
            match v.parse::<TeardownOrder>() {
                Ok(o) => cfg.teardown_order = o,
                Err(e) => log::warn!("VS_TEARDOWN_ORDER ignored: {}", e),
            }
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_block_size(mut self, size: u64) -> Self {
        self.block_size = size;
        self
    }

    pub fn with_max_overlay_depth(mut self, depth: usize) -> Self {
        self.max_overlay_depth = depth;
        self
    }

    pub fn with_teardown_order(mut self, order: TeardownOrder) -> Self {
        self.teardown_order = order;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> Self {
        self
    }
}

impl fmt::Display for BlockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BlockConfig {{ block_size: 0x{:x}, max_overlay_depth: {}, teardown_order: {} }}",
            self.block_size,
            self.max_overlay_depth,
            self.teardown_order.as_str(),
        )
    }
}

/// Builder that produces a BlockIndex.
#[derive(Clone, Debug)]
pub struct IndexBuilder {
    order: IndexOrder,
    cfg: BlockConfig,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            order: IndexOrder::Original,
            cfg: BlockConfig::from_env(),
        }
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            order: IndexOrder::Original,
            cfg: BlockConfig::default(),
        }
    }

    pub fn order(mut self, order: IndexOrder) -> Self {
        self.order = order;
        self
    }

    pub fn block_size(mut self, size: u64) -> Self {
        self.cfg.block_size = size;
        self
    }

    pub fn max_overlay_depth(mut self, depth: usize) -> Self {
        self.cfg.max_overlay_depth = depth;
        self
    }

    pub fn teardown_order(mut self, order: TeardownOrder) -> Self {
        self.cfg.teardown_order = order;
        self
    }

    pub fn config(&self) -> &BlockConfig {
        &self.cfg
    }

    pub fn build(self) -> BlockIndex {
        BlockIndex::with_config(self.order, self.cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u64_accepts_hex() {
        assert_eq!(parse_u64("0x4000"), Some(0x4000));
        assert_eq!(parse_u64(" 16384 "), Some(16384));
        assert_eq!(parse_u64("0xzz"), None);
    }
}
