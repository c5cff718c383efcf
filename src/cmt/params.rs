use super::errors::{CmtError, CmtResult};
use super::hash::{HashKind, HASH_SIZE};
use serde::{Deserialize, Serialize};

/// Size of each level-0 symbol in bytes.
pub const DEFAULT_SYMBOL_SIZE: usize = 256;
/// Number of digests aggregated into one symbol of the next level.
pub const DEFAULT_HASH_COUNT: usize = 8;
/// Coding rate `K / N` of every level.
pub const DEFAULT_RATE: f64 = 0.25;
/// Target number of root commitments.
pub const DEFAULT_HEADER_SIZE: usize = 4;

const RATE_EPSILON: f64 = 1e-9;

/// Parameters of a coded Merkle tree.
///
/// Both the block producer and every light client must agree on these; the
/// verifier replays the index arithmetic with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmtParams {
    pub symbol_size: usize,
    /// `C`: digests per aggregate symbol.
    pub hash_count: usize,
    pub rate: f64,
    pub header_size: usize,
    pub hash: HashKind,
}

impl Default for CmtParams {
    fn default() -> Self {
        Self {
            symbol_size: DEFAULT_SYMBOL_SIZE,
            hash_count: DEFAULT_HASH_COUNT,
            rate: DEFAULT_RATE,
            header_size: DEFAULT_HEADER_SIZE,
            hash: HashKind::default(),
        }
    }
}

impl std::fmt::Display for CmtParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Coded Merkle Tree Parameters:")?;
        writeln!(f, "  - Symbol Size: {} bytes", self.symbol_size)?;
        writeln!(f, "  - Hashes per Aggregate (C): {}", self.hash_count)?;
        writeln!(f, "  - Coding Rate: {}", self.rate)?;
        writeln!(f, "  - Header Size: {}", self.header_size)?;
        write!(f, "  - Hash Function: {}", self.hash)
    }
}

impl CmtParams {
    pub fn new(header_size: usize, rate: f64, hash_count: usize) -> Self {
        Self {
            header_size,
            rate,
            hash_count,
            ..Self::default()
        }
    }

    pub fn with_symbol_size(mut self, symbol_size: usize) -> Self {
        self.symbol_size = symbol_size;
        self
    }

    pub fn with_hash(mut self, hash: HashKind) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_header_size(mut self, header_size: usize) -> Self {
        self.header_size = header_size;
        self
    }

    pub fn validate(&self) -> CmtResult<()> {
        if self.header_size == 0 {
            return Err(CmtError::invalid_parameters("header size must be > 0"));
        }
        if !self.rate.is_finite() || self.rate <= 0.0 || self.rate > 1.0 {
            return Err(CmtError::invalid_parameters("rate must be in (0, 1]"));
        }
        if self.hash_count == 0 {
            return Err(CmtError::invalid_parameters(
                "hash count C must be > 0",
            ));
        }
        let scaled = self.hash_count as f64 * self.rate;
        if (scaled - scaled.round()).abs() > RATE_EPSILON || scaled.round() < 1.0 {
            return Err(CmtError::invalid_parameters(
                "C * rate must be a positive integer",
            ));
        }
        if self.symbol_size == 0 || self.symbol_size % 2 != 0 {
            return Err(CmtError::invalid_parameters(
                "symbol size must be a positive multiple of 2 bytes",
            ));
        }
        Ok(())
    }

    /// `RF = C * rate`: how many systematic symbols share one aggregate.
    ///
    /// Only meaningful on validated parameters.
    pub fn reduction_factor(&self) -> usize {
        (self.hash_count as f64 * self.rate).round() as usize
    }

    /// Parity digests per aggregate, `C - RF`.
    pub fn parity_group_size(&self) -> usize {
        self.hash_count - self.reduction_factor()
    }

    /// Byte length of every symbol above level 0.
    pub fn aggregate_symbol_size(&self) -> usize {
        self.hash_count * HASH_SIZE
    }

    /// Symbol length of level `level`.
    pub fn symbol_size_at(&self, level: usize) -> usize {
        if level == 0 {
            self.symbol_size
        } else {
            self.aggregate_symbol_size()
        }
    }

    /// Coded length `N` of a level holding `k` systematic symbols.
    pub fn coded_len(&self, k: usize) -> usize {
        (k * self.hash_count).div_ceil(self.reduction_factor())
    }

    /// Systematic count `floor(n * rate)` of a level holding `n` symbols.
    pub fn systematic_len(&self, n: usize) -> usize {
        n * self.reduction_factor() / self.hash_count
    }

    /// Number of aggregate levels built above a level 0 of `n0` coded symbols:
    /// `floor(ln(n0 / header_size) / (ln(RF) + 1))`.
    pub fn level_count_for(&self, n0: usize) -> CmtResult<usize> {
        self.validate()?;
        let ratio = n0 as f64 / self.header_size as f64;
        let raw = (ratio.ln() / ((self.reduction_factor() as f64).ln() + 1.0)).floor();
        if !raw.is_finite() {
            return Err(CmtError::invalid_parameters(
                "level count is not finite; level 0 is too small for the header size",
            ));
        }
        if raw < 0.0 {
            return Err(CmtError::invalid_parameters(
                "level 0 has fewer symbols than the header size",
            ));
        }
        Ok(raw as usize)
    }
}
