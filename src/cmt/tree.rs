//! Level-by-level construction of a coded Merkle tree.

use super::aggregate::hash_and_aggregate;
use super::availability::HidePattern;
use super::codec::{pad, split, ErasureEncoder, ReedSolomonEncoder, Symbol};
use super::commitment::Commitment;
use super::errors::{CmtError, CmtResult};
use super::hash::{digest, Digest};
use super::params::CmtParams;
use tracing::{debug, info};

/// Bound on level-count recomputations while aligning the systematic count.
const MAX_ALIGNMENT_ROUNDS: usize = 64;

/// A constructed coded Merkle tree together with its availability table.
///
/// `levels` and `roots` never change after construction; only the hide
/// pattern can be replaced.
#[derive(Debug, Clone)]
pub struct CodedMerkleTree {
    params: CmtParams,
    levels: Vec<Vec<Symbol>>,
    roots: Vec<Digest>,
    systematic_count: usize,
    data_len: usize,
    hide_pattern: HidePattern,
}

impl CodedMerkleTree {
    /// Builds a tree over `data` with the default Reed-Solomon encoder.
    pub fn new(data: &[u8], params: &CmtParams) -> CmtResult<Self> {
        Self::construct_with(data, params, &ReedSolomonEncoder::default())
    }

    pub fn construct_with<E: ErasureEncoder + ?Sized>(
        data: &[u8],
        params: &CmtParams,
        encoder: &E,
    ) -> CmtResult<Self> {
        params.validate()?;
        if data.is_empty() {
            return Err(CmtError::EmptyData);
        }

        let padded = pad(data, params.symbol_size)?;
        let mut systematic = split(&padded.buffer, params.symbol_size)?;
        let (systematic_count, level_count) = align_systematic_count(systematic.len(), params)?;
        systematic.resize(systematic_count, vec![0u8; params.symbol_size]);

        info!(
            data_len = data.len(),
            systematic_count,
            aggregate_levels = level_count,
            "constructing coded merkle tree"
        );

        let mut levels = Vec::with_capacity(level_count + 1);
        levels.push(encoder.encode(&systematic, params)?);
        debug!(level = 0, symbols = levels[0].len(), "encoded level");

        let mut k = systematic_count;
        for level in 0..level_count {
            let aggregates = hash_and_aggregate(&levels[level], k, params);
            k = aggregates.len();
            let encoded = encoder.encode(&aggregates, params)?;
            debug!(level = level + 1, symbols = encoded.len(), systematic = k, "encoded level");
            levels.push(encoded);
        }

        let roots: Vec<Digest> = levels
            .last()
            .map(|top| top.iter().map(|symbol| digest(symbol, params.hash)).collect())
            .unwrap_or_default();
        info!(levels = levels.len(), roots = roots.len(), "coded merkle tree ready");

        Ok(Self {
            params: params.clone(),
            levels,
            roots,
            systematic_count,
            data_len: padded.data_len,
            hide_pattern: HidePattern::default(),
        })
    }

    pub fn params(&self) -> &CmtParams {
        &self.params
    }

    pub fn roots(&self) -> &[Digest] {
        &self.roots
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Vec<Symbol>] {
        &self.levels
    }

    /// `K`: systematic symbols of level 0, padding included.
    pub fn systematic_count(&self) -> usize {
        self.systematic_count
    }

    /// Length of the original data before padding.
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    pub fn level(&self, level: usize) -> CmtResult<&[Symbol]> {
        self.levels
            .get(level)
            .map(Vec::as_slice)
            .ok_or(CmtError::LevelOutOfRange {
                level,
                levels: self.levels.len(),
            })
    }

    pub fn symbol_at(&self, level: usize, index: usize) -> CmtResult<&Symbol> {
        let symbols = self.level(level)?;
        symbols.get(index).ok_or(CmtError::IndexOutOfRange {
            level,
            index,
            len: symbols.len(),
        })
    }

    /// Reassembles the original data from the systematic part of level 0.
    pub fn data(&self) -> Vec<u8> {
        let mut out: Vec<u8> = self.levels[0][..self.systematic_count]
            .iter()
            .flatten()
            .copied()
            .collect();
        out.truncate(self.data_len);
        out
    }

    pub fn hide_pattern(&self) -> &HidePattern {
        &self.hide_pattern
    }

    /// Replaces the availability table wholesale.
    pub fn set_hide_pattern(&mut self, pattern: impl Into<HidePattern>) {
        self.hide_pattern = pattern.into();
        debug!(withheld = self.hide_pattern.withheld_count(), "hide pattern replaced");
    }

    /// What a light client needs to verify samples from this tree.
    pub fn commitment(&self) -> Commitment {
        Commitment {
            roots: self.roots.clone(),
            systematic_count: self.systematic_count,
            params: self.params.clone(),
        }
    }
}

/// Rounds `k` up to a multiple of `RF^levels` so that `floor(K / RF^level)` is
/// the exact systematic count of every level, and returns it with the number
/// of aggregate levels.
///
/// The level count is evaluated on the `N0` of the aligned count, the level 0
/// actually built, so padding can raise the height (7 symbols align to 8 and
/// get two aggregate levels where 7 alone would get one).
fn align_systematic_count(k: usize, params: &CmtParams) -> CmtResult<(usize, usize)> {
    let rf = params.reduction_factor();
    let mut aligned = k;
    for _ in 0..MAX_ALIGNMENT_ROUNDS {
        let level_count = params.level_count_for(params.coded_len(aligned))?;
        let block = u32::try_from(level_count)
            .ok()
            .and_then(|exp| rf.checked_pow(exp))
            .ok_or_else(|| CmtError::invalid_parameters("tree too deep for the reduction factor"))?;
        let next = aligned.div_ceil(block) * block;
        if next == aligned {
            return Ok((aligned, level_count));
        }
        aligned = next;
    }
    Err(CmtError::invalid_parameters(
        "systematic count alignment did not converge",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_keeps_exact_counts() {
        let params = CmtParams::default().with_header_size(1);
        // N0 = 20 gives one aggregate level, so k only needs to be even
        assert_eq!(align_systematic_count(5, &params).unwrap(), (6, 1));
        // 7 -> 8 raises N0 to 32 and the level count to 2; 8 is already a multiple of 4
        assert_eq!(align_systematic_count(7, &params).unwrap(), (8, 2));
        let (k, levels) = align_systematic_count(4, &CmtParams::default()).unwrap();
        assert_eq!((k, levels), (4, 0));
    }

    #[test]
    fn test_empty_data_is_rejected() {
        assert_eq!(
            CodedMerkleTree::new(&[], &CmtParams::default()).unwrap_err(),
            CmtError::EmptyData
        );
    }

    #[test]
    fn test_data_roundtrip_through_level_zero() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        let tree = CodedMerkleTree::new(&data, &CmtParams::default().with_header_size(1)).unwrap();
        assert_eq!(tree.data(), data);
        assert_eq!(tree.data_len(), 1000);
    }

    #[test]
    fn test_symbol_access_out_of_range() {
        let tree = CodedMerkleTree::new(&[1u8; 1024], &CmtParams::default()).unwrap();
        assert!(tree.symbol_at(0, 15).is_ok());
        assert!(tree.symbol_at(0, 16).unwrap_err().is_range_error());
        assert!(tree.symbol_at(1, 0).unwrap_err().is_range_error());
    }
}
