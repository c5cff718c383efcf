//! Proof generation and stateless verification.
//!
//! A proof for `(level, index)` is the chain of aggregate symbols containing
//! the digest of the sampled symbol, then the digest of that aggregate, and
//! so on up to the level below the roots. The verifier only needs the roots,
//! `K` and the tree parameters.

use super::aggregate::partition;
use super::codec::Symbol;
use super::errors::{CmtError, CmtResult};
use super::hash::{digest, Digest};
use super::index::SymbolPosition;
use super::params::CmtParams;
use super::tree::CodedMerkleTree;
use std::fmt;
use tracing::debug;

/// Aggregate symbols from the level above the sampled one to the level below
/// the roots.
pub type Proof = Vec<Symbol>;

/// Where a proof stopped matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofMismatch {
    pub level: usize,
    pub index: usize,
    pub reason: MismatchReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    /// The digest in the aggregate does not match the current symbol.
    Digest,
    /// The final digest does not match the root at the derived index.
    Root,
    /// A proof entry is not a whole number of digests.
    MalformedEntry,
    /// The index does not exist under the given `K` and parameters.
    IndexOutOfRange,
    /// The parameters fail validation, so no index arithmetic is attempted.
    InvalidParameters,
}

impl fmt::Display for ProofMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "proof failed at level {} with symbol index {}: {:?}",
            self.level, self.index, self.reason
        )
    }
}

impl CodedMerkleTree {
    /// Generates the proof for symbol `index` of level `level`.
    ///
    /// The proof holds `level_count() - 1 - level` aggregate symbols and never
    /// the sampled symbol itself.
    pub fn generate_proof(&self, level: usize, index: usize) -> CmtResult<Proof> {
        let params = self.params();
        let levels = self.levels();
        self.symbol_at(level, index)?;

        let mut proof = Vec::with_capacity(levels.len() - 1 - level);
        let mut moving_index = index;
        let mut moving_k = params.systematic_len(levels[level].len());

        for next_level in &levels[level + 1..] {
            moving_index = SymbolPosition::classify(moving_index, moving_k)
                .aggregate_index(params)
                .ok_or_else(|| CmtError::codec("generate proof", "parity index without parity groups"))?;
            let aggregate = next_level.get(moving_index).ok_or_else(|| {
                CmtError::codec("generate proof", "aggregate index beyond next level")
            })?;
            proof.push(aggregate.clone());
            moving_k /= params.reduction_factor();
        }
        Ok(proof)
    }
}

/// Verifies `symbol` at `(level, index)` against `roots`, where `k` is the
/// systematic count of level 0. Any mismatch yields `false`.
pub fn verify_proof(
    level: usize,
    index: usize,
    symbol: &[u8],
    proof: &[Symbol],
    k: usize,
    roots: &[Digest],
    params: &CmtParams,
) -> bool {
    match check_proof(level, index, symbol, proof, k, roots, params) {
        Ok(()) => true,
        Err(mismatch) => {
            debug!(%mismatch, "proof rejected");
            false
        }
    }
}

/// Like [`verify_proof`] but reports where the proof failed.
pub fn check_proof(
    level: usize,
    index: usize,
    symbol: &[u8],
    proof: &[Symbol],
    k: usize,
    roots: &[Digest],
    params: &CmtParams,
) -> Result<(), ProofMismatch> {
    if params.validate().is_err() {
        return Err(ProofMismatch {
            level,
            index,
            reason: MismatchReason::InvalidParameters,
        });
    }

    let mut current_index = index;
    let mut current_level = level;
    let mut current_hash = digest(symbol, params.hash);
    let mut current_k = u32::try_from(level)
        .ok()
        .and_then(|exp| params.reduction_factor().checked_pow(exp))
        .map_or(0, |divisor| k / divisor);

    let mismatch = |level, index, reason| ProofMismatch {
        level,
        index,
        reason,
    };

    for entry in proof {
        let hashes = partition(entry)
            .map_err(|_| mismatch(current_level, current_index, MismatchReason::MalformedEntry))?;
        let position = SymbolPosition::classify(current_index, current_k);
        let (slot, next_index) = position
            .hash_slot(params)
            .zip(position.aggregate_index(params))
            .ok_or(mismatch(current_level, current_index, MismatchReason::IndexOutOfRange))?;

        match hashes.get(slot) {
            Some(expected) if *expected == current_hash => {}
            Some(_) => return Err(mismatch(current_level, current_index, MismatchReason::Digest)),
            None => {
                return Err(mismatch(current_level, current_index, MismatchReason::MalformedEntry))
            }
        }

        current_index = next_index;
        current_hash = digest(entry, params.hash);
        current_k /= params.reduction_factor();
        current_level += 1;
    }

    match roots.get(current_index) {
        Some(root) if *root == current_hash => Ok(()),
        Some(_) => Err(mismatch(current_level, current_index, MismatchReason::Root)),
        None => Err(mismatch(current_level, current_index, MismatchReason::IndexOutOfRange)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deep_tree() -> CodedMerkleTree {
        // shifts by one per 256-byte symbol, so no two symbols are equal
        let data: Vec<u8> = (0..2048u32).map(|i| (i * 7 + i / 256) as u8).collect();
        CodedMerkleTree::new(&data, &CmtParams::default().with_header_size(1)).unwrap()
    }

    #[test]
    fn test_proof_length_per_level() {
        let tree = deep_tree();
        assert_eq!(tree.level_count(), 3);
        assert_eq!(tree.generate_proof(0, 0).unwrap().len(), 2);
        assert_eq!(tree.generate_proof(1, 3).unwrap().len(), 1);
        assert!(tree.generate_proof(2, 0).unwrap().is_empty());
    }

    #[test]
    fn test_proof_out_of_range() {
        let tree = deep_tree();
        assert!(tree.generate_proof(0, 32).unwrap_err().is_range_error());
        assert!(tree.generate_proof(3, 0).unwrap_err().is_range_error());
    }

    #[test]
    fn test_parity_symbol_proof_verifies() {
        let tree = deep_tree();
        let index = 27;
        let symbol = tree.symbol_at(0, index).unwrap();
        let proof = tree.generate_proof(0, index).unwrap();
        assert_eq!(
            check_proof(0, index, symbol, &proof, tree.systematic_count(), tree.roots(), tree.params()),
            Ok(())
        );
    }

    #[test]
    fn test_mismatch_reports_location() {
        let tree = deep_tree();
        let mut proof = tree.generate_proof(0, 5).unwrap();
        proof[1][0] ^= 0xff;
        let symbol = tree.symbol_at(0, 5).unwrap();
        let err = check_proof(0, 5, symbol, &proof, tree.systematic_count(), tree.roots(), tree.params())
            .unwrap_err();
        // byte 0 sits in the slot holding the digest of the level-1 aggregate
        assert_eq!(err.level, 1);
        assert_eq!(err.reason, MismatchReason::Digest);
    }

    #[test]
    fn test_malformed_entry_is_rejected() {
        let tree = deep_tree();
        let mut proof = tree.generate_proof(0, 0).unwrap();
        proof[0].pop();
        let symbol = tree.symbol_at(0, 0).unwrap();
        let err = check_proof(0, 0, symbol, &proof, tree.systematic_count(), tree.roots(), tree.params())
            .unwrap_err();
        assert_eq!(err.reason, MismatchReason::MalformedEntry);
    }

    #[test]
    fn test_wrong_index_is_rejected() {
        let tree = deep_tree();
        let symbol = tree.symbol_at(0, 4).unwrap();
        let proof = tree.generate_proof(0, 4).unwrap();
        assert!(!verify_proof(0, 5, symbol, &proof, tree.systematic_count(), tree.roots(), tree.params()));
    }

    #[test]
    fn test_level_zero_symbols_are_distinct() {
        let tree = deep_tree();
        let digests: std::collections::HashSet<Digest> = tree.levels()[0]
            .iter()
            .map(|symbol| digest(symbol, tree.params().hash))
            .collect();
        assert_eq!(digests.len(), tree.levels()[0].len());
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let tree = deep_tree();
        let symbol = tree.symbol_at(0, 5).unwrap();
        let proof = tree.generate_proof(0, 5).unwrap();
        let k = tree.systematic_count();

        let mut zero_rate = tree.params().clone();
        zero_rate.rate = 0.0;
        let over_unit_rate = CmtParams::new(1, 1.5, 8);
        for params in [CmtParams::new(1, 0.25, 0), zero_rate, over_unit_rate] {
            assert!(!verify_proof(0, 5, symbol, &proof, k, tree.roots(), &params));
            let err = check_proof(0, 5, symbol, &proof, k, tree.roots(), &params).unwrap_err();
            assert_eq!(err.reason, MismatchReason::InvalidParameters);
            assert_eq!((err.level, err.index), (0, 5));
        }
    }
}
