//! Hash aggregation: folds the digests of one level into the systematic
//! symbols of the next.

use super::codec::Symbol;
use super::errors::{CmtError, CmtResult};
use super::hash::{digest, Digest, HASH_SIZE};
use super::index::{aggregate_count, SymbolPosition};
use super::params::CmtParams;
use rayon::prelude::*;

/// Hashes every symbol of a level (`k` systematic) and packs the digests into
/// aggregate symbols of `C` digests each, laid out as described in
/// [`super::index`]. Slots without a corresponding symbol stay zero.
pub fn hash_and_aggregate(symbols: &[Symbol], k: usize, params: &CmtParams) -> Vec<Symbol> {
    let hashes: Vec<Digest> = symbols
        .par_iter()
        .map(|symbol| digest(symbol, params.hash))
        .collect();

    let c = params.hash_count;
    (0..aggregate_count(symbols.len(), k, params))
        .into_par_iter()
        .map(|aggregate| {
            let mut out = vec![0u8; c * HASH_SIZE];
            for slot in 0..c {
                let index = match SymbolPosition::from_slot(aggregate, slot, params) {
                    // a systematic slot never reaches into the parity region
                    Some(SymbolPosition::Systematic(i)) if i < k => Some(i),
                    Some(SymbolPosition::Parity(offset)) => Some(k + offset),
                    _ => None,
                };
                if let Some(hash) = index.and_then(|index| hashes.get(index)) {
                    out[slot * HASH_SIZE..(slot + 1) * HASH_SIZE].copy_from_slice(hash);
                }
            }
            out
        })
        .collect()
}

/// Splits an aggregate symbol back into its digests, in aggregation order.
pub fn partition(symbol: &[u8]) -> CmtResult<Vec<Digest>> {
    if symbol.is_empty() || symbol.len() % HASH_SIZE != 0 {
        return Err(CmtError::codec(
            "partition",
            &format!("{} bytes is not a whole number of digests", symbol.len()),
        ));
    }
    Ok(symbol
        .chunks_exact(HASH_SIZE)
        .map(|chunk| {
            let mut hash = [0u8; HASH_SIZE];
            hash.copy_from_slice(chunk);
            hash
        })
        .collect())
}
