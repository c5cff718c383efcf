//! Index arithmetic linking a symbol to its aggregate one level up.
//!
//! Aggregate `j` of the next level carries the digests of systematic symbols
//! `j*RF .. (j+1)*RF` in slots `0..RF`, followed by the digests of parity
//! symbols `k + j*(C-RF) .. k + (j+1)*(C-RF)` in slots `RF..C`. Aggregation,
//! proof generation and verification all go through [`SymbolPosition`] so
//! the three can never disagree about that layout.

use super::params::CmtParams;

/// A symbol index classified against the systematic count `k` of its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `index < k`; carries the index itself.
    Systematic(usize),
    /// `index >= k`; carries the offset `index - k` into the parity region.
    Parity(usize),
}

impl SymbolPosition {
    pub fn classify(index: usize, k: usize) -> Self {
        if index < k {
            SymbolPosition::Systematic(index)
        } else {
            SymbolPosition::Parity(index - k)
        }
    }

    /// Index of the next-level aggregate holding this symbol's digest.
    ///
    /// Returns `None` for a parity position when `C == RF` (rate 1, no parity).
    pub fn aggregate_index(self, params: &CmtParams) -> Option<usize> {
        match self {
            SymbolPosition::Systematic(i) => Some(i / params.reduction_factor()),
            SymbolPosition::Parity(offset) => {
                let group = params.parity_group_size();
                (group > 0).then(|| offset / group)
            }
        }
    }

    /// Slot of this symbol's digest inside its aggregate.
    pub fn hash_slot(self, params: &CmtParams) -> Option<usize> {
        match self {
            SymbolPosition::Systematic(i) => Some(i % params.reduction_factor()),
            SymbolPosition::Parity(offset) => {
                let group = params.parity_group_size();
                (group > 0).then(|| offset % group + params.reduction_factor())
            }
        }
    }

    /// Inverse of (`aggregate_index`, `hash_slot`): the position whose digest
    /// sits at `slot` of aggregate `aggregate`.
    pub fn from_slot(aggregate: usize, slot: usize, params: &CmtParams) -> Option<Self> {
        let rf = params.reduction_factor();
        if slot < rf {
            Some(SymbolPosition::Systematic(aggregate * rf + slot))
        } else if slot < params.hash_count {
            let group = params.parity_group_size();
            Some(SymbolPosition::Parity(aggregate * group + slot - rf))
        } else {
            None
        }
    }

    /// Absolute index within a level whose systematic count is `k`.
    pub fn index(self, k: usize) -> usize {
        match self {
            SymbolPosition::Systematic(i) => i,
            SymbolPosition::Parity(offset) => k + offset,
        }
    }
}

/// Maps `index` of a level with `k` systematic symbols to the index of the
/// aggregate (in the next level) that contains its digest.
pub fn next_index(index: usize, k: usize, params: &CmtParams) -> Option<usize> {
    SymbolPosition::classify(index, k).aggregate_index(params)
}

/// Number of aggregates produced from a level of `n` symbols, `k` systematic.
pub fn aggregate_count(n: usize, k: usize, params: &CmtParams) -> usize {
    let k = k.min(n);
    let systematic_groups = k.div_ceil(params.reduction_factor());
    let parity = n - k;
    let parity_groups = match params.parity_group_size() {
        0 => 0,
        group => parity.div_ceil(group),
    };
    systematic_groups.max(parity_groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        // RF = 2, C - RF = 6, level of 16 symbols with k = 4
        let params = CmtParams::default();
        assert_eq!(next_index(0, 4, &params), Some(0));
        assert_eq!(next_index(1, 4, &params), Some(0));
        assert_eq!(next_index(3, 4, &params), Some(1));
        assert_eq!(next_index(4, 4, &params), Some(0));
        assert_eq!(next_index(9, 4, &params), Some(0));
        assert_eq!(next_index(10, 4, &params), Some(1));
        assert_eq!(next_index(15, 4, &params), Some(1));

        assert_eq!(SymbolPosition::classify(3, 4).hash_slot(&params), Some(1));
        assert_eq!(SymbolPosition::classify(4, 4).hash_slot(&params), Some(2));
        assert_eq!(SymbolPosition::classify(15, 4).hash_slot(&params), Some(7));
        assert_eq!(aggregate_count(16, 4, &params), 2);
    }

    #[test]
    fn test_slot_inverse_roundtrip() {
        let params = CmtParams::new(1, 0.5, 6);
        let k = 12;
        let n = params.coded_len(k);
        for index in 0..n {
            let position = SymbolPosition::classify(index, k);
            let aggregate = position.aggregate_index(&params).unwrap();
            let slot = position.hash_slot(&params).unwrap();
            let back = SymbolPosition::from_slot(aggregate, slot, &params).unwrap();
            assert_eq!(back.index(k), index);
        }
    }

    #[test]
    fn test_rate_one_has_no_parity_slots() {
        let params = CmtParams::new(1, 1.0, 4);
        assert_eq!(next_index(7, 8, &params), Some(1));
        assert_eq!(next_index(8, 8, &params), None);
        assert_eq!(SymbolPosition::Parity(0).hash_slot(&params), None);
    }
}
