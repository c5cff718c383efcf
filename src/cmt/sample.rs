use super::codec::Symbol;
use super::errors::CmtResult;
use super::proof::Proof;
use super::tree::CodedMerkleTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A released symbol with its proof, as served to a light client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub level: usize,
    pub index: usize,
    pub symbol: Symbol,
    pub proof: Proof,
}

impl Sample {
    pub fn to_bytes(&self) -> CmtResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> CmtResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl CodedMerkleTree {
    /// Returns symbol and proof for every requested index of `level` that is
    /// not withheld. Withheld indices are omitted; a short result is partial
    /// evidence of unavailability, not an error.
    pub fn sample(&self, level: usize, indices: &[usize]) -> CmtResult<Vec<Sample>> {
        let mut samples = Vec::with_capacity(indices.len());
        for &index in indices {
            let symbol = self.symbol_at(level, index)?;
            if self.hide_pattern().is_withheld(level, index) {
                debug!(level, index, "requested symbol is withheld");
                continue;
            }
            samples.push(Sample {
                level,
                index,
                symbol: symbol.clone(),
                proof: self.generate_proof(level, index)?,
            });
        }
        Ok(samples)
    }
}
