use super::errors::CmtResult;
use super::hash::Digest;
use super::params::CmtParams;
use super::proof::{check_proof, verify_proof, ProofMismatch};
use super::sample::Sample;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

/// The part of a coded Merkle tree a light client keeps: the roots, the
/// systematic count `K` of level 0 and the parameters of the tree.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    #[serde_as(as = "Vec<Bytes>")]
    pub roots: Vec<Digest>,
    pub systematic_count: usize,
    pub params: CmtParams,
}

impl Commitment {
    pub fn verify(&self, sample: &Sample) -> bool {
        verify_proof(
            sample.level,
            sample.index,
            &sample.symbol,
            &sample.proof,
            self.systematic_count,
            &self.roots,
            &self.params,
        )
    }

    pub fn check(&self, sample: &Sample) -> Result<(), ProofMismatch> {
        check_proof(
            sample.level,
            sample.index,
            &sample.symbol,
            &sample.proof,
            self.systematic_count,
            &self.roots,
            &self.params,
        )
    }

    pub fn to_bytes(&self) -> CmtResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decodes a commitment and rejects parameters that fail validation.
    pub fn from_bytes(bytes: &[u8]) -> CmtResult<Self> {
        let commitment: Self = bincode::deserialize(bytes)?;
        commitment.params.validate()?;
        Ok(commitment)
    }
}
