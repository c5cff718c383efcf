//! Coded Merkle Trees for data-availability sampling
//!
//! A coded Merkle tree commits to a block so that a light client can sample a
//! handful of symbols and, with high probability, notice when the block
//! producer withholds part of it.
//!
//! ```rust
//! use coded_merkle_tree::{CmtParams, CodedMerkleTree, HidePattern};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let data = vec![0u8; 4096];
//! let params = CmtParams::default().with_header_size(2);
//! let mut tree = CodedMerkleTree::new(&data, &params)?;
//!
//! // The block producer withholds one symbol
//! tree.set_hide_pattern(HidePattern::withholding(&[(0, 3)]));
//!
//! // A light client holding only the commitment samples and verifies
//! let commitment = tree.commitment();
//! let samples = tree.sample(0, &[1, 3, 40])?;
//! assert_eq!(samples.len(), 2);
//! assert!(samples.iter().all(|sample| commitment.verify(sample)));
//! # Ok(())
//! # }
//! ```

pub mod cmt;

// Re-export commonly used types for convenience
pub use cmt::{
    verify_proof, CmtError, CmtParams, CmtResult, CodedMerkleTree, Commitment, Digest,
    HashKind, HidePattern, Proof, Sample, Symbol,
};
