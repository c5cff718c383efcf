//! Coded Merkle Tree
//!
//! Implementation of the coded Merkle tree from "Coded Merkle Tree: Solving
//! Data Availability Attacks in Blockchains" by Yu et al.
//!
//! Every level of the tree is the erasure-coded form of the digests of the
//! level below:
//! - Level 0: the padded data split into symbols and erasure coded
//! - Level i+1: digests of level i aggregated `C` at a time, erasure coded
//! - Roots: digests of the symbols of the last level
//!
//! A light client holding only the [`Commitment`] can check any sampled
//! symbol with its proof.

pub mod aggregate;
pub mod availability;
pub mod codec;
pub mod commitment;
pub mod errors;
pub mod hash;
pub mod index;
pub mod params;
pub mod proof;
pub mod sample;
pub mod tree;


// Re-export core types for convenience
pub use aggregate::{hash_and_aggregate, partition};
pub use availability::HidePattern;
pub use codec::{pad, split, ErasureEncoder, PaddedData, ReedSolomonEncoder, Symbol};
pub use commitment::Commitment;
pub use errors::{CmtError, CmtResult};
pub use hash::{digest, Digest, HashKind, HASH_SIZE};
pub use index::{next_index, SymbolPosition};
pub use params::CmtParams;
pub use proof::{check_proof, verify_proof, MismatchReason, Proof, ProofMismatch};
pub use sample::Sample;
pub use tree::CodedMerkleTree;
