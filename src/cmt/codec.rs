//! Symbol codec: padding, splitting and erasure encoding of a level.

use super::errors::{CmtError, CmtResult};
use super::params::CmtParams;
use rayon::prelude::*;
use reed_solomon_erasure::galois_16::ReedSolomon;

/// An opaque, fixed-length block of a tree level.
pub type Symbol = Vec<u8>;

/// GF(2^16) elements are two bytes wide.
const ELEMENT_SIZE: usize = 2;

/// Default number of systematic symbols per coding block.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// A symbol-aligned buffer together with the length of the data it carries.
///
/// The fill is all zeros; `data_len` is what makes the padding strippable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedData {
    pub buffer: Vec<u8>,
    pub data_len: usize,
}

impl PaddedData {
    pub fn unpad(&self) -> &[u8] {
        &self.buffer[..self.data_len]
    }
}

/// Zero-fills `data` up to the next multiple of `symbol_size`.
pub fn pad(data: &[u8], symbol_size: usize) -> CmtResult<PaddedData> {
    if symbol_size == 0 {
        return Err(CmtError::invalid_parameters("symbol size must be > 0"));
    }
    let padded_len = data.len().div_ceil(symbol_size) * symbol_size;
    let mut buffer = Vec::with_capacity(padded_len);
    buffer.extend_from_slice(data);
    buffer.resize(padded_len, 0);
    Ok(PaddedData {
        buffer,
        data_len: data.len(),
    })
}

/// Splits a symbol-aligned buffer into symbols, preserving order.
pub fn split(buffer: &[u8], symbol_size: usize) -> CmtResult<Vec<Symbol>> {
    if symbol_size == 0 || buffer.len() % symbol_size != 0 {
        return Err(CmtError::codec(
            "split",
            &format!(
                "buffer of {} bytes is not aligned to {symbol_size}-byte symbols",
                buffer.len()
            ),
        ));
    }
    Ok(buffer.chunks_exact(symbol_size).map(<[u8]>::to_vec).collect())
}

/// Systematic erasure code applied to every tree level.
///
/// `encode` receives the `K` systematic symbols of a level and returns the
/// whole level: the input unchanged followed by `params.coded_len(K) - K`
/// parity symbols of the same length. It must be deterministic.
pub trait ErasureEncoder: Sync {
    fn encode(&self, symbols: &[Symbol], params: &CmtParams) -> CmtResult<Vec<Symbol>>;
}

/// Reed-Solomon over GF(2^16), applied block by block.
///
/// A level is cut into blocks of `block_size` systematic symbols, rounded up
/// to a multiple of `RF`, and each block gets its own parity on its own rayon
/// task. The encoded level is the systematic symbols followed by the parity
/// of block 0, then block 1, and so on. Every block shares one small code, so
/// a level costs time linear in its length and is not bounded by the 65,536
/// elements of the field.
#[derive(Debug, Clone)]
pub struct ReedSolomonEncoder {
    block_size: usize,
}

impl Default for ReedSolomonEncoder {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ReedSolomonEncoder {
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    /// Systematic symbols per block under `params`.
    pub fn block_size_for(&self, params: &CmtParams) -> usize {
        let rf = params.reduction_factor().max(1);
        self.block_size.div_ceil(rf) * rf
    }

    fn encode_block(
        rs: &ReedSolomon,
        block: &[Symbol],
        parity: usize,
        symbol_len: usize,
    ) -> CmtResult<Vec<Symbol>> {
        let mut shards: Vec<Vec<[u8; 2]>> = block.iter().map(|symbol| to_elements(symbol)).collect();
        shards.extend(std::iter::repeat(vec![[0u8; 2]; symbol_len / ELEMENT_SIZE]).take(parity));
        rs.encode(&mut shards)?;
        Ok(shards
            .into_iter()
            .skip(block.len())
            .map(|shard| from_elements(&shard))
            .collect())
    }
}

impl ErasureEncoder for ReedSolomonEncoder {
    fn encode(&self, symbols: &[Symbol], params: &CmtParams) -> CmtResult<Vec<Symbol>> {
        let k = symbols.len();
        let symbol_len = match symbols.first() {
            Some(first) => first.len(),
            None => return Err(CmtError::codec("encode", "no systematic symbols")),
        };
        if symbols.iter().any(|symbol| symbol.len() != symbol_len) {
            return Err(CmtError::codec("encode", "symbols differ in length"));
        }
        if symbol_len == 0 || symbol_len % ELEMENT_SIZE != 0 {
            return Err(CmtError::codec(
                "encode",
                &format!("symbol length {symbol_len} is not a positive multiple of {ELEMENT_SIZE}"),
            ));
        }

        if params.coded_len(k) == k {
            return Ok(symbols.to_vec());
        }

        // full blocks are a multiple of RF, so their parity counts add up to
        // exactly coded_len(k) - k
        let block_size = self.block_size_for(params);
        let full_code = if k >= block_size {
            Some(ReedSolomon::new(block_size, params.coded_len(block_size) - block_size)?)
        } else {
            None
        };

        let parity: Vec<Vec<Symbol>> = symbols
            .par_chunks(block_size)
            .map(|block| {
                let block_parity = params.coded_len(block.len()) - block.len();
                match &full_code {
                    Some(rs) if block.len() == block_size => {
                        Self::encode_block(rs, block, block_parity, symbol_len)
                    }
                    _ => {
                        let rs = ReedSolomon::new(block.len(), block_parity)?;
                        Self::encode_block(&rs, block, block_parity, symbol_len)
                    }
                }
            })
            .collect::<CmtResult<_>>()?;

        let mut level = Vec::with_capacity(params.coded_len(k));
        level.extend_from_slice(symbols);
        level.extend(parity.into_iter().flatten());
        Ok(level)
    }
}

fn to_elements(bytes: &[u8]) -> Vec<[u8; 2]> {
    bytes
        .chunks_exact(ELEMENT_SIZE)
        .map(|pair| [pair[0], pair[1]])
        .collect()
}

fn from_elements(elements: &[[u8; 2]]) -> Vec<u8> {
    elements.iter().flatten().copied().collect()
}
