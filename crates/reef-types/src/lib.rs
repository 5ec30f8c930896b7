//! Shared types for the Reef erasure-coding engine.
//!
//! This crate defines the types exchanged between the fragment subsystem
//! and the coding backends: the backend identifier ([`BackendId`]), the
//! per-stripe coding parameters ([`CodingParams`]), and the decoded header
//! snapshot ([`FragmentMetadata`]).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Backend identification
// ---------------------------------------------------------------------------

/// The erasure-coding algorithm selected for a stripe.
///
/// The fragment subsystem never runs the coding math itself; it only needs
/// the identifier to compute payload alignment, because the Cauchy variant
/// processes data in packetized blocks with a much coarser granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendId {
    /// Vandermonde-matrix Reed-Solomon.
    RsVandermonde,
    /// Cauchy-matrix Reed-Solomon.
    RsCauchy,
    /// Flat-XOR parity codes.
    FlatXor,
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendId::RsVandermonde => "rs-vandermonde",
            BackendId::RsCauchy => "rs-cauchy",
            BackendId::FlatXor => "flat-xor",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Coding parameters
// ---------------------------------------------------------------------------

/// Coding parameters for one stripe.
///
/// A stripe is split into `k` data fragments plus `m` parity fragments,
/// and the backend operates on words of `w` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingParams {
    /// Which coding backend the stripe uses.
    pub backend: BackendId,
    /// Number of data fragments.
    pub k: u8,
    /// Number of parity fragments.
    pub m: u8,
    /// Word width of the coding algorithm, in bits.
    pub w: u8,
}

impl Default for CodingParams {
    fn default() -> Self {
        Self {
            backend: BackendId::RsVandermonde,
            k: 4,
            m: 2,
            w: 8,
        }
    }
}

impl CodingParams {
    /// Create parameters, rejecting values no backend can operate on.
    pub fn new(backend: BackendId, k: u8, m: u8, w: u8) -> Result<Self, ParamsError> {
        let params = Self { backend, k, m, w };
        params.validate()?;
        Ok(params)
    }

    /// Check that the parameters are usable: at least one data fragment,
    /// and a word width of 8, 16 or 32 bits.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.k == 0 {
            return Err(ParamsError::InvalidK);
        }
        if !matches!(self.w, 8 | 16 | 32) {
            return Err(ParamsError::InvalidWordWidth { w: self.w });
        }
        Ok(())
    }

    /// Total fragments per stripe (`k + m`).
    pub fn total_fragments(&self) -> usize {
        self.k as usize + self.m as usize
    }

    /// Word size of the coding algorithm in bytes (`w / 8`).
    pub fn word_size(&self) -> usize {
        self.w as usize / 8
    }
}

/// Errors for coding parameters no backend can operate on.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// `k` must be at least 1.
    #[error("at least one data fragment is required (k >= 1)")]
    InvalidK,

    /// The word width is not one the backends support.
    #[error("unsupported word width {w}, expected 8, 16 or 32")]
    InvalidWordWidth {
        /// The rejected width in bits.
        w: u8,
    },
}

// ---------------------------------------------------------------------------
// Fragment metadata
// ---------------------------------------------------------------------------

/// Snapshot of the fields stored in a fragment header.
///
/// Produced by the fragment subsystem when a caller wants all header fields
/// at once (e.g. to decide which fragments of a stripe to feed the decoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentMetadata {
    /// Position of this fragment among the `k + m` fragments of its stripe.
    pub idx: u32,
    /// Payload length in bytes, excluding the header.
    pub payload_size: u32,
    /// Length of the original, pre-split, pre-padding data.
    pub orig_data_size: u64,
    /// Integrity checksum over the payload, as set by the producer.
    pub checksum: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
