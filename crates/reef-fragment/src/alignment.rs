//! Payload alignment requirements of the coding backends.
//!
//! The coding math divides a payload across `k` fragments and processes
//! each fragment in whole words, so payloads must be padded up front to a
//! backend-dependent granularity. This module computes that granularity;
//! it knows nothing about any specific buffer.

use reef_types::{BackendId, CodingParams};

/// Machine words per packet in the Cauchy backends.
const CAUCHY_PACKET_WORDS: usize = 128;

/// Smallest payload length `>= data_len` that divides evenly across `k`
/// fragments and whole code words.
///
/// Cauchy Reed-Solomon processes data in packetized blocks whose size
/// depends on the machine word width, so its granule is
/// `k * w * (word_bytes * 128)`. Every other backend (Vandermonde
/// Reed-Solomon, flat-XOR) only needs `k * (w / 8)`.
///
/// Zero-length input stays zero. Parameters must satisfy
/// [`CodingParams::validate`]; the calculator itself stays pure.
pub fn aligned_data_size(params: &CodingParams, data_len: usize) -> usize {
    debug_assert!(params.validate().is_ok(), "unvalidated coding parameters");

    let k = params.k as usize;
    let granule = match params.backend {
        BackendId::RsCauchy => k * params.w as usize * (size_of::<usize>() * CAUCHY_PACKET_WORDS),
        BackendId::RsVandermonde | BackendId::FlatXor => k * params.word_size(),
    };

    data_len.div_ceil(granule) * granule
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(backend: BackendId, k: u8, w: u8) -> CodingParams {
        CodingParams::new(backend, k, 4, w).unwrap()
    }

    #[test]
    fn test_rounds_up_to_next_multiple() {
        // k=10, w=8 -> word_size 1, granule 10; 77 rounds to 80.
        let p = params(BackendId::RsVandermonde, 10, 8);
        assert_eq!(aligned_data_size(&p, 77), 80);
    }

    #[test]
    fn test_already_aligned_is_unchanged() {
        let p = params(BackendId::RsVandermonde, 10, 8);
        assert_eq!(aligned_data_size(&p, 80), 80);
    }

    #[test]
    fn test_zero_length_rounds_to_zero() {
        for backend in [BackendId::RsVandermonde, BackendId::RsCauchy, BackendId::FlatXor] {
            let p = params(backend, 4, 8);
            assert_eq!(aligned_data_size(&p, 0), 0);
        }
    }

    #[test]
    fn test_wider_words_coarsen_the_granule() {
        // k=4, w=32 -> word_size 4, granule 16.
        let p = params(BackendId::FlatXor, 4, 32);
        assert_eq!(aligned_data_size(&p, 1), 16);
        assert_eq!(aligned_data_size(&p, 17), 32);
    }

    #[test]
    fn test_cauchy_granule() {
        // k=4, w=8: granule = 4 * 8 * (word_bytes * 128).
        let p = params(BackendId::RsCauchy, 4, 8);
        let granule = 4 * 8 * (size_of::<usize>() * 128);
        assert_eq!(aligned_data_size(&p, 1), granule);
        assert_eq!(aligned_data_size(&p, granule - 1), granule);
        assert_eq!(aligned_data_size(&p, granule), granule);
        assert_eq!(aligned_data_size(&p, granule + 1), 2 * granule);
    }

    #[test]
    fn test_cauchy_is_coarser_than_vandermonde() {
        let cauchy = params(BackendId::RsCauchy, 4, 8);
        let vand = params(BackendId::RsVandermonde, 4, 8);
        assert!(aligned_data_size(&cauchy, 1) > aligned_data_size(&vand, 1));
    }
}
