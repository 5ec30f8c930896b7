//! 16-byte-aligned, fallible buffer allocation.
//!
//! Coding backends run word-parallel (128-bit) operations over fragment
//! payloads, so every buffer handed to them must start on a 16-byte
//! boundary. Backing storage is a `Vec` of `u128` words exposed as bytes
//! through `zerocopy`, which gives the alignment guarantee without any
//! `unsafe`.

use zerocopy::IntoBytes;

use crate::error::FragmentError;

/// Start-address alignment of every [`AlignedBuf`], in bytes.
pub const BUFFER_ALIGNMENT: usize = 16;

/// An owned heap buffer whose start address is a multiple of 16 bytes.
///
/// Dropping the buffer releases the allocation; ownership replaces the
/// free-then-null convention of pointer-based APIs, so there is no
/// double-free to defend against.
#[derive(Debug)]
pub struct AlignedBuf {
    words: Vec<u128>,
    len: usize,
}

impl AlignedBuf {
    /// Allocate a zero-filled buffer of `len` bytes.
    ///
    /// Zeroing is mandatory: stale memory must never leak into coded
    /// output. Fails with [`FragmentError::AllocFailed`] if the system
    /// refuses the allocation; never aborts.
    pub fn zeroed(len: usize) -> Result<Self, FragmentError> {
        Self::filled(len, 0)
    }

    /// Allocate a buffer of `len` bytes with every byte set to `value`.
    pub fn filled(len: usize, value: u8) -> Result<Self, FragmentError> {
        let word_count = len.div_ceil(size_of::<u128>());
        let mut words: Vec<u128> = Vec::new();
        words
            .try_reserve_exact(word_count)
            .map_err(|_| FragmentError::AllocFailed { size: len })?;
        words.resize(word_count, u128::from_ne_bytes([value; 16]));
        Ok(Self { words, len })
    }

    /// Length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds zero bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.words.as_slice().as_bytes()[..self.len]
    }

    /// The buffer contents, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.words.as_mut_slice().as_mut_bytes()[..self.len]
    }
}
