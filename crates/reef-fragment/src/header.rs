//! The fixed-layout fragment header.
//!
//! Every fragment buffer begins with a 32-byte header that producers and
//! consumers of a stripe must agree on byte-for-byte. All multi-byte
//! integers are little-endian and stored as raw byte arrays, so the struct
//! can be cast to and from untrusted bytes with `zerocopy`: every bit
//! pattern is valid and there are no alignment requirements.
//!
//! Wire layout (offsets from fragment start):
//!
//! | offset | field            | width    |
//! |--------|------------------|----------|
//! | 0      | magic            | u32      |
//! | 4      | idx              | u32      |
//! | 8      | size             | u32      |
//! | 12     | orig_data_size   | u64      |
//! | 20     | chksum           | u32      |
//! | 24     | reserved         | 8 bytes  |
//!
//! The header size is a multiple of 16, so the payload of a 16-byte-aligned
//! allocation starts 16-byte aligned as well.

use tracing::warn;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use reef_types::FragmentMetadata;

use crate::error::FragmentError;

/// Magic sentinel stamped into every valid fragment header.
///
/// The sentinel is the sole runtime marker distinguishing a fragment
/// buffer from arbitrary memory; no header field may be trusted unless it
/// matches. On the wire the four bytes read `REEF`.
pub const FRAGMENT_MAGIC: u32 = u32::from_le_bytes(*b"REEF");

/// The fixed header prefixing every fragment buffer.
///
/// Fields are private; they are read and written through the gated
/// accessors on [`FragmentBuffer`](crate::FragmentBuffer) and
/// [`FragmentView`](crate::FragmentView), which revalidate the sentinel.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct FragmentHeader {
    magic: [u8; 4],
    idx: [u8; 4],
    size: [u8; 4],
    orig_data_size: [u8; 8],
    chksum: [u8; 4],
    reserved: [u8; 8],
}

const _: () = assert!(size_of::<FragmentHeader>() == FragmentHeader::SIZE);
const _: () = assert!(FragmentHeader::SIZE % 16 == 0);

impl FragmentHeader {
    /// Size of the serialized header in bytes.
    pub const SIZE: usize = 32;

    /// Whether the magic sentinel matches [`FRAGMENT_MAGIC`].
    pub fn is_valid(&self) -> bool {
        u32::from_le_bytes(self.magic) == FRAGMENT_MAGIC
    }

    pub(crate) fn stamp(&mut self) {
        self.magic = FRAGMENT_MAGIC.to_le_bytes();
    }

    /// Position of this fragment among the `k + m` fragments of its stripe.
    pub fn idx(&self) -> u32 {
        u32::from_le_bytes(self.idx)
    }

    pub(crate) fn set_idx(&mut self, idx: u32) {
        self.idx = idx.to_le_bytes();
    }

    /// Payload length in bytes, excluding the header.
    pub fn payload_size(&self) -> u32 {
        u32::from_le_bytes(self.size)
    }

    pub(crate) fn set_payload_size(&mut self, size: u32) {
        self.size = size.to_le_bytes();
    }

    /// Length of the original, pre-split, pre-padding data.
    pub fn orig_data_size(&self) -> u64 {
        u64::from_le_bytes(self.orig_data_size)
    }

    pub(crate) fn set_orig_data_size(&mut self, size: u64) {
        self.orig_data_size = size.to_le_bytes();
    }

    /// Integrity checksum over the payload, as set by the producer.
    pub fn checksum(&self) -> u32 {
        u32::from_le_bytes(self.chksum)
    }

    pub(crate) fn set_checksum(&mut self, chksum: u32) {
        self.chksum = chksum.to_le_bytes();
    }

    /// Total on-wire footprint: header plus the payload length the header
    /// declares.
    pub fn total_size(&self) -> usize {
        Self::SIZE + self.payload_size() as usize
    }

    /// Snapshot of all header fields.
    pub fn metadata(&self) -> FragmentMetadata {
        FragmentMetadata {
            idx: self.idx(),
            payload_size: self.payload_size(),
            orig_data_size: self.orig_data_size(),
            checksum: self.checksum(),
        }
    }
}

/// Cast the header prefix of `bytes` without checking the sentinel.
///
/// This is the trusted path used where validation has already happened or
/// where the header is not fully formed yet; it only fails if the buffer
/// cannot hold a header at all.
pub(crate) fn prefix(bytes: &[u8]) -> Result<&FragmentHeader, FragmentError> {
    FragmentHeader::ref_from_prefix(bytes)
        .map(|(header, _)| header)
        .map_err(|_| FragmentError::Truncated {
            expected: FragmentHeader::SIZE,
            actual: bytes.len(),
        })
}

/// Mutable variant of [`prefix`].
pub(crate) fn prefix_mut(bytes: &mut [u8]) -> Result<&mut FragmentHeader, FragmentError> {
    let actual = bytes.len();
    FragmentHeader::mut_from_prefix(bytes)
        .map(|(header, _)| header)
        .map_err(|_| FragmentError::Truncated {
            expected: FragmentHeader::SIZE,
            actual,
        })
}

/// Cast the header prefix of `bytes` and require a matching sentinel.
///
/// Every mismatch is logged with the operation that detected it before the
/// error is returned; no field is read through a header that fails here.
pub(crate) fn validated<'a>(
    bytes: &'a [u8],
    op: &'static str,
) -> Result<&'a FragmentHeader, FragmentError> {
    let header = prefix(bytes)?;
    if !header.is_valid() {
        warn!(op, "invalid fragment header");
        return Err(FragmentError::InvalidHeader { op });
    }
    Ok(header)
}

/// Mutable variant of [`validated`]. Nothing is written through a header
/// that fails the sentinel check.
pub(crate) fn validated_mut<'a>(
    bytes: &'a mut [u8],
    op: &'static str,
) -> Result<&'a mut FragmentHeader, FragmentError> {
    let header = prefix_mut(bytes)?;
    if !header.is_valid() {
        warn!(op, "invalid fragment header");
        return Err(FragmentError::InvalidHeader { op });
    }
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamped() -> [u8; FragmentHeader::SIZE] {
        let mut bytes = [0u8; FragmentHeader::SIZE];
        bytes[..4].copy_from_slice(&FRAGMENT_MAGIC.to_le_bytes());
        bytes
    }

    #[test]
    fn test_magic_reads_reef_on_the_wire() {
        assert_eq!(&FRAGMENT_MAGIC.to_le_bytes(), b"REEF");
    }

    #[test]
    fn test_field_offsets_match_wire_contract() {
        let mut bytes = stamped();
        let header = prefix_mut(&mut bytes).unwrap();
        header.set_idx(0x0102_0304);
        header.set_payload_size(0x0506_0708);
        header.set_orig_data_size(0x090A_0B0C_0D0E_0F10);
        header.set_checksum(0x1112_1314);

        assert_eq!(&bytes[0..4], b"REEF");
        assert_eq!(bytes[4..8], 0x0102_0304u32.to_le_bytes());
        assert_eq!(bytes[8..12], 0x0506_0708u32.to_le_bytes());
        assert_eq!(bytes[12..20], 0x090A_0B0C_0D0E_0F10u64.to_le_bytes());
        assert_eq!(bytes[20..24], 0x1112_1314u32.to_le_bytes());
        assert_eq!(bytes[24..32], [0u8; 8]);
    }

    #[test]
    fn test_validated_accepts_stamped_header() {
        let bytes = stamped();
        assert!(validated(&bytes, "test").is_ok());
    }

    #[test]
    fn test_validated_rejects_wrong_magic() {
        let mut bytes = stamped();
        bytes[0] ^= 0xFF;
        let err = validated(&bytes, "test").unwrap_err();
        assert!(matches!(err, FragmentError::InvalidHeader { op: "test" }));
    }

    #[test]
    fn test_validated_rejects_short_buffer() {
        let err = validated(&[0u8; 16], "test").unwrap_err();
        assert!(matches!(
            err,
            FragmentError::Truncated {
                expected: FragmentHeader::SIZE,
                actual: 16,
            }
        ));
    }

    #[test]
    fn test_prefix_skips_magic_check() {
        // All-zero header: wrong magic, but the trusted cast still works.
        let bytes = [0u8; FragmentHeader::SIZE];
        let header = prefix(&bytes).unwrap();
        assert!(!header.is_valid());
        assert_eq!(header.total_size(), FragmentHeader::SIZE);
    }

    #[test]
    fn test_total_size_adds_header() {
        let mut bytes = stamped();
        prefix_mut(&mut bytes).unwrap().set_payload_size(4096);
        let header = prefix(&bytes).unwrap();
        assert_eq!(header.total_size(), 4096 + FragmentHeader::SIZE);
    }

    #[test]
    fn test_metadata_snapshot() {
        let mut bytes = stamped();
        let header = prefix_mut(&mut bytes).unwrap();
        header.set_idx(7);
        header.set_payload_size(512);
        header.set_orig_data_size(5000);
        header.set_checksum(0xCAFE);
        let meta = header.metadata();
        assert_eq!(meta.idx, 7);
        assert_eq!(meta.payload_size, 512);
        assert_eq!(meta.orig_data_size, 5000);
        assert_eq!(meta.checksum, 0xCAFE);
    }
}
