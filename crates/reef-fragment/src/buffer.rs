//! Fragment buffer lifecycle and gated header access.
//!
//! A fragment is one contiguous allocation: a [`FragmentHeader`] followed
//! immediately by the payload. [`FragmentBuffer`] owns such an allocation;
//! [`FragmentView`] borrows one from foreign bytes (e.g. straight off the
//! wire). Both expose the header fields and the payload as two bounded
//! views of the same memory, never as separate allocations.

use tracing::debug;

use reef_types::FragmentMetadata;

use crate::alloc::AlignedBuf;
use crate::error::FragmentError;
use crate::header::{self, FragmentHeader};

/// An owned fragment buffer: header plus payload in one 16-byte-aligned
/// allocation.
///
/// Values are constructed only by [`allocate`](Self::allocate) (producer
/// path) or [`from_wire`](Self::from_wire) (consumer path), both of which
/// leave the magic sentinel in place. The sentinel is still revalidated on
/// every field access: the whole allocation is reachable through
/// [`as_bytes_mut`](Self::as_bytes_mut) — that is how wire bytes get in —
/// so corruption must be detected, not assumed away.
#[derive(Debug)]
pub struct FragmentBuffer {
    buf: AlignedBuf,
}

impl FragmentBuffer {
    /// Allocate a zeroed fragment buffer able to hold `payload_size`
    /// payload bytes, and stamp the magic sentinel.
    ///
    /// All other header fields are left zero; callers set them through the
    /// accessors before relying on them.
    pub fn allocate(payload_size: usize) -> Result<Self, FragmentError> {
        let total = payload_size
            .checked_add(FragmentHeader::SIZE)
            .ok_or(FragmentError::AllocFailed { size: usize::MAX })?;
        let mut buf = AlignedBuf::zeroed(total)?;
        header::prefix_mut(buf.as_mut_slice())?.stamp();
        debug!(payload_size, "allocated fragment buffer");
        Ok(Self { buf })
    }

    /// Adopt a fragment received as raw bytes.
    ///
    /// Validates the sentinel and the declared payload length, then copies
    /// the bytes into a fresh aligned allocation so the coding math can
    /// operate on them directly.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, FragmentError> {
        let declared = header::validated(bytes, "from wire")?.total_size();
        if bytes.len() < declared {
            return Err(FragmentError::Truncated {
                expected: declared,
                actual: bytes.len(),
            });
        }
        let mut buf = AlignedBuf::zeroed(bytes.len())?;
        buf.as_mut_slice().copy_from_slice(bytes);
        debug!(total_size = bytes.len(), "adopted fragment from wire bytes");
        Ok(Self { buf })
    }

    /// Tear the buffer down, revalidating the sentinel first.
    ///
    /// If the sentinel no longer matches, the allocation is **not**
    /// released — it is leaked and an error returned. Freeing through a
    /// header we no longer recognize risks tearing down memory that was
    /// never ours to free; a bounded leak is the safer failure.
    ///
    /// Plain `drop` also releases the allocation; `destroy` is the checked
    /// teardown for callers that want corruption surfaced.
    pub fn destroy(self) -> Result<(), FragmentError> {
        match header::validated(self.buf.as_slice(), "destroy") {
            Ok(_) => {
                debug!(total_size = self.buf.len(), "destroyed fragment buffer");
                Ok(())
            }
            Err(err) => {
                std::mem::forget(self);
                Err(err)
            }
        }
    }

    /// Succeeds when the magic sentinel is intact.
    ///
    /// This is the primitive every gated accessor is built on.
    pub fn validate(&self) -> Result<(), FragmentError> {
        header::validated(self.buf.as_slice(), "validate").map(|_| ())
    }

    /// Fragment index within the stripe.
    pub fn idx(&self) -> Result<u32, FragmentError> {
        header::validated(self.buf.as_slice(), "get idx").map(FragmentHeader::idx)
    }

    /// Set the fragment index within the stripe.
    pub fn set_idx(&mut self, idx: u32) -> Result<(), FragmentError> {
        header::validated_mut(self.buf.as_mut_slice(), "set idx").map(|h| h.set_idx(idx))
    }

    /// Payload length in bytes as declared by the header.
    pub fn payload_size(&self) -> Result<u32, FragmentError> {
        header::validated(self.buf.as_slice(), "get payload size")
            .map(FragmentHeader::payload_size)
    }

    /// Declare the payload length in bytes.
    pub fn set_payload_size(&mut self, size: u32) -> Result<(), FragmentError> {
        header::validated_mut(self.buf.as_mut_slice(), "set payload size")
            .map(|h| h.set_payload_size(size))
    }

    /// Length of the original, pre-split, pre-padding data.
    pub fn orig_data_size(&self) -> Result<u64, FragmentError> {
        header::validated(self.buf.as_slice(), "get orig data size")
            .map(FragmentHeader::orig_data_size)
    }

    /// Record the length of the original, pre-split data.
    pub fn set_orig_data_size(&mut self, size: u64) -> Result<(), FragmentError> {
        header::validated_mut(self.buf.as_mut_slice(), "set orig data size")
            .map(|h| h.set_orig_data_size(size))
    }

    /// Integrity checksum over the payload.
    pub fn checksum(&self) -> Result<u32, FragmentError> {
        header::validated(self.buf.as_slice(), "get chksum").map(FragmentHeader::checksum)
    }

    /// Record the payload checksum computed by the producer.
    pub fn set_checksum(&mut self, chksum: u32) -> Result<(), FragmentError> {
        header::validated_mut(self.buf.as_mut_slice(), "set chksum").map(|h| h.set_checksum(chksum))
    }

    /// Snapshot of all header fields.
    pub fn metadata(&self) -> Result<FragmentMetadata, FragmentError> {
        header::validated(self.buf.as_slice(), "get metadata").map(FragmentHeader::metadata)
    }

    /// Total on-wire footprint: header size plus the payload length the
    /// header declares.
    ///
    /// Trusted path: reads the size field without a sentinel check, for
    /// callers sizing transfers after validation has already happened.
    pub fn total_size(&self) -> Result<usize, FragmentError> {
        header::prefix(self.buf.as_slice()).map(FragmentHeader::total_size)
    }

    /// Payload capacity in bytes: the allocation minus the header.
    ///
    /// This is the space available for writing, independent of the length
    /// the header declares.
    pub fn payload_capacity(&self) -> usize {
        self.buf.len() - FragmentHeader::SIZE
    }

    /// The payload view ("data pointer"): the allocation past the header.
    ///
    /// Pure offset arithmetic; never consults the sentinel.
    pub fn payload(&self) -> &[u8] {
        &self.buf.as_slice()[FragmentHeader::SIZE..]
    }

    /// Mutable payload view for writing fragment data in place.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buf.as_mut_slice()[FragmentHeader::SIZE..]
    }

    /// The whole allocation ("fragment pointer"): header plus payload, as
    /// it goes on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }

    /// Mutable view of the whole allocation, for filling from the wire.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.buf.as_mut_slice()
    }
}

/// Tear down one slot of a stripe.
///
/// Missing fragments are represented as `None`; passing one fails with
/// [`FragmentError::InvalidArgument`] before any validation is attempted,
/// mirroring a null-pointer free in the C sense.
pub fn destroy_fragment(fragment: Option<FragmentBuffer>) -> Result<(), FragmentError> {
    match fragment {
        None => Err(FragmentError::InvalidArgument("null fragment")),
        Some(fragment) => fragment.destroy(),
    }
}

/// Resolve the payload view of every present fragment in a stripe.
///
/// Positions encode stripe index, so order and `None` entries are
/// preserved exactly; the second return value is the number of entries
/// resolved. Entries too short to contain a header resolve to `None`.
/// Like [`FragmentBuffer::payload`], this is the trusted offset path and
/// does not consult sentinels.
pub fn map_payloads<'a>(fragments: &[Option<&'a [u8]>]) -> (Vec<Option<&'a [u8]>>, usize) {
    let mut resolved = 0;
    let payloads = fragments
        .iter()
        .map(|slot| {
            slot.and_then(|frag| frag.get(FragmentHeader::SIZE..)).map(|payload| {
                resolved += 1;
                payload
            })
        })
        .collect();
    debug!(total = fragments.len(), resolved, "resolved stripe payloads");
    (payloads, resolved)
}

// ---------------------------------------------------------------------------
// Borrowed views
// ---------------------------------------------------------------------------

/// A read-only fragment view over foreign bytes.
///
/// Two constructors with distinct trust levels:
///
/// - [`parse`](Self::parse) validates the sentinel and the declared
///   payload length — the strict path for untrusted input.
/// - [`trusted`](Self::trusted) skips the sentinel check (lengths are
///   still verified so the views stay in bounds) — the hot path for
///   callers that validated earlier.
///
/// Field getters are infallible: the shared borrow freezes the bytes, so
/// a header that was present at construction cannot be corrupted while
/// the view lives.
#[derive(Debug, Clone, Copy)]
pub struct FragmentView<'a> {
    header: &'a FragmentHeader,
    payload: &'a [u8],
}

impl<'a> FragmentView<'a> {
    /// Strict constructor: sentinel and declared length validated.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FragmentError> {
        let header = header::validated(bytes, "parse view")?;
        Self::slice_payload(header, bytes)
    }

    /// Trusted constructor: skips the sentinel check.
    pub fn trusted(bytes: &'a [u8]) -> Result<Self, FragmentError> {
        let header = header::prefix(bytes)?;
        Self::slice_payload(header, bytes)
    }

    fn slice_payload(
        header: &'a FragmentHeader,
        bytes: &'a [u8],
    ) -> Result<Self, FragmentError> {
        let declared = header.total_size();
        let payload = bytes
            .get(FragmentHeader::SIZE..declared)
            .ok_or(FragmentError::Truncated {
                expected: declared,
                actual: bytes.len(),
            })?;
        Ok(Self { header, payload })
    }

    /// Whether the magic sentinel matches.
    pub fn is_valid(&self) -> bool {
        self.header.is_valid()
    }

    /// Fragment index within the stripe.
    pub fn idx(&self) -> u32 {
        self.header.idx()
    }

    /// Payload length in bytes as declared by the header.
    pub fn payload_size(&self) -> u32 {
        self.header.payload_size()
    }

    /// Length of the original, pre-split, pre-padding data.
    pub fn orig_data_size(&self) -> u64 {
        self.header.orig_data_size()
    }

    /// Integrity checksum over the payload.
    pub fn checksum(&self) -> u32 {
        self.header.checksum()
    }

    /// Total on-wire footprint of the fragment.
    pub fn total_size(&self) -> usize {
        self.header.total_size()
    }

    /// Snapshot of all header fields.
    pub fn metadata(&self) -> FragmentMetadata {
        self.header.metadata()
    }

    /// The payload bytes the header declares.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }
}
