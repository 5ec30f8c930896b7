//! Fragment buffer and header core of the Reef erasure-coding engine.
//!
//! This crate provides:
//! - [`FragmentBuffer`] — an owned, 16-byte-aligned allocation holding a
//!   fixed [`FragmentHeader`] followed by the payload, with sentinel-gated
//!   field access and a checked teardown.
//! - [`FragmentView`] — strict or trusted read-only views over fragment
//!   bytes received from elsewhere.
//! - [`map_payloads`] — bulk payload resolution over an ordered stripe.
//! - [`aligned_data_size`] — the padded payload length a backend requires.
//! - [`AlignedBuf`] — the underlying zeroed, 16-byte-aligned allocator.
//!
//! The coding math, backend dispatch and the top-level encode/decode API
//! live elsewhere; this crate only defines the binary fragment contract
//! those layers agree on, and defends it with the header's magic sentinel.

mod alignment;
mod alloc;
mod buffer;
mod error;
mod header;

pub use alignment::aligned_data_size;
pub use alloc::{AlignedBuf, BUFFER_ALIGNMENT};
pub use buffer::{FragmentBuffer, FragmentView, destroy_fragment, map_payloads};
pub use error::FragmentError;
pub use header::{FRAGMENT_MAGIC, FragmentHeader};
