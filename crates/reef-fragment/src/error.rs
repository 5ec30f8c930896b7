//! Error types for fragment buffer operations.

/// Errors that can occur while allocating or accessing fragment buffers.
///
/// All failures are local and recoverable: nothing in this crate aborts
/// the process, and corruption detection is advisory to the caller.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    /// The underlying memory allocation was refused.
    #[error("allocation of {size} bytes failed")]
    AllocFailed {
        /// Total bytes requested.
        size: usize,
    },

    /// The magic sentinel did not match: the buffer is corrupted, was
    /// never a fragment buffer, or was already torn down.
    #[error("invalid fragment header ({op})")]
    InvalidHeader {
        /// The operation that detected the mismatch.
        op: &'static str,
    },

    /// A required argument was absent.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The byte buffer is too short for the header, or for the payload
    /// length its header declares.
    #[error("fragment truncated: need {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },
}
