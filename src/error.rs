//! Error handling for blockwise suffix-array construction.

use thiserror::Error;

/// Errors surfaced by the blockwise builder.
///
/// `Exhausted` is the only condition a well-behaved caller sees in
/// production; the other kinds signal a rejected configuration, allocation
/// failure or, in sanity-check mode, a broken internal invariant.
#[derive(Error, Debug)]
pub enum Error {
    /// The iterator was advanced past the final suffix
    #[error("no more suffixes")]
    Exhausted,

    /// A configuration value outside the supported domain
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An internal allocation failed
    #[error("memory allocation failed: requested {bytes} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        bytes: usize,
    },

    /// A sanity-mode cross-check failed (never raised in production mode)
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Fallible exact reservation; maps allocator failure to `OutOfMemory`.
pub(crate) fn reserve_exact<E>(v: &mut Vec<E>, additional: usize) -> Result<()> {
    v.try_reserve_exact(additional).map_err(|_| Error::OutOfMemory {
        bytes: additional.saturating_mul(std::mem::size_of::<E>()),
    })
}
