//! Blockwise suffix-array construction.
//!
//! - [`blockwise`] - sample selection, block accumulation and the streaming
//!   iterator surface
//! - `compare` - the amortised suffix-versus-sample comparison
//! - `lcp` - longest-common-prefix probes and the tie-breaking comparison
//! - `search` - binary bucket search against the sorted samples
//! - `zbox` - Z-array computation anchored at a sample

pub mod blockwise;
pub(crate) mod compare;
pub(crate) mod lcp;
pub(crate) mod search;
pub(crate) mod zbox;

pub use blockwise::BlockwiseSa;
