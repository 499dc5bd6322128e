//! # blocksa - Blockwise Suffix-Array Construction
//!
//! blocksa builds the suffix array of a genome-scale text without ever
//! holding the whole array in memory: the array is emitted as contiguous,
//! lexicographically ordered blocks of bounded size, in the manner of
//! Kärkkäinen's "Fast BWT" construction. Peak memory is the set of
//! bucket-delimiting sample suffixes plus a single block.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`sa`] - The blockwise builder: sample selection, block accumulation,
//!   and the streaming iterator surface
//! - [`dc`] - Difference-cover sample: O(1) suffix tie-breaks after a
//!   bounded character match
//! - [`sort`] - Multikey quicksort of suffix positions
//! - [`text`] - Text abstraction: unpacked bytes or 2-bit packed DNA
//!
//! ## Quick Start
//!
//! ```
//! use blocksa::{BlockwiseSa, BuilderConfig, ByteText};
//!
//! let text = ByteText::new(b"gattaca");
//! let mut sa = BlockwiseSa::new(&text, BuilderConfig::default()).unwrap();
//!
//! let mut entries = Vec::new();
//! while sa.has_more_suffixes().unwrap() {
//!     entries.push(sa.next_suffix().unwrap());
//! }
//! // one entry per suffix, plus the sentinel
//! assert_eq!(entries.len(), 8);
//! ```
//!
//! ## Sentinel discipline
//!
//! No terminator symbol is stored: instead, a suffix that falls off the end
//! of the text compares *greater* than any suffix that still has characters
//! left. Every comparison in the crate applies this convention identically,
//! and the sentinel entry (position n) is the last one the stream emits.

pub mod config;
pub mod dc;
pub mod error;
pub mod sa;
pub mod sort;
pub mod text;
mod utils;

pub use config::BuilderConfig;
pub use error::{Error, Result};
pub use sa::BlockwiseSa;
pub use text::{Alphabet, ByteText, PackedDna, Text};

/// Reserved word meaning "no position here": bucket bounds, representatives
/// and the push-back slot all use it, which is why text lengths must stay
/// below it.
pub(crate) const ABSENT: u32 = u32::MAX;
