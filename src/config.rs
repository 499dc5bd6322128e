//! Builder configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a blockwise suffix-array build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Upper bound on emitted block length (normalised to at least 2).
    /// One slot of every block is taken by the sample suffix that seals it,
    /// so at most `bucket_size - 1` ordinary suffixes accumulate per block.
    pub bucket_size: u32,
    /// Difference-cover period; 0 disables the cover entirely.
    /// Anything else must be greater than 3, or the build is rejected
    /// with a configuration error.
    pub dc_period: u32,
    /// Seed for the pseudorandom sample selection
    pub seed: u64,
    /// Cross-check internal invariants while building (slow; testing only)
    pub sanity_check: bool,
    /// Emit phase and progress messages through the `log` facade
    pub verbose: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            bucket_size: 4 * 1024 * 1024,
            dc_period: 1024,
            seed: 0,
            sanity_check: false,
            verbose: false,
        }
    }
}
