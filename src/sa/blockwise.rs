//! Blockwise suffix-array construction.
//!
//! Builds the suffix array of a text in lexicographically ordered blocks of
//! bounded size, after the scheme in Kärkkäinen's "Fast BWT" paper. A
//! random set of sample suffixes is refined by split/merge passes until
//! every bucket they delimit fits the block bound; each block is then
//! recovered by sweeping the whole text with an amortised comparison
//! against its two bounding samples and multikey-sorting the survivors.
//! The array is never materialised whole: peak memory is the sample set
//! plus one block.
//!
//! Suffixes that fall off the end of the text compare greater than any
//! continuation, so the sentinel entry (position n) is the last one the
//! stream emits.

use crate::config::BuilderConfig;
use crate::dc::DifferenceCoverSample;
use crate::error::{reserve_exact, Error, Result};
use crate::sa::compare::{suffix_cmp, CmpState};
use crate::sa::lcp::suffix_less;
use crate::sa::search::binary_sa_search;
use crate::sa::zbox::calc_z;
use crate::sort::sort_suffixes;
use crate::text::Text;
use crate::utils::timer::Timer;
use crate::ABSENT;
use ahash::AHashSet;
use log::info;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Split/merge passes before sample selection restarts from fresh randoms.
const SIZING_PASSES: u32 = 20;

/// Streaming blockwise suffix-array builder.
///
/// Construction selects the bucket-delimiting samples eagerly; the suffix
/// stream is then drawn with [`next_suffix`](Self::next_suffix) /
/// [`has_more_suffixes`](Self::has_more_suffixes), one block computed at a
/// time. A full traversal yields every position in `0..=n` exactly once,
/// in suffix order.
pub struct BlockwiseSa<'a, T: Text> {
    text: &'a T,
    bucket_sz: u32,
    dc_v: u32,
    sample_suffs: Vec<u32>,
    cur: u32,
    rng: StdRng,
    sanity: bool,
    verbose: bool,
    itr_bucket: Vec<u32>,
    itr_bucket_pos: u32,
    itr_pushed_back: u32,
    // dropped last so everything consulting the cover goes first
    dc: Option<DifferenceCoverSample>,
}

impl<'a, T: Text> BlockwiseSa<'a, T> {
    /// Build the difference cover and the bucket-delimiting samples for
    /// `text`; blocks are computed lazily afterwards.
    ///
    /// A nonzero `dc_period` of 3 or less is rejected with
    /// [`Error::Config`].
    pub fn new(text: &'a T, config: BuilderConfig) -> Result<Self> {
        let n = text.len();
        assert!(
            n < u32::MAX as usize,
            "text length must stay below 2^32 - 1"
        );
        let bucket_sz = config.bucket_size.max(2);
        let dc = if config.dc_period != 0 {
            Some(DifferenceCoverSample::build(
                text,
                config.dc_period,
                config.verbose,
                config.sanity_check,
            )?)
        } else {
            None
        };
        let mut sa = Self {
            text,
            bucket_sz,
            dc_v: config.dc_period,
            sample_suffs: Vec::new(),
            cur: 0,
            rng: StdRng::seed_from_u64(config.seed),
            sanity: config.sanity_check,
            verbose: config.verbose,
            itr_bucket: Vec::new(),
            itr_bucket_pos: ABSENT,
            itr_pushed_back: ABSENT,
            dc,
        };
        if sa.bucket_sz as usize <= n {
            sa.build_samples()?;
        } else if sa.verbose {
            info!(
                "skipping sample selection: text length {} is below the bucket size {}",
                n, sa.bucket_sz
            );
        }
        Ok(sa)
    }

    /// Length of the underlying text.
    pub fn text_len(&self) -> u32 {
        self.text.len() as u32
    }

    /// Normalised block bound.
    pub fn bucket_size(&self) -> u32 {
        self.bucket_sz
    }

    /// Difference-cover period (0 when the cover is disabled).
    pub fn dc_period(&self) -> u32 {
        self.dc_v
    }

    /// Total entries a full traversal yields: one per suffix plus the
    /// sentinel.
    pub fn suffix_count(&self) -> u32 {
        self.text_len() + 1
    }

    /// Next suffix-array entry, computing the next block when the current
    /// one is exhausted. Fails with [`Error::Exhausted`] past the end.
    pub fn next_suffix(&mut self) -> Result<u32> {
        if self.itr_pushed_back != ABSENT {
            let tmp = self.itr_pushed_back;
            self.itr_pushed_back = ABSENT;
            return Ok(tmp);
        }
        while self.itr_bucket_pos as usize >= self.itr_bucket.len() {
            if !self.has_more_blocks() {
                return Err(Error::Exhausted);
            }
            self.next_block()?;
            self.itr_bucket_pos = 0;
        }
        let pos = self.itr_bucket_pos as usize;
        self.itr_bucket_pos += 1;
        Ok(self.itr_bucket[pos])
    }

    /// Whether the next call to [`next_suffix`](Self::next_suffix) will
    /// succeed. Peeks by parking the looked-ahead entry in a one-slot
    /// push-back; only exhaustion maps to `Ok(false)`, allocation and
    /// sanity faults propagate.
    pub fn has_more_suffixes(&mut self) -> Result<bool> {
        if self.itr_pushed_back != ABSENT {
            return Ok(true);
        }
        match self.next_suffix() {
            Ok(s) => {
                debug_assert_eq!(self.itr_pushed_back, ABSENT);
                self.itr_pushed_back = s;
                Ok(true)
            }
            Err(Error::Exhausted) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Rewind the stream to the lexicographically-first suffix. The samples
    /// are kept; blocks are recomputed on demand.
    pub fn reset_iter(&mut self) {
        self.itr_bucket.clear();
        self.itr_bucket_pos = ABSENT;
        self.itr_pushed_back = ABSENT;
        self.cur = 0;
        debug_assert!(self.iter_is_reset());
    }

    /// Whether the next [`next_suffix`](Self::next_suffix) call returns the
    /// lexicographically-first suffix.
    pub fn iter_is_reset(&self) -> bool {
        self.itr_bucket.is_empty()
            && self.itr_bucket_pos == ABSENT
            && self.itr_pushed_back == ABSENT
            && self.cur == 0
    }

    fn has_more_blocks(&self) -> bool {
        self.cur as usize <= self.sample_suffs.len()
    }

    /// Select bucket-delimiting sample suffixes so that no bucket holds
    /// more than `bucket_size - 1` suffixes (the spare slot takes the
    /// sample sealing the block). Random seeds are refined by split/merge
    /// passes; if those fail to converge the selection restarts from fresh
    /// randoms, which terminates with probability 1.
    fn build_samples(&mut self) -> Result<()> {
        let n = self.text.len() as u32;
        let bsz = self.bucket_sz - 1;
        loop {
            self.seed_samples(n, bsz)?;
            self.sort_samples();
            if self.size_and_refine(n, bsz)? {
                if self.verbose {
                    let m = self.sample_suffs.len();
                    info!(
                        "selected {} samples; average bucket size {:.1} (target {})",
                        m,
                        (n as usize - m) as f64 / (m + 1) as f64,
                        bsz
                    );
                }
                return Ok(());
            }
            if self.verbose {
                info!(
                    "bucket sizing did not converge within {} passes; reseeding",
                    SIZING_PASSES
                );
            }
        }
    }

    /// Draw random sample positions, oversampling well past the expected
    /// final count to keep monster buckets unlikely, then drop duplicate
    /// positions. Duplicates would make the multikey sort compare a suffix
    /// against itself for its entire length.
    fn seed_samples(&mut self, n: u32, bsz: u32) -> Result<()> {
        let want = ((n / bsz) + 1) << 1;
        if self.verbose {
            info!("generating {} random sample suffixes", want);
        }
        self.sample_suffs.clear();
        reserve_exact(&mut self.sample_suffs, want as usize)?;
        for _ in 0..want {
            let p = self.rng.next_u32() % n;
            self.sample_suffs.push(p);
        }
        self.sample_suffs.sort_unstable();
        self.sample_suffs.dedup();
        Ok(())
    }

    fn sort_samples(&mut self) {
        let t = self.text;
        let verbose = self.verbose;
        if verbose {
            info!(
                "multikey-sorting {} samples{}",
                self.sample_suffs.len(),
                if self.dc.is_some() {
                    " (with difference cover)"
                } else {
                    ""
                }
            );
        }
        let _t = Timer::new("sample multikey sort", verbose);
        sort_suffixes(t, &mut self.sample_suffs, t.alphabet(), self.dc.as_ref());
    }

    /// Alternate sizing scans with split/merge passes until every bucket
    /// fits, or give up after [`SIZING_PASSES`] rounds. `Ok(true)` means
    /// converged.
    fn size_and_refine(&mut self, n: u32, bsz: u32) -> Result<bool> {
        let t = self.text;
        let sanity = self.sanity;
        for _pass in 0..SIZING_PASSES {
            let (mut szs, mut reps) = self.size_buckets(n)?;
            let mut added = 0usize;
            let mut merged = 0usize;
            {
                let _t = Timer::new("split/merge pass", self.verbose);
                let samples = &mut self.sample_suffs;
                let mut num_buckets = szs.len();
                let mut i = 0usize;
                while i < num_buckets {
                    debug_assert!(szs[i] == 0 || reps[i] != ABSENT);
                    let merged_sz = if i < num_buckets - 1 {
                        szs[i] + szs[i + 1] + 1
                    } else {
                        bsz + 1
                    };
                    if merged_sz <= bsz {
                        // Fold bucket i into i+1; the sample that sat
                        // between them joins the merged bucket and becomes
                        // its representative.
                        szs[i + 1] += szs[i] + 1;
                        reps[i + 1] = samples[i + added];
                        samples.remove(i + added);
                        szs.remove(i);
                        reps.remove(i);
                        num_buckets -= 1;
                        merged += 1;
                        debug_assert_eq!(num_buckets, samples.len() + 1 - added);
                        // re-examine the merged bucket at the same index
                        continue;
                    }
                    if szs[i] > bsz {
                        // Split around the representative captured during
                        // the sizing scan. It counted into this bucket, so
                        // inserting it at the bucket's ordinal keeps the
                        // samples sorted.
                        let at = i + added;
                        samples.insert(at, reps[i]);
                        if sanity {
                            if at > 0 && !suffix_less(t, samples[at - 1], samples[at]) {
                                return Err(Error::InvariantViolation(format!(
                                    "split sample {} is not above its left neighbour",
                                    samples[at]
                                )));
                            }
                            if at + 1 < samples.len()
                                && !suffix_less(t, samples[at], samples[at + 1])
                            {
                                return Err(Error::InvariantViolation(format!(
                                    "split sample {} is not below its right neighbour",
                                    samples[at]
                                )));
                            }
                        }
                        added += 1;
                    }
                    i += 1;
                }
            }
            if sanity {
                let mut seen = AHashSet::with_capacity(self.sample_suffs.len());
                for &s in &self.sample_suffs {
                    if !seen.insert(s) {
                        return Err(Error::InvariantViolation(format!(
                            "duplicate sample suffix {}",
                            s
                        )));
                    }
                }
            }
            if added == 0 {
                return Ok(true);
            }
            if self.verbose {
                info!("split {}, merged {}; iterating", added, merged);
            }
        }
        Ok(false)
    }

    /// Walk every suffix and binary-search it into its bucket, counting
    /// sizes and keeping one random representative per bucket for later
    /// splits. Progress is reported in tenths; this is the slowest part of
    /// sample selection.
    fn size_buckets(&mut self, n: u32) -> Result<(Vec<u32>, Vec<u32>)> {
        let t = self.text;
        let verbose = self.verbose;
        let num_buckets = self.sample_suffs.len() + 1;
        let mut szs = vec![0u32; num_buckets];
        let mut reps = vec![ABSENT; num_buckets];
        if verbose {
            info!(
                "binary-sorting {} suffixes into {} buckets",
                n, num_buckets
            );
        }
        let _t = Timer::new("bucket sizing scan", verbose);
        let step = (n + 9) / 10;
        for i in 0..n {
            if verbose && step > 0 && i > 0 && i % step == 0 {
                info!("  {}%", i / step * 10);
            }
            let r = match binary_sa_search(t, i, &self.sample_suffs) {
                Some(r) => r as usize,
                // the suffix is one of the samples themselves
                None => continue,
            };
            debug_assert!(r < num_buckets);
            szs[r] += 1;
            if reps[r] == ABSENT || self.rng.next_u32() & 1 == 0 {
                reps[r] = i;
            }
        }
        if verbose {
            info!("  100%");
        }
        Ok((szs, reps))
    }

    /// Compute block `cur` into the iterator bucket and advance the cursor.
    ///
    /// The block holds every suffix strictly between the bounding samples,
    /// sorted, then sealed with the upper sample itself (or with the
    /// sentinel position n for the final block).
    fn next_block(&mut self) -> Result<()> {
        let t = self.text;
        let n = t.len() as u32;
        let m = self.sample_suffs.len();
        let sanity = self.sanity;
        let verbose = self.verbose;
        if verbose {
            info!("computing block {} of {}", self.cur + 1, m + 1);
        }
        debug_assert!(self.cur as usize <= m);

        let first = self.cur == 0;
        let last = self.cur as usize == m;
        let lo = if first || m == 0 {
            ABSENT
        } else {
            self.sample_suffs[self.cur as usize - 1]
        };
        let hi = if last || m == 0 {
            ABSENT
        } else {
            self.sample_suffs[self.cur as usize]
        };

        self.itr_bucket.clear();
        if m == 0 {
            // no samples at all: every suffix lands in this one block
            debug_assert_eq!(self.cur, 0);
            if verbose {
                info!("  no samples; assembling all-inclusive block");
            }
            reserve_exact(&mut self.itr_bucket, n as usize + 1)?;
            self.itr_bucket.extend(0..n);
        } else {
            reserve_exact(&mut self.itr_bucket, self.bucket_sz as usize)?;

            // Z arrays to the cover period for each live bound
            let v = if self.dc.is_some() { self.dc_v as usize } else { 0 };
            let mut z_hi = vec![0u32; if hi != ABSENT { v } else { 0 }];
            let mut z_lo = vec![0u32; if lo != ABSENT { v } else { 0 }];
            {
                let _t = Timer::new("z-array computation", verbose);
                if hi != ABSENT {
                    calc_z(t, hi, &mut z_hi);
                }
                if lo != ABSENT {
                    calc_z(t, lo, &mut z_lo);
                }
            }

            // Sweep the whole text and keep the suffixes that fall strictly
            // between the bounds; the amortised states for the two bounds
            // are independent and never shared.
            let dc = self.dc.as_ref();
            let mut st_hi = CmpState::new();
            let mut st_lo = CmpState::new();
            {
                let _t = Timer::new("block accumulator loop", verbose);
                let step = (n + 9) / 10;
                for i in 0..n {
                    if verbose && step > 0 && i > 0 && i % step == 0 {
                        info!("  {}%", i / step * 10);
                    }
                    if i == hi || i == lo {
                        continue;
                    }
                    if hi != ABSENT && !suffix_cmp(t, dc, hi, i, &mut st_hi, &z_hi, sanity)? {
                        continue; // at or above the upper bound
                    }
                    if lo != ABSENT && suffix_cmp(t, dc, lo, i, &mut st_lo, &z_lo, sanity)? {
                        continue; // below the lower bound
                    }
                    self.itr_bucket.push(i);
                    if sanity && self.itr_bucket.len() >= self.bucket_sz as usize {
                        return Err(Error::InvariantViolation(format!(
                            "block {} overflowed the bound {}",
                            self.cur, self.bucket_sz
                        )));
                    }
                    debug_assert!(self.itr_bucket.len() < self.bucket_sz as usize);
                }
            }
        }

        if !self.itr_bucket.is_empty() {
            if verbose {
                info!("  sorting block of {} suffixes", self.itr_bucket.len());
            }
            let _t = Timer::new("block sort", verbose);
            sort_suffixes(t, &mut self.itr_bucket, t.alphabet(), self.dc.as_ref());
        }
        // seal with the upper sample, or with the sentinel for the last block
        if hi != ABSENT {
            self.itr_bucket.push(hi);
        } else {
            self.itr_bucket.push(n);
        }

        if sanity {
            if lo != ABSENT && !suffix_less(t, lo, self.itr_bucket[0]) {
                return Err(Error::InvariantViolation(format!(
                    "block {} starts at or below its lower bound",
                    self.cur
                )));
            }
            for w in self.itr_bucket.windows(2) {
                if !suffix_less(t, w[0], w[1]) {
                    return Err(Error::InvariantViolation(format!(
                        "block {} emitted out of order",
                        self.cur
                    )));
                }
            }
        }
        if verbose {
            info!("  block of {} entries ready", self.itr_bucket.len());
        }
        self.cur += 1;
        Ok(())
    }
}

impl<T: Text> Iterator for BlockwiseSa<'_, T> {
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_suffix() {
            Ok(s) => Some(Ok(s)),
            Err(Error::Exhausted) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::lcp::suffix_order;
    use crate::text::ByteText;

    fn config(bucket: u32, dc: u32) -> BuilderConfig {
        BuilderConfig {
            bucket_size: bucket,
            dc_period: dc,
            seed: 11,
            sanity_check: true,
            verbose: false,
        }
    }

    fn reference_sa(text: &[u8]) -> Vec<u32> {
        let t = ByteText::new(text);
        let mut sa: Vec<u32> = (0..=text.len() as u32).collect();
        sa.sort_by(|&a, &b| suffix_order(&t, a, b));
        sa
    }

    fn collect_blocks(text: &[u8], bucket: u32, dc: u32) -> (Vec<Vec<u32>>, Vec<u32>) {
        let t = ByteText::new(text);
        let mut sa = BlockwiseSa::new(&t, config(bucket, dc)).unwrap();
        let mut blocks = Vec::new();
        while sa.has_more_blocks() {
            sa.next_block().unwrap();
            blocks.push(sa.itr_bucket.clone());
        }
        (blocks, sa.sample_suffs.clone())
    }

    fn random_dna(len: usize, mut x: u32) -> Vec<u8> {
        (0..len)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                b"ACGT"[(x % 4) as usize]
            })
            .collect()
    }

    #[test]
    fn test_blocks_bounded_and_sealed() {
        let text = random_dna(1000, 0xbeef);
        let (blocks, samples) = collect_blocks(&text, 64, 64);
        assert_eq!(blocks.len(), samples.len() + 1);
        for (k, block) in blocks.iter().enumerate() {
            assert!(!block.is_empty());
            assert!(block.len() <= 64, "block {} has {} entries", k, block.len());
            if k < samples.len() {
                assert_eq!(*block.last().unwrap(), samples[k]);
            } else {
                assert_eq!(*block.last().unwrap(), text.len() as u32);
            }
        }
        let streamed: Vec<u32> = blocks.concat();
        assert_eq!(streamed, reference_sa(&text));
    }

    #[test]
    fn test_blocks_without_cover() {
        let text = random_dna(400, 0x51ce);
        let (blocks, samples) = collect_blocks(&text, 16, 0);
        assert_eq!(blocks.len(), samples.len() + 1);
        for block in &blocks {
            assert!(block.len() <= 16);
        }
        assert_eq!(blocks.concat(), reference_sa(&text));
    }

    #[test]
    fn test_all_inclusive_block() {
        // bucket bound above the text length: no samples, one block
        let (blocks, samples) = collect_blocks(b"gattaca", 64, 8);
        assert!(samples.is_empty());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], reference_sa(b"gattaca"));
    }

    #[test]
    fn test_samples_are_sorted_and_distinct() {
        let text = random_dna(600, 0xf00d);
        let t = ByteText::new(&text);
        let sa = BlockwiseSa::new(&t, config(8, 8)).unwrap();
        let samples = &sa.sample_suffs;
        for w in samples.windows(2) {
            assert!(suffix_less(&t, w[0], w[1]));
        }
    }

    #[test]
    fn test_repetitive_text_blocks() {
        let text = vec![b'a'; 150];
        for dc in [0u32, 8] {
            let (blocks, _) = collect_blocks(&text, 8, dc);
            for block in &blocks {
                assert!(block.len() <= 8);
            }
            assert_eq!(blocks.concat(), reference_sa(&text), "dc {}", dc);
        }
    }
}
