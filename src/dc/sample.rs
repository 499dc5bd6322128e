//! Ranked sample of suffixes at covered residues.

use crate::dc::{cover_for, witness_table};
use crate::error::{reserve_exact, Error, Result};
use crate::text::Text;
use crate::utils::timer::Timer;
use crate::ABSENT;
use log::info;
use std::cmp::Ordering;

/// A built difference-cover sample: every text position whose residue
/// modulo the period lies in the cover, ranked by the suffix it anchors.
///
/// `tie_break_off(a, b)` names the shift (always below the period) after
/// which `break_tie` settles the order of the two suffixes from the
/// precomputed ranks alone.
pub struct DifferenceCoverSample {
    v: u32,
    ds: Vec<u32>,      // cover residues, ascending
    dmap: Vec<u32>,    // residue -> index into ds, or ABSENT
    witness: Vec<u32>, // residue difference -> witness residue d1
    doff: Vec<u32>,    // start of each residue's position run, plus the total
    rank: Vec<u32>,    // suffix rank per sampled position, residue-major
}

impl DifferenceCoverSample {
    /// Sample `text` with period `v` and rank the sampled suffixes.
    ///
    /// Any period greater than 3 is accepted; smaller ones are rejected
    /// with [`Error::Config`].
    pub fn build<T: Text>(text: &T, v: u32, verbose: bool, sanity: bool) -> Result<Self> {
        if v <= 3 {
            return Err(Error::Config(format!(
                "difference-cover period must be greater than 3, got {}",
                v
            )));
        }
        let ds = cover_for(v);
        let witness = witness_table(v, &ds);
        debug_assert!(witness.iter().all(|&w| w != ABSENT));
        let n = text.len();

        let mut dmap = vec![ABSENT; v as usize];
        for (i, &d) in ds.iter().enumerate() {
            dmap[d as usize] = i as u32;
        }

        // Residue-major layout: all positions congruent to ds[0], then
        // ds[1], and so on. sample_index() relies on this.
        let mut doff = Vec::with_capacity(ds.len() + 1);
        doff.push(0u32);
        for &d in &ds {
            let cnt = if (d as usize) < n {
                (n - d as usize + v as usize - 1) / v as usize
            } else {
                0
            };
            let total = doff[doff.len() - 1];
            doff.push(total + cnt as u32);
        }
        let m = doff[doff.len() - 1] as usize;

        if verbose {
            info!(
                "building difference-cover sample: period {}, {} residues, {} sampled positions",
                v,
                ds.len(),
                m
            );
        }
        let mut pos = Vec::new();
        reserve_exact(&mut pos, m)?;
        for &d in &ds {
            let mut p = d as usize;
            while p < n {
                pos.push(p as u32);
                p += v as usize;
            }
        }
        debug_assert_eq!(pos.len(), m);

        let rank = {
            let _t = Timer::new("difference-cover ranking", verbose);
            rank_sample_suffixes(text, &pos, v, &dmap, &doff)?
        };

        let dc = Self {
            v,
            ds,
            dmap,
            witness,
            doff,
            rank,
        };
        if sanity {
            dc.verify(text, &pos)?;
        }
        Ok(dc)
    }

    /// Cover period.
    pub fn period(&self) -> u32 {
        self.v
    }

    /// Cover residues.
    pub fn cover(&self) -> &[u32] {
        &self.ds
    }

    /// Number of characters after which `break_tie` can settle the order of
    /// the suffixes at `a` and `b`. Always below the period.
    pub fn tie_break_off(&self, a: u32, b: u32) -> u32 {
        let (ar, br) = (a % self.v, b % self.v);
        let diff = (br + self.v - ar) % self.v;
        let d1 = self.witness[diff as usize];
        (d1 + self.v - ar) % self.v
    }

    /// Order of the sampled suffixes at `a` and `b`. Both positions must be
    /// sampled and inside the text, which holds for any pair advanced by
    /// `tie_break_off` from live offsets.
    pub fn break_tie(&self, a: u32, b: u32) -> Ordering {
        self.rank[self.sample_index(a)].cmp(&self.rank[self.sample_index(b)])
    }

    /// Order of two suffixes already known to share at least `period`
    /// leading characters.
    pub(crate) fn shared_prefix_order(&self, a: u32, b: u32) -> Ordering {
        let d = self.tie_break_off(a, b);
        self.break_tie(a + d, b + d)
    }

    fn sample_index(&self, p: u32) -> usize {
        let ri = self.dmap[(p % self.v) as usize];
        debug_assert_ne!(ri, ABSENT, "position {} is not sampled", p);
        (self.doff[ri as usize] + p / self.v) as usize
    }

    /// Pairwise cross-check of the ranks against naive suffix comparison,
    /// capped so sanity mode stays usable on real inputs.
    fn verify<T: Text>(&self, text: &T, pos: &[u32]) -> Result<()> {
        let cap = pos.len().min(200);
        for i in 0..cap {
            for j in (i + 1)..cap {
                let (a, b) = (pos[i], pos[j]);
                let want = crate::sa::lcp::suffix_order(text, a, b);
                let got = self.break_tie(a, b);
                if want != got {
                    return Err(Error::InvariantViolation(format!(
                        "difference-cover rank order of suffixes {} and {} is {:?}, expected {:?}",
                        a, b, got, want
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Order of the `v`-symbol blocks at `a` and `b`; a block that runs off the
/// end of the text compares greater at the first missing symbol.
fn block_cmp<T: Text>(t: &T, a: u32, b: u32, v: u32) -> Ordering {
    let n = t.len();
    for c in 0..v as usize {
        let (pa, pb) = (a as usize + c, b as usize + c);
        if pa >= n {
            return if pb >= n { Ordering::Equal } else { Ordering::Greater };
        }
        if pb >= n {
            return Ordering::Less;
        }
        let (ca, cb) = (t.sym(pa), t.sym(pb));
        if ca != cb {
            return ca.cmp(&cb);
        }
    }
    Ordering::Equal
}

/// Rank every sampled suffix: a comparison sort on the leading `v`-symbol
/// blocks seeds the ranks, then prefix doubling over the sample's own
/// successor structure (`p` to `p + h`, residues are closed under adding
/// the period) refines them until all are distinct. A successor past the
/// end of the text ranks greatest, matching the fall-off convention.
fn rank_sample_suffixes<T: Text>(
    t: &T,
    pos: &[u32],
    v: u32,
    dmap: &[u32],
    doff: &[u32],
) -> Result<Vec<u32>> {
    let n = t.len();
    let m = pos.len();
    let mut rank = Vec::new();
    reserve_exact(&mut rank, m)?;
    rank.resize(m, 0u32);
    if m < 2 {
        return Ok(rank);
    }
    let sample_index = |p: u32| -> usize {
        let ri = dmap[(p % v) as usize] as usize;
        (doff[ri] + p / v) as usize
    };

    let mut order: Vec<u32> = (0..m as u32).collect();
    order.sort_unstable_by(|&x, &y| block_cmp(t, pos[x as usize], pos[y as usize], v));
    let mut r = 0u32;
    rank[order[0] as usize] = 0;
    for w in 1..m {
        if block_cmp(t, pos[order[w - 1] as usize], pos[order[w] as usize], v) != Ordering::Equal {
            r += 1;
        }
        rank[order[w] as usize] = r;
    }
    let mut distinct = r as usize + 1;

    let mut h = v as usize;
    while distinct < m {
        // Materialise the keys before rewriting the ranks they read.
        let mut keyed: Vec<(u32, u32, u32)> = order
            .iter()
            .map(|&si| {
                let q = pos[si as usize] as usize + h;
                let k2 = if q >= n { u32::MAX } else { rank[sample_index(q as u32)] };
                (rank[si as usize], k2, si)
            })
            .collect();
        keyed.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut r = 0u32;
        let mut prev = (keyed[0].0, keyed[0].1);
        for (w, &(k1, k2, si)) in keyed.iter().enumerate() {
            if (k1, k2) != prev {
                r += 1;
                prev = (k1, k2);
            }
            order[w] = si;
            rank[si as usize] = r;
        }
        distinct = r as usize + 1;
        h *= 2;
        debug_assert!(h < 4 * (n + 1), "doubling failed to separate the sample");
    }
    Ok(rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::lcp::suffix_order;
    use crate::text::ByteText;

    fn check_oracle(text: &[u8], v: u32) {
        let t = ByteText::new(text);
        let dc = DifferenceCoverSample::build(&t, v, false, true).unwrap();
        assert_eq!(dc.period(), v);
        // Every sampled pair must rank exactly as a naive comparison says.
        let n = text.len() as u32;
        let sampled: Vec<u32> = (0..n)
            .filter(|&p| dc.dmap[(p % v) as usize] != ABSENT)
            .collect();
        for &a in &sampled {
            for &b in &sampled {
                if a == b {
                    continue;
                }
                assert_eq!(
                    dc.break_tie(a, b),
                    suffix_order(&t, a, b),
                    "break_tie({}, {}) on {:?}",
                    a,
                    b,
                    String::from_utf8_lossy(text)
                );
            }
        }
    }

    #[test]
    fn test_ranks_match_naive_order() {
        check_oracle(b"mississippi", 4);
        check_oracle(b"mississippi", 8);
        check_oracle(b"abcabcabcabcabc", 4);
    }

    #[test]
    fn test_ranks_with_arbitrary_periods() {
        check_oracle(b"mississippi", 5);
        check_oracle(b"gattacagattacagattaca", 7);
        check_oracle(b"abcabcabcabcabcabcabc", 12);
    }

    #[test]
    fn test_rejects_tiny_period() {
        let t = ByteText::new(b"acgt");
        for v in [0, 1, 2, 3] {
            assert!(matches!(
                DifferenceCoverSample::build(&t, v, false, false),
                Err(Error::Config(_))
            ));
        }
    }

    #[test]
    fn test_ranks_on_repetitive_text() {
        let text = vec![b'a'; 61];
        check_oracle(&text, 8);
    }

    #[test]
    fn test_ranks_on_random_dna() {
        // xorshift so the fixture is stable
        let mut x = 0x9e3779b9u32;
        let text: Vec<u8> = (0..257)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                b"ACGT"[(x % 4) as usize]
            })
            .collect();
        check_oracle(&text, 16);
    }

    #[test]
    fn test_tie_break_off_lands_on_cover() {
        let t = ByteText::new(b"gattacagattacagattaca");
        let dc = DifferenceCoverSample::build(&t, 8, false, false).unwrap();
        for a in 0..12u32 {
            for b in 0..12u32 {
                let d = dc.tie_break_off(a, b);
                assert!(d < 8);
                assert_ne!(dc.dmap[((a + d) % 8) as usize], ABSENT);
                assert_ne!(dc.dmap[((b + d) % 8) as usize], ABSENT);
            }
        }
    }

    #[test]
    fn test_period_larger_than_text() {
        let t = ByteText::new(b"acgt");
        let dc = DifferenceCoverSample::build(&t, 64, false, true).unwrap();
        assert_eq!(dc.period(), 64);
    }

    #[test]
    fn test_empty_text() {
        let t = ByteText::new(b"");
        let dc = DifferenceCoverSample::build(&t, 4, false, true).unwrap();
        assert_eq!(dc.rank.len(), 0);
    }
}
