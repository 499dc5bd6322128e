//! Amortised suffix-versus-sample comparison.
//!
//! `suffix_cmp` answers "is the suffix at `i` less than the sample suffix at
//! `cmp`?" for `i` sweeping left to right over the text, in the manner of
//! SMALLERSUFFIXES from Kärkkäinen's Fast BWT construction: a Z array
//! anchored at the sample predicts how far `i` matches `cmp`, and the
//! furthest-extending previous match is carried across calls so characters
//! are compared only when a match pushes past everything seen before.

use crate::dc::DifferenceCoverSample;
use crate::error::{Error, Result};
use crate::sa::lcp::{suffix_lcp, suffix_less, tie_breaking_lcp};
use crate::text::Text;

/// Per-bound comparison state.
///
/// `j` is the start of the furthest-extending previous match against the
/// sample, `k` one past its right edge, `soft` whether that edge came from
/// a difference-cover cut (an underestimate) rather than a real mismatch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CmpState {
    j: i64,
    k: i64,
    soft: bool,
}

impl CmpState {
    pub(crate) fn new() -> Self {
        Self {
            j: -1,
            k: -1,
            soft: false,
        }
    }
}

/// Decide `suffix(i) < suffix(cmp)`, updating `st` for the next sweep
/// position. `z` must be the Z array anchored at `cmp` (empty without a
/// cover). `i` must advance monotonically between calls on the same state.
pub(crate) fn suffix_cmp<T: Text>(
    t: &T,
    dc: Option<&DifferenceCoverSample>,
    cmp: u32,
    i: u32,
    st: &mut CmpState,
    z: &[u32],
    sanity: bool,
) -> Result<bool> {
    let n = t.len() as u32;
    let mut l: u32;
    if (i as i64) > st.k {
        // not covered by any previous match; start fresh and extend below
        st.k = i as i64;
        l = 0;
        st.soft = false;
    } else {
        debug_assert!((i as i64) > st.j);
        let z_idx = (i as i64 - st.j) as usize;
        debug_assert!(z_idx as u32 <= n - cmp);
        if dc.is_some() && z_idx < z.len() {
            // the Z box bounds the match; `j` is only moved once the box
            // is known to reach the window edge
            l = z[z_idx].min(n - i);
        } else {
            let (lcp, soft, less) = tie_breaking_lcp(t, dc, i, cmp);
            if sanity {
                check_lcp_estimate(t, i, cmp, lcp, soft)?;
                check_decision(t, i, cmp, less)?;
            }
            st.j = i as i64;
            st.k = i as i64 + lcp as i64;
            st.soft = soft;
            return Ok(less);
        }
    }

    let mut k = st.k;
    if i as i64 + l as i64 == k {
        // match ends exactly at the window edge: extend both together
        while l < n - cmp && (k as u32) < n && t.sym((cmp + l) as usize) == t.sym(k as usize) {
            k += 1;
            l += 1;
        }
        st.j = i as i64;
        st.soft = false;
    } else if i as i64 + l as i64 > k {
        // Z box reaches past the window; clamp to it
        l = (k - i as i64) as u32;
        st.j = i as i64;
        if st.soft {
            // a soft edge may still extend for real
            while l < n - cmp && (k as u32) < n && t.sym((cmp + l) as usize) == t.sym(k as usize)
            {
                k += 1;
                l += 1;
            }
            st.soft = false;
        }
    }
    st.k = k;

    if sanity {
        check_lcp_estimate(t, i, cmp, l, st.soft)?;
    }
    debug_assert!(i + l <= n);
    debug_assert!(l <= n - cmp);
    // i and cmp never name the same suffix
    debug_assert!(l != n - cmp || i + l != n);

    // compare the characters just past the match; a suffix that has run out
    // is the greater one
    let less = i + l != n
        && (l == n - cmp || t.sym((i + l) as usize) < t.sym((cmp + l) as usize));
    if sanity {
        check_decision(t, i, cmp, less)?;
    }
    Ok(less)
}

fn check_lcp_estimate<T: Text>(t: &T, a: u32, b: u32, l: u32, soft: bool) -> Result<()> {
    let true_lcp = suffix_lcp(t, a, b);
    let ok = if soft { l <= true_lcp } else { l == true_lcp };
    if !ok {
        return Err(Error::InvariantViolation(format!(
            "lcp estimate {} (soft: {}) disagrees with true lcp {} for suffixes {} and {}",
            l, soft, true_lcp, a, b
        )));
    }
    Ok(())
}

fn check_decision<T: Text>(t: &T, a: u32, b: u32, less: bool) -> Result<()> {
    if suffix_less(t, a, b) != less {
        return Err(Error::InvariantViolation(format!(
            "comparison of suffixes {} and {} decided {}, naive order disagrees",
            a, b, less
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dc::DifferenceCoverSample;
    use crate::sa::zbox::calc_z;
    use crate::text::ByteText;

    /// Sweep every i against a fixed sample and insist each decision
    /// matches the naive order. Sanity mode doubles as the oracle.
    fn check_sweep(text: &[u8], cmp: u32, dc_period: u32) {
        let t = ByteText::new(text);
        let dc = if dc_period != 0 {
            Some(DifferenceCoverSample::build(&t, dc_period, false, true).unwrap())
        } else {
            None
        };
        let v = if dc.is_some() { dc_period as usize } else { 0 };
        let mut z = vec![0u32; v];
        if dc.is_some() {
            calc_z(&t, cmp, &mut z);
        }
        let mut st = CmpState::new();
        for i in 0..text.len() as u32 {
            if i == cmp {
                continue;
            }
            let got = suffix_cmp(&t, dc.as_ref(), cmp, i, &mut st, &z, true).unwrap();
            assert_eq!(
                got,
                suffix_less(&t, i, cmp),
                "suffix {} vs sample {} on {:?} (dc {})",
                i,
                cmp,
                String::from_utf8_lossy(text),
                dc_period
            );
        }
    }

    #[test]
    fn test_sweep_plain_texts() {
        for cmp in 0..6 {
            check_sweep(b"banana", cmp, 0);
            check_sweep(b"banana", cmp, 8);
        }
    }

    #[test]
    fn test_sweep_repetitive_text() {
        let text = vec![b'a'; 120];
        for cmp in [0u32, 1, 17, 60, 119] {
            check_sweep(&text, cmp, 0);
            check_sweep(&text, cmp, 8);
        }
    }

    #[test]
    fn test_sweep_periodic_text() {
        let text: Vec<u8> = b"acgt".iter().cycle().take(128).copied().collect();
        for cmp in [0u32, 3, 5, 64, 127] {
            check_sweep(&text, cmp, 0);
            check_sweep(&text, cmp, 16);
        }
    }

    #[test]
    fn test_sweep_random_text() {
        let mut x = 0xdeadbeefu32;
        let text: Vec<u8> = (0..400)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                b"ACGT"[(x % 4) as usize]
            })
            .collect();
        for cmp in [0u32, 57, 200, 399] {
            check_sweep(&text, cmp, 0);
            check_sweep(&text, cmp, 32);
        }
    }
}
