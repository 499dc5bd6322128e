//! Difference-cover tables.

use crate::ABSENT;

// Hand-verified minimal-ish covers for the small power-of-two periods.
const COVER_4: &[u32] = &[0, 1, 2];
const COVER_8: &[u32] = &[0, 1, 2, 4];
const COVER_16: &[u32] = &[0, 1, 2, 5, 8];
const COVER_32: &[u32] = &[0, 1, 2, 3, 7, 11, 19];
const COVER_64: &[u32] = &[0, 1, 2, 5, 14, 16, 34, 42, 59];

/// Difference cover for period `v`: a set D of residues such that every
/// difference mod `v` can be written `d2 - d1` with both ends in D.
///
/// Any period greater than 3 is supported; callers validate the period
/// before reaching this point. The small power-of-two periods come from the
/// verified tables above, everything else uses the square-root
/// construction, which stays within O(sqrt(v)) residues.
pub(crate) fn cover_for(v: u32) -> Vec<u32> {
    debug_assert!(v > 3, "difference-cover period must be greater than 3");
    match v {
        4 => COVER_4.to_vec(),
        8 => COVER_8.to_vec(),
        16 => COVER_16.to_vec(),
        32 => COVER_32.to_vec(),
        64 => COVER_64.to_vec(),
        _ => constructed(v),
    }
}

/// D = {0..r} ∪ {multiples of r below v} with r = ceil(sqrt(v)).
///
/// Any difference q*r + s with 0 < s < r is covered by
/// d1 = ((q+1)*r) mod v and d2 = r - s: since (q+1)*r < v + r, the wrapped
/// value lands below r and is itself a member. Differences that are plain
/// multiples of r pair with 0 directly. No divisibility between r and v is
/// needed, so the period can be arbitrary.
fn constructed(v: u32) -> Vec<u32> {
    let mut r = 1u32;
    while (r as u64) * (r as u64) < v as u64 {
        r += 1;
    }
    let mut d: Vec<u32> = (0..r).collect();
    d.extend((r..v).step_by(r as usize));
    d
}

/// For each residue difference `i`, a witness `d1` in D such that
/// `(d1 + i) mod v` is also in D.
pub(crate) fn witness_table(v: u32, d: &[u32]) -> Vec<u32> {
    let mut w = vec![ABSENT; v as usize];
    for &d1 in d {
        for &d2 in d {
            let diff = (d2 + v - d1) % v;
            if w[diff as usize] == ABSENT {
                w[diff as usize] = d1;
            }
        }
    }
    w
}
