//! Multikey quicksort of suffix positions.
//!
//! Bentley–Sedgewick ternary partitioning on successive characters, driven
//! by an explicit work stack so degenerate inputs cannot exhaust the call
//! stack. A suffix that runs out of characters at the current depth takes an
//! ordinal greater than every real symbol, so it lands after every
//! continuation of its prefix.
//!
//! With a difference cover at hand, any range whose shared depth has reached
//! the cover period is finished by rank comparisons instead of character
//! scans, which bounds the total work on repetitive texts.

use crate::dc::DifferenceCoverSample;
use crate::sa::lcp::tie_breaking_lcp;
use crate::text::{Alphabet, Text};
use std::cmp::Ordering;

/// Ranges at or below this size go to a plain comparison sort.
const SMALL_RANGE: usize = 16;

/// Ordinal for the character of suffix `p` at `depth`; past the end of the
/// text it is greater than every symbol.
#[inline]
fn ord_at<T: Text>(t: &T, p: u32, depth: u32) -> u32 {
    let i = p as usize + depth as usize;
    if i >= t.len() {
        u32::MAX
    } else {
        t.sym(i) as u32
    }
}

#[inline]
fn median3(a: u32, b: u32, c: u32) -> u32 {
    a.max(b).min(a.min(b).max(c))
}

/// Order `positions` in place by the suffixes they anchor.
///
/// Positions must be distinct and inside the text; the induced order is
/// total because two distinct suffixes of one text always separate, at the
/// latest when the shorter falls off the end (and then the shorter is the
/// greater).
pub fn sort_suffixes<T: Text>(
    t: &T,
    positions: &mut [u32],
    alpha: Alphabet,
    dc: Option<&DifferenceCoverSample>,
) {
    debug_assert!(positions.iter().all(|&p| (p as usize) < t.len()));
    debug_assert!((0..t.len().min(1 << 12)).all(|i| (t.sym(i) as u32) < alpha.sigma));
    if positions.len() < 2 {
        return;
    }
    let mut work: Vec<(usize, usize, u32)> = vec![(0, positions.len(), 0)];
    while let Some((lo, hi, depth)) = work.pop() {
        if let Some(dc) = dc {
            if depth >= dc.period() {
                // Everything here shares `depth` >= period characters; the
                // cover ranks settle each pair in constant time.
                positions[lo..hi].sort_unstable_by(|&a, &b| dc.shared_prefix_order(a, b));
                continue;
            }
        }
        if hi - lo <= SMALL_RANGE {
            positions[lo..hi].sort_unstable_by(|&a, &b| suffix_order_bounded(t, dc, a, b));
            continue;
        }
        let mid = lo + (hi - lo) / 2;
        let pivot = median3(
            ord_at(t, positions[lo], depth),
            ord_at(t, positions[mid], depth),
            ord_at(t, positions[hi - 1], depth),
        );
        // ternary partition on the character at `depth`
        let (mut lt, mut gt, mut i) = (lo, hi, lo);
        while i < gt {
            let c = ord_at(t, positions[i], depth);
            match c.cmp(&pivot) {
                Ordering::Less => {
                    positions.swap(lt, i);
                    lt += 1;
                    i += 1;
                }
                Ordering::Greater => {
                    gt -= 1;
                    positions.swap(i, gt);
                }
                Ordering::Equal => i += 1,
            }
        }
        if lt - lo > 1 {
            work.push((lo, lt, depth));
        }
        // a range equal to the past-the-end ordinal holds at most one suffix
        if gt - lt > 1 && pivot != u32::MAX {
            work.push((lt, gt, depth + 1));
        }
        if hi - gt > 1 {
            work.push((gt, hi, depth));
        }
    }
}

/// Comparison-sort order for small ranges: character scan bounded by the
/// cover (full scan without one).
fn suffix_order_bounded<T: Text>(
    t: &T,
    dc: Option<&DifferenceCoverSample>,
    a: u32,
    b: u32,
) -> Ordering {
    let (_, _, less) = tie_breaking_lcp(t, dc, a, b);
    if less {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::lcp::suffix_order;
    use crate::text::ByteText;

    fn check_sort(text: &[u8], dc_period: u32) {
        let t = ByteText::new(text);
        let dc = if dc_period != 0 {
            Some(DifferenceCoverSample::build(&t, dc_period, false, false).unwrap())
        } else {
            None
        };
        let mut positions: Vec<u32> = (0..text.len() as u32).collect();
        sort_suffixes(&t, &mut positions, t.alphabet(), dc.as_ref());

        let mut want: Vec<u32> = (0..text.len() as u32).collect();
        want.sort_by(|&a, &b| suffix_order(&t, a, b));
        assert_eq!(positions, want, "text {:?} dc {}", String::from_utf8_lossy(text), dc_period);
    }

    #[test]
    fn test_sorts_like_naive() {
        check_sort(b"banana", 0);
        check_sort(b"mississippi", 0);
        check_sort(b"mississippi", 4);
        check_sort(b"abcabcabcabcabcabcabc", 0);
        check_sort(b"abcabcabcabcabcabcabc", 8);
    }

    #[test]
    fn test_sorts_repetitive_text() {
        let text = vec![b'a'; 300];
        check_sort(&text, 0);
        check_sort(&text, 8);
    }

    #[test]
    fn test_sorts_random_bytes() {
        let mut x = 0x2545f491u32;
        let text: Vec<u8> = (0..600)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                (x % 7) as u8 + b'a'
            })
            .collect();
        check_sort(&text, 0);
        check_sort(&text, 32);
    }

    #[test]
    fn test_sorts_subsets() {
        let t = ByteText::new(b"gattacagattacagattaca");
        let mut positions = vec![0u32, 7, 14, 3, 10, 17, 5];
        sort_suffixes(&t, &mut positions, t.alphabet(), None);
        let mut want = vec![0u32, 7, 14, 3, 10, 17, 5];
        want.sort_by(|&a, &b| suffix_order(&t, a, b));
        assert_eq!(positions, want);
    }

    #[test]
    fn test_empty_and_singleton() {
        let t = ByteText::new(b"ab");
        let mut empty: Vec<u32> = vec![];
        sort_suffixes(&t, &mut empty, t.alphabet(), None);
        let mut one = vec![1u32];
        sort_suffixes(&t, &mut one, t.alphabet(), None);
        assert_eq!(one, vec![1]);
    }
}
