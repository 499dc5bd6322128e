//! Binary bucket search against the sorted samples.

use crate::sa::lcp::suffix_less;
use crate::text::Text;

/// Ordinal of the bucket the suffix at `i` falls into, given `samples`
/// sorted by suffix order, or `None` when `i` is itself one of the samples.
///
/// Bucket `r` holds the suffixes strictly between `samples[r-1]` and
/// `samples[r]`; the first and last buckets are open-ended.
pub(crate) fn binary_sa_search<T: Text>(t: &T, i: u32, samples: &[u32]) -> Option<u32> {
    let mut lo = 0usize;
    let mut hi = samples.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if samples[mid] == i {
            // two distinct suffixes never compare equal, so only the
            // position itself can collide with a sample
            return None;
        }
        if suffix_less(t, i, samples[mid]) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Some(lo as u32)
}
