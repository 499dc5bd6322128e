//! Z-array computation.

use crate::text::Text;

/// Fill `z` so that `z[k]` is the length of the longest common prefix of
/// the suffixes at `off` and `off + k`, for `k` below `z.len()`.
///
/// `z[0]` stays 0 by convention. The classic left/right window keeps the
/// whole computation linear in the scanned characters even though the
/// values themselves may reach far past `z.len()`.
pub(crate) fn calc_z<T: Text>(t: &T, off: u32, z: &mut [u32]) {
    let n = t.len();
    let off = off as usize;
    let m = n - off; // length of the anchored suffix
    for zk in z.iter_mut() {
        *zk = 0;
    }
    let (mut l, mut r) = (0usize, 0usize);
    for k in 1..z.len().min(m) {
        let mut len = if k < r { (z[k - l] as usize).min(r - k) } else { 0 };
        while k + len < m && t.sym(off + len) == t.sym(off + k + len) {
            len += 1;
        }
        z[k] = len as u32;
        if k + len > r {
            l = k;
            r = k + len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ByteText;

    fn check_z(text: &[u8], off: usize, v: usize) {
        let t = ByteText::new(text);
        let mut z = vec![0u32; v];
        calc_z(&t, off as u32, &mut z);
        assert_eq!(z[0], 0);
        for (k, &zk) in z.iter().enumerate().skip(1) {
            let mut c = 0;
            while off + k + c < text.len() && text[off + c] == text[off + k + c] {
                c += 1;
            }
            assert_eq!(
                zk, c as u32,
                "z[{}] of {:?} anchored at {}",
                k,
                String::from_utf8_lossy(text),
                off
            );
        }
    }

    #[test]
    fn test_z_values_match_direct_scan() {
        check_z(b"aabcaabxaaz", 0, 11);
        check_z(b"banana", 0, 6);
        check_z(b"banana", 2, 6);
        check_z(b"aaaaaaaa", 0, 8);
        check_z(b"abcabcabc", 3, 8);
    }

    #[test]
    fn test_z_window_shorter_than_suffix() {
        // only the first few entries are requested
        check_z(b"abababababab", 0, 4);
    }

    #[test]
    fn test_z_anchor_near_end() {
        check_z(b"abcabc", 5, 8);
    }
}
