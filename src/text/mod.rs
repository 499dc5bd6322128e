//! Text abstraction and adaptors.
//!
//! The builder is generic over how symbols are stored: an unpacked byte
//! slice ([`ByteText`]) or a 2-bit-packed nucleotide sequence
//! ([`PackedDna`]). Sorting primitives that can exploit a contiguous byte
//! view ask for one through [`Text::as_bytes`] and fall back to indexed
//! access when the storage is packed.

/// An ordered symbol alphabet; `sigma` is the number of distinct symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alphabet {
    /// Number of symbols; every symbol is in `0..sigma` (byte texts use
    /// the full byte range)
    pub sigma: u32,
}

impl Alphabet {
    /// Two-bit nucleotide codes A=0, C=1, G=2, T=3
    pub const DNA: Alphabet = Alphabet { sigma: 4 };
    /// Arbitrary bytes
    pub const BYTES: Alphabet = Alphabet { sigma: 256 };
}

/// Random-access sequence of small ordered symbols.
pub trait Text {
    /// Number of symbols
    fn len(&self) -> usize;

    /// Symbol at position `i`; panics when out of range
    fn sym(&self, i: usize) -> u8;

    /// Alphabet the symbols are drawn from
    fn alphabet(&self) -> Alphabet;

    /// Contiguous byte view, when the storage is unpacked
    fn as_bytes(&self) -> Option<&[u8]> {
        None
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Borrowed, unpacked byte text.
#[derive(Debug, Clone, Copy)]
pub struct ByteText<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteText<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl Text for ByteText<'_> {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn sym(&self, i: usize) -> u8 {
        self.bytes[i]
    }

    fn alphabet(&self) -> Alphabet {
        Alphabet::BYTES
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        Some(self.bytes)
    }
}

/// Owned nucleotide sequence packed four symbols to a byte.
#[derive(Debug, Clone, Default)]
pub struct PackedDna {
    data: Vec<u8>,
    len: usize,
}

impl PackedDna {
    /// Pack an ASCII sequence. Case is ignored; characters other than
    /// A, C, G and T collapse to A.
    pub fn from_ascii(seq: &[u8]) -> Self {
        let mut dna = PackedDna {
            data: Vec::with_capacity((seq.len() + 3) / 4),
            len: 0,
        };
        for &b in seq {
            let code = match b {
                b'A' | b'a' => 0,
                b'C' | b'c' => 1,
                b'G' | b'g' => 2,
                b'T' | b't' => 3,
                _ => 0,
            };
            dna.push(code);
        }
        dna
    }

    /// Append one 2-bit code (0..4).
    pub fn push(&mut self, code: u8) {
        debug_assert!(code < 4);
        let shift = (self.len & 3) << 1;
        if shift == 0 {
            self.data.push(code);
        } else {
            let last = self.data.len() - 1;
            self.data[last] |= code << shift;
        }
        self.len += 1;
    }
}

impl Text for PackedDna {
    fn len(&self) -> usize {
        self.len
    }

    fn sym(&self, i: usize) -> u8 {
        assert!(i < self.len);
        (self.data[i >> 2] >> ((i & 3) << 1)) & 3
    }

    fn alphabet(&self) -> Alphabet {
        Alphabet::DNA
    }
}
