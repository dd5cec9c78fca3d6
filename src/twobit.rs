//! Packed 2-bit nucleotide sequence with contiguous and masked k-mer extraction.

use rand::Rng;

use crate::error::{Result, SeqbiasError};

/// Number of 2-bit codes packed into one storage word.
const CODES_PER_WORD: usize = u64::BITS as usize / 2;

/// A/C/G/T packed two bits per base, low-order-first within each word.
///
/// Bits beyond `len - 1` in the final word are always zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwoBitSeq {
    words: Vec<u64>,
    len: usize,
}

/// Maps a nucleotide byte (any case) to its 2-bit code. Anything that is not
/// A/C/G/T/U is encoded by drawing a uniformly random base, per §3.
#[inline]
fn base_code(b: u8, rng: &mut impl Rng) -> u8 {
    match b {
        b'A' | b'a' | b'U' | b'u' => 0,
        b'C' | b'c' => 1,
        b'G' | b'g' => 2,
        b'T' | b't' => 3,
        _ => rng.gen_range(0..4),
    }
}

#[inline]
fn code_to_base(code: u8) -> u8 {
    match code & 0b11 {
        0 => b'a',
        1 => b'c',
        2 => b'g',
        _ => b't',
    }
}

impl TwoBitSeq {
    pub fn new_empty() -> Self {
        TwoBitSeq {
            words: Vec::new(),
            len: 0,
        }
    }

    /// Packs an ASCII sequence, substituting non-ACGT bases with a uniformly
    /// random base drawn from `rng`.
    pub fn from_ascii_with_rng(seq: &str, rng: &mut impl Rng) -> Self {
        let bytes = seq.as_bytes();
        let len = bytes.len();
        let n_words = len.div_ceil(CODES_PER_WORD);
        let mut words = vec![0u64; n_words];

        for (i, &b) in bytes.iter().enumerate() {
            let code = base_code(b, rng) as u64;
            words[i / CODES_PER_WORD] |= code << (2 * (i % CODES_PER_WORD));
        }

        TwoBitSeq { words, len }
    }

    /// Packs an ASCII sequence using a fresh thread-local RNG for any
    /// non-ACGT fallback substitutions.
    pub fn from_ascii(seq: &str) -> Self {
        let mut rng = rand::thread_rng();
        Self::from_ascii_with_rng(seq, &mut rng)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn code_at(&self, pos: usize) -> u8 {
        let word = self.words[pos / CODES_PER_WORD];
        ((word >> (2 * (pos % CODES_PER_WORD))) & 0b11) as u8
    }

    /// Renders the packed sequence back to lower-case ASCII.
    pub fn to_string(&self) -> String {
        (0..self.len).map(|i| code_to_base(self.code_at(i)) as char).collect()
    }

    /// Unpacks every position's 2-bit code, in order.
    pub fn codes(&self) -> Vec<u8> {
        (0..self.len).map(|i| self.code_at(i)).collect()
    }

    /// Reverse-complement: code `c` complements to `3 - c` since A/T and C/G
    /// are assigned complementary code pairs (0,3) and (1,2).
    pub fn reverse_complement(&self) -> TwoBitSeq {
        let codes: Vec<u8> = (0..self.len).rev().map(|i| 3 - self.code_at(i)).collect();
        let mut words = vec![0u64; self.words.len()];
        for (i, &code) in codes.iter().enumerate() {
            words[i / CODES_PER_WORD] |= (code as u64) << (2 * (i % CODES_PER_WORD));
        }
        TwoBitSeq { words, len: self.len }
    }

    /// Contiguous k-mer ending at `pos` (inclusive), high bit = leftmost base.
    /// `pos` and `k` are both given in base coordinates; positions `pos-k+1..=pos`
    /// must all lie within `[0, len)`.
    pub fn get_kmer(&self, k: u32, pos: i64) -> Result<u64> {
        if k == 0 {
            return Ok(0);
        }
        if pos < 0 || pos as usize >= self.len {
            return Err(SeqbiasError::ShortSequence { k, pos, len: self.len });
        }
        let start = pos - (k as i64 - 1);
        if start < 0 {
            return Err(SeqbiasError::ShortSequence { k, pos, len: self.len });
        }
        let mut kmer: u64 = 0;
        for p in start..=pos {
            kmer = (kmer << 2) | self.code_at(p as usize) as u64;
        }
        Ok(kmer)
    }

    /// Masked k-mer: for each `i` where `mask[i]` is true, includes the code
    /// at genomic position `anchor + i`. Included codes are concatenated in
    /// ascending `i` order, the earliest included position landing in the
    /// high-order bits. Returns `(kmer, k)` where `k = popcount(mask)`.
    pub fn make_kmer(&self, anchor: i64, mask: &[bool]) -> Result<(u64, u32)> {
        let mut kmer: u64 = 0;
        let mut k = 0u32;
        for (i, &bit) in mask.iter().enumerate() {
            if !bit {
                continue;
            }
            let pos = anchor + i as i64;
            if pos < 0 || pos as usize >= self.len {
                return Err(SeqbiasError::ShortSequence {
                    k: mask.len() as u32,
                    pos,
                    len: self.len,
                });
            }
            kmer = (kmer << 2) | self.code_at(pos as usize) as u64;
            k += 1;
        }
        Ok((kmer, k))
    }
}

impl std::fmt::Display for TwoBitSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string())
    }
}
