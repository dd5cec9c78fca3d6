//! Bayesian-network motif: per-position conditional distributions learned to
//! discriminate foreground (read-start-anchored) from background (offset)
//! windows, and the log-space scorer used at prediction time.

pub mod learn;

use crate::twobit::TwoBitSeq;

/// Additive floor applied only inside the scorer's logarithm, to sidestep
/// `log 0` without perturbing the stored tables (see §9).
const SCORE_EPS: f64 = 1e-12;

/// A learned (or trivial) motif over a window of length `n_w = l + 1 + r`.
///
/// Frozen at the end of [`learn::learn`]: thereafter read-only and safely
/// shareable across scorers (§3 Lifecycles).
#[derive(Debug, Clone)]
pub struct Motif {
    pub l: i64,
    pub r: i64,
    /// Parent set `P[i]` for each window position, `i` in `0..n_w`. Every
    /// `j` satisfies `j < i` (the fixed linear order that keeps the parent
    /// graph acyclic).
    pub parents: Vec<Vec<usize>>,
    /// Conditional table for each position: flat array of length
    /// `4^(|P[i]|+1)`, row-major, child slot least-significant.
    pub fg_tables: Vec<Vec<f64>>,
    pub bg_tables: Vec<Vec<f64>>,
    /// Set when the motif is a no-op fallback (insufficient training data):
    /// every position has an empty parent set and a uniform distribution, so
    /// [`Motif::bias`] always returns 1.0. Informational only — not part of
    /// the model file format (§6), so it is excluded from equality.
    pub trivial: bool,
}

/// Compares the tables that actually determine scoring behavior. `trivial`
/// is not persisted by [`crate::model`], so a motif loaded back from disk
/// must still equal the one that was saved regardless of its flag.
impl PartialEq for Motif {
    fn eq(&self, other: &Self) -> bool {
        self.l == other.l
            && self.r == other.r
            && self.parents == other.parents
            && self.fg_tables == other.fg_tables
            && self.bg_tables == other.bg_tables
    }
}

impl Motif {
    pub fn n_w(&self) -> usize {
        (self.l + 1 + self.r) as usize
    }

    /// A no-op motif: empty parents, uniform 4-way distributions everywhere.
    /// Used both as the `InsufficientData` fallback and as a basis for unit
    /// tests of the "bias ≡ 1.0" invariant.
    pub fn trivial(l: i64, r: i64) -> Motif {
        let n_w = (l + 1 + r) as usize;
        let uniform = vec![0.25; 4];
        Motif {
            l,
            r,
            parents: vec![Vec::new(); n_w],
            fg_tables: vec![uniform.clone(); n_w],
            bg_tables: vec![uniform; n_w],
            trivial: true,
        }
    }

    /// Joint index into a position's conditional table: child value is the
    /// least-significant 2 bits, followed by the parents in `P[i]` order.
    fn table_index(&self, i: usize, window: &[u8]) -> usize {
        let mut idx: usize = window[i] as usize;
        for (t, &p) in self.parents[i].iter().enumerate() {
            idx |= (window[p] as usize) << (2 * (t + 1));
        }
        idx
    }

    /// Scores one window of exactly `n_w` 2-bit base codes (values `0..4`),
    /// already aligned so that `window[l]` is the read-start position.
    pub fn score_window(&self, window: &[u8]) -> f64 {
        debug_assert_eq!(window.len(), self.n_w());
        let mut log_bias = 0.0f64;
        for i in 0..self.n_w() {
            let idx = self.table_index(i, window);
            let bg_val = self.bg_tables[i][idx];
            if bg_val <= 0.0 {
                // Zero-denominator clamp: treat this position as uninformative.
                continue;
            }
            let fg_val = self.fg_tables[i][idx];
            log_bias += (fg_val + SCORE_EPS).ln() - (bg_val + SCORE_EPS).ln();
        }
        log_bias.exp()
    }

    /// Bias at genomic anchor `a` in `seq`, where window positions map to
    /// `seq[a-l ..= a+r]`. Returns 1.0 if the window runs off either end of
    /// `seq` (§4.D.1 edge handling).
    pub fn bias_at(&self, seq: &TwoBitSeq, a: i64) -> f64 {
        let start = a - self.l;
        let end = a + self.r;
        if start < 0 || end as usize >= seq.len() {
            return 1.0;
        }
        let window: Vec<u8> = (start..=end)
            .map(|p| seq.get_kmer(1, p).expect("bounds checked above") as u8)
            .collect();
        self.score_window(&window)
    }
}
