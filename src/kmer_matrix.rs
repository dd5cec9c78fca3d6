//! Dense `(window position) x (kmer value)` frequency table with the handful
//! of normalization / conditional-marginalization operations the motif
//! learner needs.

use ndarray::Array2;

/// A `n_rows x 4^k` table of nonnegative doubles. Each row is independently
/// either raw counts (during tallying) or a probability distribution (after
/// [`KmerMatrix::make_distribution`]).
#[derive(Debug, Clone, PartialEq)]
pub struct KmerMatrix {
    data: Array2<f64>,
    /// Number of base slots encoded per column index (ncols == 4^k).
    k: u32,
}

#[inline]
fn slot_value(code: u64, slot: u32) -> u64 {
    (code >> (2 * slot)) & 0b11
}

#[inline]
fn remove_slot(code: u64, slot: u32) -> u64 {
    let low_mask = (1u64 << (2 * slot)) - 1;
    let low = code & low_mask;
    let high = code >> (2 * (slot + 1));
    (high << (2 * slot)) | low
}

impl KmerMatrix {
    /// Builds a zero-filled matrix with `n_rows` rows and `4^k` columns.
    pub fn new(n_rows: usize, k: u32) -> Self {
        let ncols = 4usize.pow(k);
        KmerMatrix {
            data: Array2::zeros((n_rows, ncols)),
            k,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn n_cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn set_all(&mut self, v: f64) {
        self.data.fill(v);
    }

    pub fn get(&self, i: usize, kmer: u64) -> f64 {
        self.data[(i, kmer as usize)]
    }

    pub fn set(&mut self, i: usize, kmer: u64, v: f64) {
        self.data[(i, kmer as usize)] = v;
    }

    pub fn add_at(&mut self, i: usize, kmer: u64, delta: f64) {
        self.data[(i, kmer as usize)] += delta;
    }

    /// In-place elementwise addition; panics if shapes differ.
    pub fn add_assign(&mut self, other: &KmerMatrix) {
        assert_eq!(self.data.dim(), other.data.dim(), "KmerMatrix shape mismatch");
        self.data += &other.data;
    }

    /// Row-normalizes every row to sum to 1. Rows that sum to zero are left
    /// all-zero (no NaNs).
    pub fn make_distribution(&self) -> KmerMatrix {
        let mut out = self.clone();
        for mut row in out.data.rows_mut() {
            let sum: f64 = row.sum();
            if sum > 0.0 {
                row.mapv_inplace(|v| v / sum);
            }
        }
        out
    }

    /// Reinterprets each row as `P(all slots | slot = over_j)`: columns are
    /// grouped by their value at `over_j`, summed within each group, and each
    /// entry is divided by its group's sum (zero if the group sums to zero).
    pub fn dist_conditionalize(&self, over_j: u32) -> KmerMatrix {
        assert!(over_j < self.k, "over_j out of range for k={}", self.k);
        let mut out = self.clone();
        let ncols = self.n_cols();
        for mut row in out.data.rows_mut() {
            let mut group_sums = [0.0f64; 4];
            for col in 0..ncols {
                let g = slot_value(col as u64, over_j) as usize;
                group_sums[g] += row[col];
            }
            for col in 0..ncols {
                let g = slot_value(col as u64, over_j) as usize;
                if group_sums[g] > 0.0 {
                    row[col] /= group_sums[g];
                } else {
                    row[col] = 0.0;
                }
            }
        }
        out
    }

    /// Collapses one kmer slot, summing the 4 kmers that differ only at that
    /// slot. Reduces `k` by 1.
    pub fn dist_marginalize(&self, slot: u32) -> KmerMatrix {
        assert!(slot < self.k, "slot out of range for k={}", self.k);
        let new_k = self.k - 1;
        let mut out = KmerMatrix::new(self.n_rows(), new_k);
        let ncols = self.n_cols();
        for row_idx in 0..self.n_rows() {
            for col in 0..ncols {
                let new_col = remove_slot(col as u64, slot);
                out.add_at(row_idx, new_col, self.data[(row_idx, col)]);
            }
        }
        out
    }

    /// Row-major flattening: `get(i, j)` lands at index `i * n_cols() + j`.
    /// Used to hand a matrix's contents to callers that store it as a flat
    /// buffer (e.g. a motif position's conditional table).
    pub fn to_flat_vec(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Elementwise-approximate equality, used by round-trip tests.
    pub fn approx_eq(&self, other: &KmerMatrix, eps: f64) -> bool {
        if self.data.dim() != other.data.dim() {
            return false;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_distribution_normalizes_rows() {
        let mut m = KmerMatrix::new(2, 1); // k=1 -> 4 columns
        m.set(0, 0, 1.0);
        m.set(0, 1, 1.0);
        m.set(0, 2, 2.0);
        // row 1 left all-zero
        let d = m.make_distribution();
        assert!((d.get(0, 0) - 0.25).abs() < 1e-12);
        assert!((d.get(0, 2) - 0.5).abs() < 1e-12);
        assert_eq!(d.get(1, 0), 0.0);
    }

    #[test]
    fn make_distribution_is_idempotent() {
        let mut m = KmerMatrix::new(3, 2);
        m.set(0, 0, 3.0);
        m.set(0, 5, 1.0);
        m.set(1, 2, 7.0);
        let once = m.make_distribution();
        let twice = once.make_distribution();
        assert!(once.approx_eq(&twice, 1e-12));
    }

    #[test]
    fn dist_marginalize_reduces_k_and_sums() {
        // k=2 (16 columns), collapse slot 0 (least significant digit)
        let mut m = KmerMatrix::new(1, 2);
        // codes 0b0000 (0) and 0b0001 (1) differ only at slot 0 -> both collapse to new_col 0
        m.set(0, 0, 2.0);
        m.set(0, 1, 3.0);
        m.set(0, 2, 10.0); // slot0=2 -> same new_col 0 too
        m.set(0, 3, 0.0);
        let collapsed = m.dist_marginalize(0);
        assert_eq!(collapsed.k(), 1);
        assert_eq!(collapsed.n_cols(), 4);
        assert!((collapsed.get(0, 0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn dist_conditionalize_normalizes_within_class() {
        // k=1, condition on slot 0 (the only slot) -> each class has 1 column, self-normalizes to 1
        let mut m = KmerMatrix::new(1, 1);
        m.set(0, 0, 4.0);
        m.set(0, 1, 0.0);
        m.set(0, 2, 9.0);
        m.set(0, 3, 1.0);
        let c = m.dist_conditionalize(0);
        assert!((c.get(0, 0) - 1.0).abs() < 1e-12);
        assert_eq!(c.get(0, 1), 0.0); // zero group stays zero, no NaN
        assert!((c.get(0, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn dist_conditionalize_two_slot_groups() {
        // k=2: slot0 is least significant digit. Condition on slot 1 (high digit).
        // Columns 0..3 have slot1=0 (child codes 0), columns 4..7 have slot1=1, etc.
        let mut m = KmerMatrix::new(1, 2);
        for col in 0..4u64 {
            m.set(0, col, 1.0); // group slot1=0 sums to 4
        }
        for col in 4..8u64 {
            m.set(0, col, 3.0); // group slot1=1 sums to 12
        }
        let c = m.dist_conditionalize(1);
        assert!((c.get(0, 0) - 0.25).abs() < 1e-12);
        assert!((c.get(0, 4) - 0.25).abs() < 1e-12);
    }

    #[test]
    #[should_panic]
    fn add_assign_panics_on_shape_mismatch() {
        let mut a = KmerMatrix::new(2, 1);
        let b = KmerMatrix::new(3, 1);
        a.add_assign(&b);
    }

    #[test]
    fn to_flat_vec_is_row_major() {
        let mut m = KmerMatrix::new(2, 1);
        m.set(0, 0, 1.0);
        m.set(0, 3, 2.0);
        m.set(1, 1, 3.0);
        assert_eq!(m.to_flat_vec(), vec![1.0, 0.0, 0.0, 2.0, 0.0, 3.0, 0.0, 0.0]);
    }
}
