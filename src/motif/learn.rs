//! Greedy per-position structure learning (§4.D.2).

use super::Motif;
use crate::kmer_matrix::KmerMatrix;

/// Parent-set search is bounded to keep the conditional tables small; these
/// match the spec's stated defaults.
pub const DEFAULT_MAX_PARENTS: usize = 4;
pub const DEFAULT_MAX_DISTANCE: usize = 10;

/// KL-divergence smoothing floor (§4.D.2 "Numeric floor"). Not persisted.
const KL_EPS: f64 = 1e-6;

/// Below this many usable windows (foreground or background), learning
/// bails out to a trivial, always-1.0 motif (§4.D.3 InsufficientData).
const MIN_WINDOWS: usize = 100;

/// Learns `P[.]` and conditional tables from windowed foreground/background
/// sequences. Each window must have the same length `n_w = l + 1 + r`, and
/// every base coded `0..4`.
///
/// Returns a trivial (bias ≡ 1.0) motif if either multiset has fewer than
/// 100 usable windows.
pub fn learn(
    foreground: &[Vec<u8>],
    background: &[Vec<u8>],
    l: i64,
    r: i64,
    complexity_penalty: f64,
    max_parents: usize,
    max_distance: usize,
) -> Motif {
    let n_w = (l + 1 + r) as usize;
    if foreground.len() < MIN_WINDOWS || background.len() < MIN_WINDOWS {
        return Motif::trivial(l, r);
    }
    for w in foreground.iter().chain(background.iter()) {
        debug_assert_eq!(w.len(), n_w, "window length must equal l+1+r");
    }

    let mut parents: Vec<Vec<usize>> = vec![Vec::new(); n_w];
    let mut fg_tables: Vec<Vec<f64>> = Vec::with_capacity(n_w);
    let mut bg_tables: Vec<Vec<f64>> = Vec::with_capacity(n_w);

    for i in 0..n_w {
        let chosen = select_parents(
            foreground,
            background,
            i,
            max_parents,
            max_distance,
            complexity_penalty,
        );
        let counts_f = parent_joint_counts(foreground, i, &chosen);
        let counts_b = parent_joint_counts(background, i, &chosen);

        fg_tables.push(counts_f.make_distribution().to_flat_vec());
        bg_tables.push(counts_b.make_distribution().to_flat_vec());
        parents[i] = chosen;
    }

    Motif {
        l,
        r,
        parents,
        fg_tables,
        bg_tables,
        trivial: false,
    }
}

/// Greedily grows `P[i]`, accepting the candidate parent that most improves
/// the discrimination score net of the complexity penalty, until no
/// candidate clears the penalty or `max_parents` is reached.
fn select_parents(
    foreground: &[Vec<u8>],
    background: &[Vec<u8>],
    i: usize,
    max_parents: usize,
    max_distance: usize,
    complexity_penalty: f64,
) -> Vec<usize> {
    let mut chosen: Vec<usize> = Vec::new();
    let mut current_score = discrimination_score(foreground, background, i, &chosen);

    loop {
        if chosen.len() >= max_parents {
            break;
        }

        // Candidates: earlier positions (keeps the parent graph acyclic)
        // within max_distance, not already chosen. Iterate in tie-break
        // order (smaller |i-j|, then smaller j) so the first strict
        // improvement found is the preferred one.
        let mut candidates: Vec<usize> = (0..i)
            .filter(|&j| i - j <= max_distance && !chosen.contains(&j))
            .collect();
        candidates.sort_by_key(|&j| (i - j, j));

        let param_cost = complexity_penalty
            * (4f64.powi((chosen.len() + 1) as i32) - 4f64.powi(chosen.len() as i32));

        let mut best: Option<(usize, f64, f64)> = None; // (j, new_score, improvement)
        for j in candidates {
            let mut trial = chosen.clone();
            trial.push(j);
            let new_score = discrimination_score(foreground, background, i, &trial);
            let improvement = (new_score - current_score) - param_cost;
            if improvement > 0.0 {
                if let Some((_, _, best_improvement)) = best {
                    if improvement > best_improvement {
                        best = Some((j, new_score, improvement));
                    }
                } else {
                    best = Some((j, new_score, improvement));
                }
            }
        }

        match best {
            Some((j, new_score, _)) => {
                chosen.push(j);
                current_score = new_score;
            }
            None => break,
        }
    }

    chosen
}

/// Expected symmetric-KL divergence between the foreground and background
/// conditional distributions of position `i` given `parents`, weighted by
/// each parent-assignment's share of the combined training data.
fn discrimination_score(
    foreground: &[Vec<u8>],
    background: &[Vec<u8>],
    i: usize,
    parents: &[usize],
) -> f64 {
    let counts_f = parent_joint_counts(foreground, i, parents);
    let counts_b = parent_joint_counts(background, i, parents);
    let n_rows = counts_f.n_rows();

    let total: f64 = (0..n_rows)
        .map(|g| row_sum(&counts_f, g) + row_sum(&counts_b, g))
        .sum();
    if total == 0.0 {
        return 0.0;
    }

    let mut score = 0.0;
    for g in 0..n_rows {
        let group_f = row_sum(&counts_f, g);
        let group_b = row_sum(&counts_b, g);
        let weight = (group_f + group_b) / total;
        if weight == 0.0 {
            continue;
        }
        let p = normalize4(&row_codes(&counts_f, g));
        let q = normalize4(&row_codes(&counts_b, g));
        score += weight * symmetric_kl(&p, &q);
    }
    score
}

fn normalize4(counts: &[f64]) -> [f64; 4] {
    let sum: f64 = counts.iter().sum();
    let mut out = [0.0; 4];
    if sum > 0.0 {
        for k in 0..4 {
            out[k] = counts[k] / sum;
        }
    }
    out
}

/// `KL(P||Q) + KL(Q||P)`, with `ε` smoothing to avoid `0 * log(0)` /
/// infinite divergence (§4.D.2 "Numeric floor").
fn symmetric_kl(p: &[f64; 4], q: &[f64; 4]) -> f64 {
    let kl = |a: &[f64; 4], b: &[f64; 4]| -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(&ai, &bi)| {
                let ai = ai + KL_EPS;
                let bi = bi + KL_EPS;
                ai * (ai / bi).ln()
            })
            .sum()
    };
    kl(p, q) + kl(q, p)
}

/// Tallies, for position `i` given `parents`, how many windows realize each
/// (parent joint value, child value) pair: one [`KmerMatrix`] row per parent
/// joint value (`4^|parents|` rows), one column per child base (`k = 1`).
/// `KmerMatrix::make_distribution` on the result yields `P(child | parents)`
/// directly, row-major-flattened to match [`super::Motif::table_index`]'s
/// child-least-significant convention.
fn parent_joint_counts(windows: &[Vec<u8>], i: usize, parents: &[usize]) -> KmerMatrix {
    let n_rows = 4usize.pow(parents.len() as u32);
    let mut m = KmerMatrix::new(n_rows, 1);
    for w in windows {
        let mut row = 0usize;
        for (t, &p) in parents.iter().enumerate() {
            row |= (w[p] as usize) << (2 * t);
        }
        m.add_at(row, w[i] as u64, 1.0);
    }
    m
}

/// Raw counts across row `g`'s 4 child values.
fn row_codes(m: &KmerMatrix, g: usize) -> [f64; 4] {
    [m.get(g, 0), m.get(g, 1), m.get(g, 2), m.get(g, 3)]
}

fn row_sum(m: &KmerMatrix, g: usize) -> f64 {
    row_codes(m, g).iter().sum()
}
