//! Orchestrates PosTable ingestion, foreground/background window extraction,
//! and the handoff to [`crate::motif::learn`] (§4.E Trainer / `build`).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::bam;
use crate::error::{Result, SeqbiasError};
use crate::fasta::FastaReference;
use crate::model::Model;
use crate::motif::learn::{self, DEFAULT_MAX_DISTANCE, DEFAULT_MAX_PARENTS};
use crate::postable::{PosTable, ReadPos, Strand};
use crate::rng::{build_rng, sample_bg_offset, MAX_BG_RETRIES};

/// Caps how many records [`PosTable::dump`] ever hands to the trainer,
/// matching the reference implementation's bound (§4.C).
pub const MAX_DUMP: usize = 10_000_000;

/// Number of background windows sampled per foreground read (§4.E step 3).
const BG_SAMPLES_PER_READ: usize = 2;

/// Below this foreground-set size the trainer halves overfitting risk by
/// overriding the caller's complexity penalty (§4.D.2).
const SMALL_TRAINING_SET_THRESHOLD: usize = 10_000;
const SMALL_TRAINING_SET_PENALTY: f64 = 0.25;

pub struct FitParams {
    pub max_reads: usize,
    pub l: i64,
    pub r: i64,
    pub complexity_penalty: Option<f64>,
    pub seed: Option<u64>,
}

/// Trains a model from a BAM and an indexed FASTA reference (§4.E).
pub fn fit(
    ref_path: impl Into<std::path::PathBuf>,
    bam_path: impl AsRef<std::path::Path>,
    params: FitParams,
) -> Result<Model> {
    if params.l < 0 || params.r < 0 {
        return Err(SeqbiasError::InvalidInput(
            "L and R must be nonnegative".into(),
        ));
    }
    let ref_path = ref_path.into();
    let mut fasta = FastaReference::open(&ref_path)?;
    let table = bam::ingest_pos_table(bam_path)?;
    let model = fit_from_table(&mut fasta, &table, ref_path, params)?;
    Ok(model)
}

/// Same as [`fit`], but takes an already-populated [`PosTable`] (e.g. built
/// incrementally, or reused across multiple fits).
pub fn fit_from_table(
    fasta: &mut FastaReference,
    table: &PosTable,
    ref_path: std::path::PathBuf,
    params: FitParams,
) -> Result<Model> {
    let mut rng = build_rng(params.seed);
    let mut records = table.dump(Some(MAX_DUMP));
    records.shuffle(&mut rng);
    records.sort_by(ReadPos::cmp_by_tid);
    records.truncate(params.max_reads.min(records.len()));

    let n_w = (params.l + 1 + params.r) as usize;
    let mut foreground: Vec<Vec<u8>> = Vec::new();
    let mut background: Vec<Vec<u8>> = Vec::new();

    let mut current_tid: Option<u32> = None;
    let mut chrom_seq: Option<String> = None;

    for rec in &records {
        if current_tid != Some(rec.tid) {
            current_tid = Some(rec.tid);
            chrom_seq = load_chromosome(fasta, table, rec.tid);
        }
        let Some(seq) = chrom_seq.as_deref() else {
            continue;
        };

        if let Some(window) = extract_window(seq, rec.pos, rec.strand, params.l, params.r) {
            foreground.push(window);
        } else {
            continue;
        }

        let mut collected = 0;
        let mut attempts = 0;
        while collected < BG_SAMPLES_PER_READ && attempts < MAX_BG_RETRIES {
            attempts += 1;
            let offset = sample_bg_offset(&mut rng);
            let bg_pos = rec.pos + offset;
            if bg_pos < 0 {
                continue;
            }
            if let Some(window) = extract_window(seq, bg_pos, rec.strand, params.l, params.r) {
                background.push(window);
                collected += 1;
            }
        }
    }

    debug_assert!(foreground.iter().all(|w| w.len() == n_w));
    debug_assert!(background.iter().all(|w| w.len() == n_w));

    // The trainer overrides whatever penalty the caller supplied once the
    // foreground set is small enough that overfitting is a real risk.
    let complexity_penalty = if foreground.len() < SMALL_TRAINING_SET_THRESHOLD {
        SMALL_TRAINING_SET_PENALTY
    } else {
        params.complexity_penalty.unwrap_or(SMALL_TRAINING_SET_PENALTY)
    };

    if foreground.len() < 100 || background.len() < 100 {
        log::warn!(
            "insufficient training data ({} foreground, {} background windows); falling back to a trivial model",
            foreground.len(),
            background.len()
        );
    }

    let motif = learn::learn(
        &foreground,
        &background,
        params.l,
        params.r,
        complexity_penalty,
        DEFAULT_MAX_PARENTS,
        DEFAULT_MAX_DISTANCE,
    );

    Ok(Model { motif, ref_path })
}

/// Fetches and lower-cases an entire chromosome, logging (once per call) on
/// failure rather than aborting the whole fit (§4.E step 3a, §7 policy).
fn load_chromosome(fasta: &mut FastaReference, table: &PosTable, tid: u32) -> Option<String> {
    let name = table.seq_name(tid)?;
    let len = fasta.sequence_length(name)?;
    match fasta.fetch_seq(name, 0, len - 1) {
        Ok(Some(seq)) => Some(seq),
        Ok(None) => {
            log::warn!("chromosome {name:?} not found in reference, skipping its reads");
            None
        }
        Err(e) => {
            log::warn!("failed to fetch chromosome {name:?}: {e}, skipping its reads");
            None
        }
    }
}

/// Extracts the `l + 1 + r`-length window of base codes anchored at `pos`,
/// reverse-complemented on the minus strand (§4.E step 3b). Returns `None`
/// if the window runs off either end of `seq` or contains an `N`.
fn extract_window(seq: &str, pos: i64, strand: Strand, l: i64, r: i64) -> Option<Vec<u8>> {
    let (start, end) = match strand {
        Strand::Forward => (pos - l, pos + r),
        Strand::Reverse => (pos - r, pos + l),
    };
    if start < 0 || end as usize >= seq.len() {
        return None;
    }
    let substr = &seq[start as usize..=end as usize];
    if substr.as_bytes().iter().any(|&b| b == b'n' || b == b'N') {
        return None;
    }
    let packed = crate::twobit::TwoBitSeq::from_ascii(substr);
    let codes = packed.codes();
    Some(match strand {
        Strand::Forward => codes,
        Strand::Reverse => codes.into_iter().rev().map(|c| 3 - c).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_window_rejects_n_and_bounds() {
        let seq = "acgtacgtNNacgt";
        assert!(extract_window(seq, 2, Strand::Forward, 1, 1).is_some());
        assert!(extract_window(seq, 8, Strand::Forward, 1, 1).is_none()); // hits N
        assert!(extract_window(seq, 0, Strand::Forward, 5, 0).is_none()); // out of bounds left
    }

    #[test]
    fn extract_window_reverse_complements_on_minus_strand() {
        let seq = "acgtacgt";
        let fwd = extract_window(seq, 3, Strand::Forward, 1, 1).unwrap();
        let rev = extract_window(seq, 3, Strand::Reverse, 1, 1).unwrap();
        // reverse strand window spans [pos-r, pos+l] = same interval here (l=r=1),
        // then reverse-complemented.
        let expected: Vec<u8> = fwd.into_iter().rev().map(|c| 3 - c).collect();
        assert_eq!(rev, expected);
    }

    #[test]
    fn invalid_l_or_r_is_rejected() {
        let params = FitParams {
            max_reads: 10,
            l: -1,
            r: 0,
            complexity_penalty: None,
            seed: Some(1),
        };
        let err = fit("ref.fa", "reads.bam", params).unwrap_err();
        assert!(matches!(err, SeqbiasError::InvalidInput(_)));
    }
}
