//! Scores a genomic interval against a fitted model (§4.F Predict).

use crate::error::{Result, SeqbiasError};
use crate::fasta::FastaReference;
use crate::model::Model;
use crate::postable::Strand;
use crate::twobit::TwoBitSeq;

/// Scores every anchor in the 1-based inclusive interval `[start, end]` on
/// `seqname`, returning a vector of length `end - start + 1` in input
/// (5'→3' reference, i.e. left-to-right) order regardless of strand — the
/// reversal described in §4.F is applied internally so callers always read
/// position `start + i` at `result[i]`.
pub fn predict(
    model: &Model,
    fasta: &mut FastaReference,
    seqname: &str,
    start: i64,
    end: i64,
    strand: Strand,
) -> Result<Vec<f64>> {
    if start < 1 || end < start {
        return Err(SeqbiasError::InvalidInput(format!(
            "invalid interval [{start}, {end}]"
        )));
    }
    let motif = &model.motif;
    let (pad_left, pad_right) = match strand {
        Strand::Forward => (motif.l, motif.r),
        Strand::Reverse => (motif.r, motif.l),
    };

    let zb_start = start - 1;
    let fetch_start = zb_start - pad_left;
    let fetch_end = (end - 1) + pad_right;

    let chrom_len = fasta
        .sequence_length(seqname)
        .ok_or_else(|| SeqbiasError::UnknownChromosome(seqname.to_string()))? as i64;

    // Clamp the fetch to the chromosome; anchors whose window would have
    // needed bases outside [0, chrom_len) fall back to bias 1.0 via the
    // TwoBitSeq bounds check inside Motif::bias_at.
    let clamped_start = fetch_start.max(0);
    let clamped_end = fetch_end.min(chrom_len - 1);
    if clamped_start > clamped_end {
        return Ok(vec![1.0; (end - start + 1) as usize]);
    }

    let raw = fasta
        .fetch_seq(seqname, clamped_start as u64, clamped_end as u64)?
        .ok_or_else(|| SeqbiasError::UnknownChromosome(seqname.to_string()))?;

    let seq = match strand {
        Strand::Forward => TwoBitSeq::from_ascii(&raw),
        Strand::Reverse => TwoBitSeq::from_ascii(&raw).reverse_complement(),
    };

    // `seq` is indexed 0..len; anchor offset within it for genomic position
    // `p` is `p - clamped_start` on the + strand. On the - strand the
    // sequence was reverse-complemented, so genomic position `p` maps to
    // `clamped_end - p` in `seq`.
    let n = (end - start + 1) as usize;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let genomic_pos = zb_start + i as i64;
        let anchor = match strand {
            Strand::Forward => genomic_pos - clamped_start,
            Strand::Reverse => clamped_end - genomic_pos,
        };
        out.push(motif.bias_at(&seq, anchor));
    }

    if strand.is_reverse() {
        out.reverse();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motif::Motif;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_fasta(dir: &tempfile::TempDir, seq: &str) -> PathBuf {
        let path = dir.path().join("ref.fa");
        let mut f = File::create(&path).unwrap();
        writeln!(f, ">chr1").unwrap();
        writeln!(f, "{seq}").unwrap();
        drop(f);
        let fai = dir.path().join("ref.fa.fai");
        std::fs::write(&fai, format!("chr1\t{}\t6\t{}\t{}\n", seq.len(), seq.len(), seq.len() + 1))
            .unwrap();
        path
    }

    #[test]
    fn trivial_motif_yields_all_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fasta(&dir, &"ACGT".repeat(20));
        let mut fasta = FastaReference::open(&path).unwrap();
        let model = Model {
            motif: Motif::trivial(3, 2),
            ref_path: path.clone(),
        };
        let out = predict(&model, &mut fasta, "chr1", 10, 20, Strand::Forward).unwrap();
        assert_eq!(out.len(), 11);
        assert!(out.iter().all(|&v| (v - 1.0).abs() < 1e-9));
    }

    #[test]
    fn edge_interval_clamps_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fasta(&dir, &"ACGT".repeat(20));
        let mut fasta = FastaReference::open(&path).unwrap();
        let model = Model {
            motif: Motif::trivial(5, 0),
            ref_path: path.clone(),
        };
        // Starting at coordinate 1 with L=5: the first 5 anchors can't see
        // far enough left and fall back to 1.0 (trivial motif always does
        // anyway, but this also exercises the clamp path without panicking).
        let out = predict(&model, &mut fasta, "chr1", 1, 10, Strand::Forward).unwrap();
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|&v| (v - 1.0).abs() < 1e-9));
    }

    #[test]
    fn invalid_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fasta(&dir, "ACGT");
        let mut fasta = FastaReference::open(&path).unwrap();
        let model = Model {
            motif: Motif::trivial(1, 1),
            ref_path: path,
        };
        let err = predict(&model, &mut fasta, "chr1", 5, 2, Strand::Forward).unwrap_err();
        assert!(matches!(err, SeqbiasError::InvalidInput(_)));
    }
}
