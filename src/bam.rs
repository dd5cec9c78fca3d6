//! BAM ingestion and region-based read counting, built on `rust_htslib::bam`
//! the way the teacher's `reference::read` module and the example corpus's
//! `preprocess_bam`-style scans use it.

use std::path::Path;

use rust_htslib::bam::{self, record::Cigar, IndexedReader, Read as BamRead, Reader};

use crate::error::{Result, SeqbiasError};
use crate::postable::{PosTable, Strand};

fn io_err(context: &str, e: impl std::fmt::Display) -> SeqbiasError {
    SeqbiasError::IoFailure {
        context: context.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    }
}

/// True iff `rec` is a primary, single-block alignment: the reference-facing
/// test for "cigar_block_count == 1" from §6, i.e. the read aligns as one
/// contiguous run with no indels or clipping.
fn is_primary_single_block(rec: &bam::Record) -> bool {
    if rec.is_unmapped() || rec.is_secondary() || rec.is_supplementary() {
        return false;
    }
    let cigar = rec.cigar();
    cigar.len() == 1 && matches!(cigar[0], Cigar::Match(_) | Cigar::Equal(_))
}

/// Strand-aware 5' genomic position: leftmost aligned base on `+`, rightmost
/// on `-` (§3 PosTable).
fn read_start_pos(rec: &bam::Record) -> (i64, Strand) {
    if rec.is_reverse() {
        (rec.reference_end() - 1, Strand::Reverse)
    } else {
        (rec.reference_start(), Strand::Forward)
    }
}

/// Scans an entire coordinate-sorted BAM, ingesting every primary,
/// single-block alignment into a fresh [`PosTable`] (§4.E step 1).
pub fn ingest_pos_table<P: AsRef<Path>>(bam_path: P) -> Result<PosTable> {
    let bam_path = bam_path.as_ref();
    let mut reader = Reader::from_path(bam_path).map_err(|e| SeqbiasError::MissingInput {
        path: bam_path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
    })?;
    let seq_names: Vec<String> = reader
        .header()
        .target_names()
        .iter()
        .map(|n| String::from_utf8_lossy(n).into_owned())
        .collect();

    let mut table = PosTable::new();
    table.set_seq_names(seq_names);

    let mut record = bam::Record::new();
    loop {
        match reader.read(&mut record) {
            Some(Ok(())) => {
                if !is_primary_single_block(&record) {
                    continue;
                }
                let tid = record.tid();
                if tid < 0 {
                    continue;
                }
                let (pos, strand) = read_start_pos(&record);
                table.insert(tid as u32, pos, strand);
            }
            Some(Err(e)) => {
                log::debug!("skipping unreadable BAM record: {e}");
            }
            None => break,
        }
    }
    Ok(table)
}

/// Counts reads whose strand-aware 5' position falls inside `[start, end]`
/// (1-based inclusive, matching the predict/CLI interval convention) on
/// `seqname`, restricted to `strand` if given. Per position, the raw count
/// is the number of ingested reads; `binary` collapses any nonzero count to
/// 1. Bias-correction is applied by the caller: pass `bias_at_one_based`
/// (typically backed by a [`crate::predict::predict`] vector) to divide each
/// contributing read's weight by the motif's bias at its 5′ position, or
/// `None` for raw counts (§6 `count_reads`).
pub fn count_reads(
    bam_path: impl AsRef<Path>,
    seqname: &str,
    start: i64,
    end: i64,
    strand: Option<Strand>,
    bias_at_one_based: Option<&dyn Fn(i64) -> f64>,
    binary: bool,
    sum_counts: bool,
) -> Result<CountResult> {
    if start < 1 || end < start {
        return Err(SeqbiasError::InvalidInput(format!(
            "invalid interval [{start}, {end}]"
        )));
    }
    let bam_path = bam_path.as_ref();
    let mut reader =
        IndexedReader::from_path(bam_path).map_err(|e| SeqbiasError::MissingInput {
            path: bam_path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        })?;
    let tid = reader
        .header()
        .tid(seqname.as_bytes())
        .ok_or_else(|| SeqbiasError::UnknownChromosome(seqname.to_string()))?;

    let zb_start = (start - 1) as u64;
    let zb_end = end as u64;
    reader
        .fetch((tid, zb_start, zb_end))
        .map_err(|e| io_err(&format!("fetching {seqname}:{start}-{end}"), e))?;

    let n = (end - start + 1) as usize;
    let mut counts = vec![0.0f64; n];
    let mut record = bam::Record::new();
    loop {
        match reader.read(&mut record) {
            Some(Ok(())) => {
                if !is_primary_single_block(&record) {
                    continue;
                }
                let (pos, read_strand) = read_start_pos(&record);
                if let Some(want) = strand {
                    if read_strand != want {
                        continue;
                    }
                }
                let one_based = pos + 1;
                if one_based < start || one_based > end {
                    continue;
                }
                let idx = (one_based - start) as usize;
                let weight = match bias_at_one_based {
                    Some(bias_fn) => {
                        let bias = bias_fn(one_based);
                        if bias > 0.0 {
                            1.0 / bias
                        } else {
                            1.0
                        }
                    }
                    None => 1.0,
                };
                counts[idx] += weight;
            }
            Some(Err(e)) => log::debug!("skipping unreadable BAM record: {e}"),
            None => break,
        }
    }

    if binary {
        for c in counts.iter_mut() {
            *c = if *c > 0.0 { 1.0 } else { 0.0 };
        }
    }

    if sum_counts {
        Ok(CountResult::Scalar(counts.iter().sum()))
    } else {
        Ok(CountResult::Vector(counts))
    }
}

pub enum CountResult {
    Vector(Vec<f64>),
    Scalar(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_interval_is_rejected_before_opening_bam() {
        let err =
            count_reads("/nonexistent.bam", "chr1", 10, 5, None, None, false, false).unwrap_err();
        assert!(matches!(err, SeqbiasError::InvalidInput(_)));
    }
}
