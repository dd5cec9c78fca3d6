use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use seqbias::fasta::FastaReference;
use seqbias::model::Model;
use seqbias::motif::Motif;
use seqbias::postable::Strand;
use seqbias::predict::predict;

fn write_fasta(dir: &tempfile::TempDir, name: &str, seq: &str) -> PathBuf {
    let path = dir.path().join(format!("{name}.fa"));
    let mut f = File::create(&path).unwrap();
    writeln!(f, ">chr1").unwrap();
    writeln!(f, "{seq}").unwrap();
    drop(f);
    let fai = dir.path().join(format!("{name}.fa.fai"));
    std::fs::write(
        &fai,
        format!("chr1\t{}\t6\t{}\t{}\n", seq.len(), seq.len(), seq.len() + 1),
    )
    .unwrap();
    path
}

#[test]
fn trivial_model_returns_strictly_one_everywhere_interior() {
    let dir = tempfile::tempdir().unwrap();
    let seq = "ACGT".repeat(50);
    let path = write_fasta(&dir, "ref", &seq);
    let mut fasta = FastaReference::open(&path).unwrap();
    let model = Model {
        motif: Motif::trivial(5, 5),
        ref_path: path,
    };

    let out = predict(&model, &mut fasta, "chr1", 20, 80, Strand::Forward).unwrap();
    assert_eq!(out.len(), 61);
    assert!(out.iter().all(|&v| (v - 1.0).abs() < 1e-9));
}

#[test]
fn edge_of_chromosome_yields_one() {
    let dir = tempfile::tempdir().unwrap();
    let seq = "ACGT".repeat(10);
    let path = write_fasta(&dir, "ref", &seq);
    let mut fasta = FastaReference::open(&path).unwrap();
    let model = Model {
        motif: Motif::trivial(8, 0),
        ref_path: path,
    };

    // Anchors near coordinate 1 can't see 8 bases upstream.
    let out = predict(&model, &mut fasta, "chr1", 1, 5, Strand::Forward).unwrap();
    assert_eq!(out.len(), 5);
    assert!(out.iter().all(|&v| (v - 1.0).abs() < 1e-9));
}

#[test]
fn minus_strand_interval_is_the_reverse_of_the_plus_strand_on_a_palindrome() {
    let dir = tempfile::tempdir().unwrap();
    // A self-reverse-complementary region: ACGT repeated is not palindromic
    // as a whole string, but with a trivial (bias-blind) motif, +/- just
    // differ by vector order, which we check directly.
    let seq = "ACGTACGTACGTACGTACGTACGTACGT".to_string();
    let path = write_fasta(&dir, "ref", &seq);
    let mut fasta = FastaReference::open(&path).unwrap();
    let model = Model {
        motif: Motif::trivial(3, 3),
        ref_path: path,
    };

    let fwd = predict(&model, &mut fasta, "chr1", 10, 18, Strand::Forward).unwrap();
    let rev = predict(&model, &mut fasta, "chr1", 10, 18, Strand::Reverse).unwrap();
    assert_eq!(fwd, rev); // trivial motif: bias is 1.0 regardless of orientation
}

#[test]
fn unknown_chromosome_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fasta(&dir, "ref", "ACGTACGTACGT");
    let mut fasta = FastaReference::open(&path).unwrap();
    let model = Model {
        motif: Motif::trivial(1, 1),
        ref_path: path,
    };
    let err = predict(&model, &mut fasta, "chrX", 1, 5, Strand::Forward).unwrap_err();
    assert!(err.to_string().contains("chrX"));
}
