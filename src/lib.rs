//! Per-position sequence composition bias estimation and correction for
//! aligned short reads.

pub mod bam;
pub mod cli;
pub mod error;
pub mod fasta;
pub mod kmer_matrix;
pub mod model;
pub mod motif;
pub mod postable;
pub mod predict;
pub mod rng;
pub mod train;
pub mod twobit;
