//! Command-line surface: `fit`, `predict`, `count-reads` subcommands over the
//! library's `train`/`predict`/`bam`/`model` modules, mirroring the teacher's
//! `clap` derive conventions (`#[derive(Parser)]`, `help_heading`s).

pub mod opts;

use clap::{Parser, Subcommand};

use self::opts::{CountReadsArgs, FitArgs, PredictArgs};

#[derive(Parser)]
#[command(
    name = "seqbias",
    about = "Estimate and correct per-position sequence composition bias in aligned short reads",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit a bias model from a BAM and its reference FASTA
    Fit(FitArgs),
    /// Score a genomic interval against a fitted model
    Predict(PredictArgs),
    /// Count reads in an interval, optionally bias-corrected
    CountReads(CountReadsArgs),
}
