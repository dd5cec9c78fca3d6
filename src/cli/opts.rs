use std::path::PathBuf;

use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StrandArg {
    #[value(name = "+")]
    Plus,
    #[value(name = "-")]
    Minus,
}

impl StrandArg {
    pub fn to_strand(self) -> crate::postable::Strand {
        match self {
            StrandArg::Plus => crate::postable::Strand::Forward,
            StrandArg::Minus => crate::postable::Strand::Reverse,
        }
    }
}

#[derive(Debug, Args)]
pub struct FitArgs {
    /// Indexed FASTA reference the BAM was aligned against [path]
    #[clap(long, value_parser, required = true, help_heading = "Core")]
    pub ref_fasta: PathBuf,

    /// Coordinate-sorted, indexed BAM of aligned reads [path]
    #[clap(long, value_parser, required = true, help_heading = "Core")]
    pub bam: PathBuf,

    /// Destination for the fitted model (YAML) [path]
    #[clap(long, value_parser, required = true, help_heading = "Core")]
    pub output: PathBuf,

    /// Maximum number of read-start records to train on [integer]
    #[clap(long, default_value = "1000000", help_heading = "Core")]
    pub max_reads: usize,

    /// Bases upstream of the read start to include in the window [integer]
    #[clap(short = 'L', long, default_value = "8", help_heading = "Core")]
    pub l: i64,

    /// Bases downstream of the read start to include in the window [integer]
    #[clap(short = 'R', long, default_value = "12", help_heading = "Core")]
    pub r: i64,

    /// Per-parameter penalty charged during structure learning [float]
    #[clap(long, help_heading = "Core")]
    pub complexity_penalty: Option<f64>,

    /// Seed the trainer's RNG for reproducible fits [integer]
    #[clap(long, help_heading = "Core")]
    pub seed: Option<u64>,

    /// Number of threads to use. The trainer's chromosome scan is
    /// single-threaded internally; accepted for forward compatibility.
    #[clap(short = 't', long = "n-threads", default_value = "1", help_heading = "Core")]
    pub n_threads: usize,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// Fitted model file (YAML) [path]
    #[clap(long, value_parser, required = true, help_heading = "Core")]
    pub model: PathBuf,

    /// Indexed FASTA reference to score against [path]
    #[clap(long, value_parser, required = true, help_heading = "Core")]
    pub ref_fasta: PathBuf,

    /// Reference sequence name
    #[clap(long, required = true, help_heading = "Core")]
    pub seqname: String,

    /// 1-based inclusive interval start [integer]
    #[clap(long, required = true, help_heading = "Core")]
    pub start: i64,

    /// 1-based inclusive interval end [integer]
    #[clap(long, required = true, help_heading = "Core")]
    pub end: i64,

    /// Strand to predict on
    #[clap(long, value_enum, default_value = "+", help_heading = "Core")]
    pub strand: StrandArg,

    /// Write TSV output here instead of stdout [path]
    #[clap(long, value_parser, help_heading = "Core")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CountReadsArgs {
    /// Indexed BAM to count reads from [path]
    #[clap(long, value_parser, required = true, help_heading = "Core")]
    pub bam: PathBuf,

    /// Reference sequence name
    #[clap(long, required = true, help_heading = "Core")]
    pub seqname: String,

    /// 1-based inclusive interval start [integer]
    #[clap(long, required = true, help_heading = "Core")]
    pub start: i64,

    /// 1-based inclusive interval end [integer]
    #[clap(long, required = true, help_heading = "Core")]
    pub end: i64,

    /// Restrict to one strand (default: both)
    #[clap(long, value_enum, help_heading = "Core")]
    pub strand: Option<StrandArg>,

    /// Bias-correction model; requires `--ref-fasta` [path]
    #[clap(long, value_parser, requires = "ref_fasta", help_heading = "Bias correction")]
    pub model: Option<PathBuf>,

    /// FASTA reference backing `--model`'s bias correction [path]
    #[clap(long, value_parser, help_heading = "Bias correction")]
    pub ref_fasta: Option<PathBuf>,

    /// Collapse each position's count to 0/1 [flag]
    #[clap(long, help_heading = "Core")]
    pub binary: bool,

    /// Report one summed total instead of a per-position vector [flag]
    #[clap(long, help_heading = "Core")]
    pub sum_counts: bool,
}
