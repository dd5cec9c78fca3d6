use std::path::PathBuf;

use thiserror::Error;

/// Caller-visible error categories.
///
/// `InsufficientData` is deliberately *not* always fatal: [`crate::motif::learn::learn`]
/// returns a trivial (bias ≡ 1.0) motif instead of raising it, so pipelines that
/// bottom out here still get a usable model. It is part of this enum so CLI code
/// paths that *can* treat it as fatal (e.g. refusing to save an obviously broken
/// model without `--allow-trivial`) have a name to match on.
#[derive(Error, Debug)]
pub enum SeqbiasError {
    #[error("missing input: {path}: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    #[error("I/O failure reading {context}: {source}")]
    IoFailure {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sequence too short to extract k-mer of size {k} ending at position {pos} (len={len})")]
    ShortSequence { k: u32, pos: i64, len: usize },

    #[error("chromosome {0:?} not found in reference")]
    UnknownChromosome(String),
}

pub type Result<T> = std::result::Result<T, SeqbiasError>;
