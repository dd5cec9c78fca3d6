//! Thin wrapper around an indexed FASTA reference, matching the
//! `bio::io::fasta::IndexedReader` usage seen throughout the example corpus's
//! genomics tools (fetch a region, read into a buffer, lower-case on entry).

use std::fs::File;
use std::io::Read as _;
use std::path::Path;

use bio::io::fasta::IndexedReader;

use crate::error::{Result, SeqbiasError};

/// Wraps a `.fai`-backed FASTA reader. Holds the file handle open for the
/// lifetime of a `build` / `predict` / `count_reads` call (§5 Resources).
pub struct FastaReference {
    reader: IndexedReader<File>,
    lengths: Vec<(String, u64)>,
}

impl FastaReference {
    /// Opens `path`, requiring a `<path>.fai` index alongside it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = IndexedReader::from_file(&path).map_err(|e| SeqbiasError::MissingInput {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        })?;
        let lengths = reader
            .index
            .sequences()
            .iter()
            .map(|s| (s.name.clone(), s.len))
            .collect();
        Ok(FastaReference { reader, lengths })
    }

    /// Sequence names and lengths, in index order.
    pub fn sequence_lengths(&self) -> &[(String, u64)] {
        &self.lengths
    }

    pub fn sequence_length(&self, name: &str) -> Option<u64> {
        self.lengths
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, len)| *len)
    }

    /// Fetches the inclusive, 0-based range `[start, end]` on `name`,
    /// lower-cased. Returns `None` if the name is unknown or the range is
    /// out of bounds; on a read error, propagates an `IoFailure`.
    pub fn fetch_seq(&mut self, name: &str, start: u64, end: u64) -> Result<Option<String>> {
        let len = match self.sequence_length(name) {
            Some(len) => len,
            None => return Ok(None),
        };
        if start > end || end >= len {
            return Ok(None);
        }
        self.reader
            .fetch(name, start, end + 1)
            .map_err(|e| SeqbiasError::IoFailure {
                context: format!("fetching {name}:{start}-{end}"),
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            })?;
        let mut seq = Vec::new();
        self.reader
            .read(&mut seq)
            .map_err(|e| SeqbiasError::IoFailure {
                context: format!("reading {name}:{start}-{end}"),
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            })?;
        seq.make_ascii_lowercase();
        Ok(Some(String::from_utf8_lossy(&seq).into_owned()))
    }
}
