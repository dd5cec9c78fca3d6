//! Aggregates alignments into `(chromosome, position, strand) -> count` records.

use fxhash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn is_reverse(&self) -> bool {
        matches!(self, Strand::Reverse)
    }

    pub fn from_char(c: char) -> Option<Strand> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// A single aggregated read-start record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPos {
    pub tid: u32,
    pub pos: i64,
    pub strand: Strand,
    pub count: u32,
}

impl ReadPos {
    /// Comparator: ascending by `tid`.
    pub fn cmp_by_tid(a: &ReadPos, b: &ReadPos) -> std::cmp::Ordering {
        a.tid.cmp(&b.tid)
    }

    /// Comparator: descending by `count`.
    pub fn cmp_by_count_desc(a: &ReadPos, b: &ReadPos) -> std::cmp::Ordering {
        b.count.cmp(&a.count)
    }
}

/// Hash table of 5' read-start positions, keyed by `(tid, pos, strand)`.
///
/// Grows during ingest; treat as read-only once [`PosTable::dump`] has been
/// called for the final time — there is no internal invariant enforcing
/// this, it is purely a usage convention (see §3 Lifecycles).
#[derive(Debug, Default)]
pub struct PosTable {
    counts: FxHashMap<(u32, i64, Strand), u32>,
    seq_names: Vec<String>,
}

impl PosTable {
    pub fn new() -> Self {
        PosTable::default()
    }

    /// Registers reference sequence names, indexed by `tid`. Typically
    /// called once from the BAM header before ingest begins.
    pub fn set_seq_names(&mut self, names: Vec<String>) {
        self.seq_names = names;
    }

    pub fn seq_name(&self, tid: u32) -> Option<&str> {
        self.seq_names.get(tid as usize).map(String::as_str)
    }

    pub fn seq_names(&self) -> &[String] {
        &self.seq_names
    }

    /// Increments the counter for `(tid, pos, strand)`, creating it on first
    /// insertion.
    pub fn insert(&mut self, tid: u32, pos: i64, strand: Strand) {
        *self.counts.entry((tid, pos, strand)).or_insert(0) += 1;
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the count at an exact key, or 0 if absent.
    pub fn get(&self, tid: u32, pos: i64, strand: Strand) -> u32 {
        self.counts.get(&(tid, pos, strand)).copied().unwrap_or(0)
    }

    /// Produces a flat array of records, optionally truncated to `limit`.
    /// Order is unspecified (callers must sort via the comparators on
    /// [`ReadPos`]).
    pub fn dump(&self, limit: Option<usize>) -> Vec<ReadPos> {
        let iter = self.counts.iter().map(|(&(tid, pos, strand), &count)| ReadPos {
            tid,
            pos,
            strand,
            count,
        });
        match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_increments_existing_key() {
        let mut t = PosTable::new();
        t.insert(0, 100, Strand::Forward);
        t.insert(0, 100, Strand::Forward);
        t.insert(0, 100, Strand::Reverse);
        assert_eq!(t.get(0, 100, Strand::Forward), 2);
        assert_eq!(t.get(0, 100, Strand::Reverse), 1);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn dump_respects_limit() {
        let mut t = PosTable::new();
        for i in 0..10 {
            t.insert(0, i, Strand::Forward);
        }
        assert_eq!(t.dump(Some(3)).len(), 3);
        assert_eq!(t.dump(None).len(), 10);
    }

    #[test]
    fn sort_by_tid_then_count_desc() {
        let mut t = PosTable::new();
        t.insert(1, 5, Strand::Forward);
        t.insert(0, 5, Strand::Forward);
        t.insert(0, 5, Strand::Forward);
        t.insert(0, 6, Strand::Forward);
        let mut recs = t.dump(None);
        recs.sort_by(ReadPos::cmp_by_tid);
        assert_eq!(recs[0].tid, 0);
        assert_eq!(recs.last().unwrap().tid, 1);

        let mut by_count = t.dump(None);
        by_count.sort_by(ReadPos::cmp_by_count_desc);
        assert_eq!(by_count[0].count, 2);
    }

    #[test]
    fn seq_name_lookup() {
        let mut t = PosTable::new();
        t.set_seq_names(vec!["chr1".into(), "chr2".into()]);
        assert_eq!(t.seq_name(0), Some("chr1"));
        assert_eq!(t.seq_name(1), Some("chr2"));
        assert_eq!(t.seq_name(2), None);
    }
}
