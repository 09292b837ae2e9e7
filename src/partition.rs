use std::ops::Range;

use crate::envelope::Line;

/// Static modulo assignment of line ordinals to workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub rank: usize,
    pub workers: usize,
}

impl Partition {
    pub fn new(rank: usize, workers: usize) -> Self {
        debug_assert!(rank < workers, "rank {rank} out of {workers} workers");
        Partition { rank, workers }
    }

    #[inline]
    pub fn owns(&self, ordinal: usize) -> bool {
        ordinal % self.workers == self.rank
    }

    /// The ordinals this worker owns within `range`, ascending.
    pub fn owned(&self, range: Range<usize>) -> impl Iterator<Item = usize> {
        let first = range.start + (self.rank + self.workers - range.start % self.workers) % self.workers;
        (first..range.end).step_by(self.workers)
    }
}

/// Byte spans of the record lines of a stream, found in one pass so that workers can go
/// straight to the lines they own.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    spans: Vec<Range<usize>>,
    terminated: bool,
}

impl LineIndex {
    /// Indexes every line up to (not including) the terminator. Span `k` is the line with
    /// ordinal `k`, newline excluded; span 0 is the header.
    pub fn build(data: &[u8]) -> Self {
        let mut spans = Vec::new();
        let mut terminated = false;
        let mut start = 0;
        let ends = memchr::memchr_iter(b'\n', data).chain(
            // a final line without a trailing newline
            data.last().is_some_and(|&b| b != b'\n').then_some(data.len()),
        );
        for end in ends {
            let ordinal = spans.len();
            if Line::kind(ordinal, &data[start..end]) == Line::Terminator {
                terminated = true;
                break;
            }
            spans.push(start..end);
            start = end + 1;
        }
        LineIndex { spans, terminated }
    }

    /// Whether the stream ended on a `]}` line rather than at end of input.
    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// Header plus records.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Ordinals of the record lines.
    pub fn records(&self) -> Range<usize> {
        1usize.min(self.spans.len())..self.spans.len()
    }

    pub fn line<'d>(&self, data: &'d [u8], ordinal: usize) -> &'d [u8] {
        &data[self.spans[ordinal].clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn every_ordinal_has_exactly_one_owner() {
        for workers in 1..=9 {
            let mut claimed = vec![0usize; 100];
            for rank in 0..workers {
                let p = Partition::new(rank, workers);
                for ordinal in (0..100).filter(|&k| p.owns(k)) {
                    claimed[ordinal] += 1;
                }
            }
            assert!(claimed.iter().all(|&n| n == 1), "workers = {workers}");
        }
    }

    #[test]
    fn owned_matches_owns() {
        for workers in 1..=6 {
            for rank in 0..workers {
                let p = Partition::new(rank, workers);
                for range in [0..0, 0..17, 1..17, 5..6, 3..40] {
                    let fast: BTreeSet<_> = p.owned(range.clone()).collect();
                    let slow: BTreeSet<_> = range.clone().filter(|&k| p.owns(k)).collect();
                    assert_eq!(fast, slow, "rank {rank}/{workers} over {range:?}");
                }
            }
        }
    }

    #[test]
    fn index_stops_at_terminator() {
        let data = b"{\"rows\":[\n{\"a\":1},\n{\"a\":2}\n]}\n{\"after\":1}\n";
        let index = LineIndex::build(data);
        assert_eq!(index.len(), 3);
        assert!(index.terminated());
        assert_eq!(index.records(), 1..3);
        assert_eq!(index.line(data, 0), b"{\"rows\":[");
        assert_eq!(index.line(data, 2), b"{\"a\":2}");
    }

    #[test]
    fn index_keeps_unterminated_last_line() {
        let data = b"header\n{\"a\":1},\n{\"a\":2}]}";
        let index = LineIndex::build(data);
        assert_eq!(index.len(), 3);
        assert!(!index.terminated());
        assert_eq!(index.line(data, 2), b"{\"a\":2}]}");
    }

    #[test]
    fn empty_input_has_no_records() {
        let index = LineIndex::build(b"");
        assert!(index.is_empty());
        assert!(index.records().is_empty());

        let index = LineIndex::build(b"header only\n");
        assert_eq!(index.records(), 1..1);
    }
}
