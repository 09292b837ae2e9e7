use rustc_hash::{FxBuildHasher, FxHashMap as HashMap};

use crate::classify::Skip;
use crate::grid::{column_id, row_id, Cell, GridIndex};

/// Counts keyed by id, remembering the order ids were first declared in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    ids: Vec<String>,
    counts: Vec<u64>,
    slots: HashMap<String, usize>,
}

impl Tally {
    fn with_capacity(n: usize) -> Self {
        Tally {
            ids: Vec::with_capacity(n),
            counts: Vec::with_capacity(n),
            slots: HashMap::with_capacity_and_hasher(n, FxBuildHasher),
        }
    }

    /// Returns the slot of `id`, adding it with a zero count if unseen.
    pub fn declare(&mut self, id: &str) -> usize {
        if let Some(&slot) = self.slots.get(id) {
            return slot;
        }
        let slot = self.ids.len();
        self.ids.push(id.to_string());
        self.counts.push(0);
        self.slots.insert(id.to_string(), slot);
        slot
    }

    pub fn add(&mut self, id: &str, n: u64) {
        let slot = self.declare(id);
        self.counts[slot] += n;
    }

    #[inline]
    fn bump(&mut self, slot: usize) {
        self.counts[slot] += 1;
    }

    pub fn get(&self, id: &str) -> Option<u64> {
        self.slots.get(id).map(|&slot| self.counts[slot])
    }

    /// Same ids, every count zero.
    pub fn zeroed(&self) -> Self {
        Tally {
            ids: self.ids.clone(),
            counts: vec![0; self.counts.len()],
            slots: self.slots.clone(),
        }
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.ids.iter().map(String::as_str).zip(self.counts.iter().copied())
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Where a cell's observations land in each of the three tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellSlots {
    cell: usize,
    row: usize,
    column: usize,
}

/// Per-cell, per-row and per-column counts over the full id universe of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterMaps {
    pub cells: Tally,
    pub rows: Tally,
    pub columns: Tally,
    // indexed by position in the grid's cell list
    lookup: Vec<CellSlots>,
}

impl CounterMaps {
    /// Every id known to `grid`, at zero. Cells sharing an id share a counter.
    pub fn zeroed(grid: &GridIndex) -> Self {
        let n = grid.cells().len();
        let mut cells = Tally::with_capacity(n);
        let mut rows = Tally::default();
        let mut columns = Tally::default();
        let lookup = grid
            .cells()
            .iter()
            .map(|c: &Cell| CellSlots {
                cell: cells.declare(&c.id),
                row: rows.declare(c.row()),
                column: columns.declare(c.column()),
            })
            .collect();
        CounterMaps {
            cells,
            rows,
            columns,
            lookup,
        }
    }

    /// Resets the counts, keeping ids and slot layout.
    pub fn zero(&self) -> Self {
        CounterMaps {
            cells: self.cells.zeroed(),
            rows: self.rows.zeroed(),
            columns: self.columns.zeroed(),
            lookup: self.lookup.clone(),
        }
    }

    /// Counts one observation in the cell at position `cell` of the grid, along with its row
    /// and column.
    #[inline]
    pub fn record(&mut self, cell: usize) {
        let slots = self.lookup[cell];
        self.cells.bump(slots.cell);
        self.rows.bump(slots.row);
        self.columns.bump(slots.column);
    }

    /// Whether each row and column total equals the sum of its cells.
    pub fn is_consistent(&self) -> bool {
        let mut rows = self.rows.zeroed();
        let mut columns = self.columns.zeroed();
        for (id, n) in self.cells.iter() {
            let (Some(row), Some(column)) = (row_id(id), column_id(id)) else {
                return false;
            };
            rows.add(row, n);
            columns.add(column, n);
        }
        rows == self.rows && columns == self.columns
    }
}

/// What happened to the lines a worker saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Physical lines read, header and terminator included.
    pub lines: u64,
    /// Record lines this worker owned.
    pub owned: u64,
    pub no_coordinates: u64,
    pub out_of_region: u64,
    pub unclassified: u64,
    pub counted: u64,
    pub decode_failures: u64,
    /// Ordinal of the earliest line skipped as undecodable.
    pub first_decode_failure: Option<usize>,
}

impl ScanStats {
    pub fn skip(&mut self, reason: Skip) {
        match reason {
            Skip::NoCoordinates => self.no_coordinates += 1,
            Skip::OutOfRegion => self.out_of_region += 1,
            Skip::Unclassified => self.unclassified += 1,
            Skip::DecodeFailure => self.decode_failures += 1,
        }
    }

    pub fn decode_failure(&mut self, ordinal: usize) {
        self.skip(Skip::DecodeFailure);
        self.first_decode_failure = Some(self.first_decode_failure.map_or(ordinal, |o| o.min(ordinal)));
    }

    pub fn skipped(&self) -> u64 {
        self.no_coordinates + self.out_of_region + self.unclassified + self.decode_failures
    }

    pub fn merge(&mut self, other: &Self) {
        // every worker reads the same lines
        self.lines = self.lines.max(other.lines);
        self.owned += other.owned;
        self.no_coordinates += other.no_coordinates;
        self.out_of_region += other.out_of_region;
        self.unclassified += other.unclassified;
        self.counted += other.counted;
        self.decode_failures += other.decode_failures;
        self.first_decode_failure = match (self.first_decode_failure, other.first_decode_failure) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}
