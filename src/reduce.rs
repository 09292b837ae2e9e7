use crate::counters::{CounterMaps, ScanStats};
use crate::grid::{column_id, row_id};
use crate::worker::WorkerReport;

/// Folds every worker's counts into one global result.
///
/// Only the cell tallies are summed. Row and column totals are rebuilt from the merged cell
/// totals, so they always agree with them no matter what the workers' own row and column
/// tallies say.
pub fn reduce<'a, I>(template: &CounterMaps, locals: I) -> CounterMaps
where
    I: IntoIterator<Item = &'a CounterMaps>,
{
    let mut global = template.zero();
    for local in locals {
        for (id, n) in local.cells.iter() {
            global.cells.add(id, n);
        }
    }

    for (id, n) in global.cells.iter() {
        if let Some(row) = row_id(id) {
            global.rows.add(row, n);
        }
        if let Some(column) = column_id(id) {
            global.columns.add(column, n);
        }
    }
    global
}

/// The reduced counts and the combined scan statistics of a run.
#[derive(Debug, Clone)]
pub struct Totals {
    pub counts: CounterMaps,
    pub stats: ScanStats,
}

impl Totals {
    pub fn from_reports(template: &CounterMaps, reports: &[WorkerReport]) -> Self {
        let counts = reduce(template, reports.iter().map(|r| &r.counts));
        let stats = reports.iter().fold(ScanStats::default(), |mut acc, r| {
            acc.merge(&r.stats);
            acc
        });
        debug_assert!(counts.is_consistent());
        Totals { counts, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::square_grid;
    use crate::partition::Partition;

    /// Cell positions of a synthetic stream, one per record ordinal.
    const STREAM: [usize; 11] = [0, 3, 3, 1, 2, 3, 0, 0, 1, 3, 2];

    fn split(workers: usize) -> CounterMaps {
        let template = CounterMaps::zeroed(&square_grid());
        let locals: Vec<_> = (0..workers)
            .map(|rank| {
                let p = Partition::new(rank, workers);
                let mut local = template.clone();
                for (ordinal, &cell) in STREAM.iter().enumerate() {
                    if p.owns(ordinal) {
                        local.record(cell);
                    }
                }
                local
            })
            .collect();
        reduce(&template, &locals)
    }

    #[test]
    fn result_is_independent_of_worker_count() {
        let one = split(1);
        assert_eq!(split(2), one);
        assert_eq!(split(4), one);
        assert_eq!(split(11), one);
        assert_eq!(split(16), one);

        assert_eq!(one.cells.get("A1"), Some(3));
        assert_eq!(one.cells.get("B2"), Some(4));
        assert_eq!(one.cells.total(), STREAM.len() as u64);
    }

    #[test]
    fn rows_and_columns_follow_cells() {
        let global = split(3);
        assert!(global.is_consistent());
        assert_eq!(global.rows.get("A"), Some(5));
        assert_eq!(global.rows.get("B"), Some(6));
        assert_eq!(global.columns.get("1"), Some(5));
        assert_eq!(global.columns.get("2"), Some(6));
    }

    #[test]
    fn local_row_tallies_are_ignored() {
        let template = CounterMaps::zeroed(&square_grid());
        let mut local = template.clone();
        local.record(0);
        local.rows.add("A", 40);
        local.columns.add("9", 1);

        let global = reduce(&template, [&local]);
        assert_eq!(global.rows.get("A"), Some(1));
        assert_eq!(global.columns.get("9"), None);
        assert!(global.is_consistent());
    }

    #[test]
    fn empty_cells_still_appear() {
        let template = CounterMaps::zeroed(&square_grid());
        let global = reduce(&template, []);
        assert_eq!(global.cells.len(), 4);
        assert_eq!(global.cells.total(), 0);
        assert_eq!(global.rows.get("B"), Some(0));
    }
}
