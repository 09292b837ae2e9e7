use std::io::{self, Write};

use serde::Serialize;

use crate::counters::{CounterMaps, Tally};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: String,
    pub count: u64,
}

/// Cell, row and column totals, each ordered by count descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub cells: Vec<Entry>,
    pub rows: Vec<Entry>,
    pub columns: Vec<Entry>,
}

/// Sorts descending by count; equal counts keep declaration order.
pub fn rank(tally: &Tally) -> Vec<Entry> {
    let mut entries: Vec<Entry> = tally
        .iter()
        .map(|(id, count)| Entry {
            id: id.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

impl Ranking {
    pub fn new(counts: &CounterMaps) -> Self {
        Ranking {
            cells: rank(&counts.cells),
            rows: rank(&counts.rows),
            columns: rank(&counts.columns),
        }
    }

    /// outputs the three listings, cells first
    pub fn write_text<W: Write>(&self, mut out: W) -> io::Result<()> {
        let sections = [
            ("Order the grid box based on the number of posts in each box", &self.cells),
            ("Order the grid rows based on the number of posts in each row", &self.rows),
            ("Order the grid columns based on the number of posts in each column", &self.columns),
        ];
        let mut first = true;
        for (heading, entries) in sections {
            if !first {
                writeln!(out)?;
            } else {
                first = false;
            }
            writeln!(out, "{heading}")?;
            for Entry { id, count } in entries {
                writeln!(out, "{id} : {count}")?;
            }
        }
        out.flush()
    }

    pub fn write_json<W: Write>(&self, mut out: W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut out, self)?;
        writeln!(out)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::square_grid;

    fn counts() -> CounterMaps {
        let mut maps = CounterMaps::zeroed(&square_grid());
        for cell in [2, 3, 3, 1, 2] {
            maps.record(cell);
        }
        maps
    }

    fn ids(entries: &[Entry]) -> Vec<(&str, u64)> {
        entries.iter().map(|e| (e.id.as_str(), e.count)).collect()
    }

    #[test]
    fn ranks_descending_with_stable_ties() {
        let ranking = Ranking::new(&counts());
        assert_eq!(
            ids(&ranking.cells),
            [("B1", 2), ("B2", 2), ("A2", 1), ("A1", 0)]
        );
        assert_eq!(ids(&ranking.rows), [("B", 4), ("A", 1)]);
        assert_eq!(ids(&ranking.columns), [("2", 3), ("1", 2)]);
    }

    #[test]
    fn renders_three_sections() {
        let mut out = Vec::new();
        Ranking::new(&counts()).write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let expected = "\
Order the grid box based on the number of posts in each box
B1 : 2
B2 : 2
A2 : 1
A1 : 0

Order the grid rows based on the number of posts in each row
B : 4
A : 1

Order the grid columns based on the number of posts in each column
2 : 3
1 : 2
";
        assert_eq!(text, expected);
    }

    #[test]
    fn renders_json() {
        let mut out = Vec::new();
        Ranking::new(&counts()).write_json(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["cells"][0]["id"], "B1");
        assert_eq!(value["rows"][1]["count"], 1);
        assert_eq!(value["columns"].as_array().map(Vec::len), Some(2));
    }
}
