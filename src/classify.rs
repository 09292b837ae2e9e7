use crate::grid::{Cell, GridIndex};

/// Why a record was left out of the counts. None of these stop the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NoCoordinates,
    OutOfRegion,
    Unclassified,
    /// Only produced under [`DecodePolicy::Skip`](crate::config::DecodePolicy::Skip).
    DecodeFailure,
}

/// Returns the position of the cell that owns `(x, y)`.
///
/// Every cell whose inclusive bounds contain the point is a candidate and the one declared
/// last wins, so a point on a shared edge or corner goes to the later cell. This depends on
/// iterating the declared list, never a map.
pub fn locate(cells: &[Cell], x: f64, y: f64) -> Option<usize> {
    cells.iter().rposition(|c| c.contains(x, y))
}

impl GridIndex {
    /// Runs the outer-region pre-filter and then the cell lookup.
    pub fn classify(&self, x: f64, y: f64) -> Result<usize, Skip> {
        if !self.region().contains(x, y) {
            return Err(Skip::OutOfRegion);
        }
        locate(self.cells(), x, y).ok_or(Skip::Unclassified)
    }

    pub fn classify_id(&self, x: f64, y: f64) -> Option<&str> {
        self.classify(x, y).ok().map(|i| self.cells()[i].id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RectAnchors, RegionAnchors};
    use crate::grid::tests::square_grid;

    fn pair_grid() -> GridIndex {
        let cells = vec![
            Cell::new("A1", 0.0, 10.0, 0.0, 10.0),
            Cell::new("A2", 10.0, 20.0, 0.0, 10.0),
        ];
        let anchors = RegionAnchors {
            first: RectAnchors::new("A1", "A2"),
            second: RectAnchors::new("A1", "A2"),
        };
        GridIndex::new(cells, &anchors).unwrap()
    }

    #[test]
    fn shared_edge_goes_to_later_cell() {
        let grid = pair_grid();
        assert_eq!(grid.classify_id(5.0, 5.0), Some("A1"));
        assert_eq!(grid.classify_id(10.0, 5.0), Some("A2"));
        assert_eq!(grid.classify(25.0, 5.0), Err(Skip::OutOfRegion));
    }

    #[test]
    fn shared_corner_goes_to_last_of_four() {
        let grid = square_grid();
        assert_eq!(grid.classify_id(10.0, 10.0), Some("B2"));
        assert_eq!(grid.classify_id(10.0, 15.0), Some("A2"));
        assert_eq!(grid.classify_id(5.0, 10.0), Some("B1"));
    }

    #[test]
    fn declaration_order_decides_not_id_order() {
        let cells = vec![
            Cell::new("B2", 10.0, 20.0, 0.0, 10.0),
            Cell::new("A1", 0.0, 10.0, 0.0, 10.0),
        ];
        assert_eq!(locate(&cells, 10.0, 5.0), Some(1));

        let reversed: Vec<_> = cells.into_iter().rev().collect();
        assert_eq!(locate(&reversed, 10.0, 5.0), Some(1));
        assert_eq!(reversed[1].id, "B2");
    }

    #[test]
    fn point_in_region_but_no_cell_is_unclassified() {
        let cells = vec![
            Cell::new("A1", 0.0, 4.0, 0.0, 10.0),
            Cell::new("A2", 6.0, 10.0, 0.0, 10.0),
        ];
        let anchors = RegionAnchors {
            first: RectAnchors::new("A1", "A2"),
            second: RectAnchors::new("A1", "A2"),
        };
        let grid = GridIndex::new(cells, &anchors).unwrap();
        assert_eq!(grid.classify(5.0, 5.0), Err(Skip::Unclassified));
    }
}
