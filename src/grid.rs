use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::config::{RectAnchors, RegionAnchors};
use crate::error::{ConfigError, Error};

/// One named rectangle of the grid. Bounds are inclusive on all four sides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cell {
    pub id: String,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Cell {
    pub fn new(id: impl Into<String>, xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Cell {
            id: id.into(),
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    pub fn row(&self) -> &str {
        row_id(&self.id).unwrap_or_default()
    }

    pub fn column(&self) -> &str {
        column_id(&self.id).unwrap_or_default()
    }
}

/// The row of a cell id is its first character.
pub fn row_id(id: &str) -> Option<&str> {
    let c = id.chars().next()?;
    Some(&id[..c.len_utf8()])
}

/// The column of a cell id is its second character.
pub fn column_id(id: &str) -> Option<&str> {
    let mut it = id.char_indices().skip(1);
    let (start, c) = it.next()?;
    Some(&id[start..start + c.len_utf8()])
}

/// An axis-aligned rectangle given by its `(xmin, ymax)` and `(xmax, ymin)` corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
    pub ymin: f64,
}

impl Rect {
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y <= self.ymax && y >= self.ymin
    }
}

/// Union of two overlapping rectangles bounding the area of interest.
///
/// This is only a coarse pre-filter: a point in the gap between anchor cells passes it even
/// when no cell contains it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterRegion {
    pub first: Rect,
    pub second: Rect,
}

impl OuterRegion {
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.first.contains(x, y) || self.second.contains(x, y)
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: Cell,
}

/// The immutable cell list, in declaration order, plus the outer region derived from it.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cells: Vec<Cell>,
    region: OuterRegion,
}

impl GridIndex {
    pub fn new(cells: Vec<Cell>, anchors: &RegionAnchors) -> Result<Self, ConfigError> {
        if cells.is_empty() {
            return Err(ConfigError::EmptyGrid);
        }
        for cell in &cells {
            if cell.id.chars().count() < 2 {
                return Err(ConfigError::ShortId(cell.id.clone()));
            }
            if cell.xmin > cell.xmax || cell.ymin > cell.ymax {
                return Err(ConfigError::InvertedBounds {
                    id: cell.id.clone(),
                });
            }
        }

        let region = OuterRegion {
            first: anchor_rect(&cells, &anchors.first)?,
            second: anchor_rect(&cells, &anchors.second)?,
        };
        Ok(GridIndex { cells, region })
    }

    /// Reads a GeoJSON-style feature collection whose features carry
    /// `properties.{id, xmin, xmax, ymin, ymax}`.
    pub fn from_reader<R: Read>(reader: R, anchors: &RegionAnchors) -> Result<Self, ConfigError> {
        let collection: FeatureCollection = serde_json::from_reader(reader)?;
        let cells = collection.features.into_iter().map(|f| f.properties).collect();
        GridIndex::new(cells, anchors)
    }

    pub fn load(path: &Path, anchors: &RegionAnchors) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(GridIndex::from_reader(BufReader::new(file), anchors)?)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn region(&self) -> &OuterRegion {
        &self.region
    }
}

/// Later declarations of an anchor id override earlier ones.
fn find_anchor<'a>(cells: &'a [Cell], id: &str) -> Result<&'a Cell, ConfigError> {
    cells
        .iter()
        .rev()
        .find(|c| c.id == id)
        .ok_or_else(|| ConfigError::MissingAnchor(id.to_string()))
}

fn anchor_rect(cells: &[Cell], anchors: &RectAnchors) -> Result<Rect, ConfigError> {
    let top_left = find_anchor(cells, &anchors.top_left)?;
    let bottom_right = find_anchor(cells, &anchors.bottom_right)?;
    Ok(Rect {
        xmin: top_left.xmin,
        ymax: top_left.ymax,
        xmax: bottom_right.xmax,
        ymin: bottom_right.ymin,
    })
}
