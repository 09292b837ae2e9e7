//! Counts geotagged records per cell of a fixed grid, along with per-row and per-column
//! totals. A fixed number of workers split a line-delimited record stream by line ordinal,
//! count their own lines, and a coordinator folds the counts together.

pub mod classify;
pub mod config;
pub mod coordinator;
pub mod counters;
pub mod envelope;
pub mod error;
pub mod grid;
pub mod partition;
pub mod reduce;
pub mod report;
pub mod worker;

pub use classify::Skip;
pub use config::{DecodePolicy, RectAnchors, RegionAnchors, RunConfig, Strategy};
pub use coordinator::{run, FileSource, MemorySource, RecordSource};
pub use counters::{CounterMaps, ScanStats, Tally};
pub use error::{ConfigError, DecodeError, Error};
pub use grid::{Cell, GridIndex, OuterRegion, Rect};
pub use reduce::{reduce, Totals};
pub use report::{Entry, Ranking};
