use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crossbeam::channel;
use crossbeam::thread;
use memmap2::Mmap;
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::config::{RunConfig, Strategy};
use crate::error::Error;
use crate::grid::GridIndex;
use crate::partition::{LineIndex, Partition};
use crate::reduce::Totals;
use crate::worker::{Broadcast, Worker, WorkerReport};

/// A record stream every worker can open independently.
pub trait RecordSource: Sync {
    type Reader: BufRead;

    /// A fresh reader positioned at the first line.
    fn open(&self, capacity: usize) -> Result<Self::Reader, Error>;

    /// The whole stream as bytes, for the indexed strategy.
    fn bytes(&self) -> Result<Bytes<'_>, Error>;
}

pub enum Bytes<'a> {
    Mapped(Mmap),
    Borrowed(&'a [u8]),
}

impl Deref for Bytes<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Bytes::Mapped(map) => &map[..],
            Bytes::Borrowed(bytes) => *bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for FileSource {
    type Reader = BufReader<File>;

    fn open(&self, capacity: usize) -> Result<Self::Reader, Error> {
        let file = File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        Ok(BufReader::with_capacity(capacity, file))
    }

    fn bytes(&self) -> Result<Bytes<'_>, Error> {
        let file = File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let len = file.metadata().map_err(|e| Error::io(&self.path, e))?.len();
        if len == 0 {
            return Ok(Bytes::Borrowed(&[]));
        }
        // SAFETY: the mapping is read-only and lives no longer than this run; the input is not
        // expected to change underneath it.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(&self.path, e))?;
        Ok(Bytes::Mapped(map))
    }
}

/// An in-memory stream.
#[derive(Debug, Clone, Copy)]
pub struct MemorySource<'a>(pub &'a [u8]);

impl<'a> RecordSource for MemorySource<'a> {
    type Reader = &'a [u8];

    fn open(&self, _capacity: usize) -> Result<Self::Reader, Error> {
        Ok(self.0)
    }

    fn bytes(&self) -> Result<Bytes<'_>, Error> {
        Ok(Bytes::Borrowed(self.0))
    }
}

/// Builds the broadcast once, runs every worker, gathers their counts and reduces them.
pub fn run<S: RecordSource>(
    grid: GridIndex,
    source: &S,
    config: &RunConfig,
) -> Result<Totals, Error> {
    config.validate()?;
    let shared = Broadcast::new(grid, config.decode_policy);
    info!(
        workers = config.workers,
        strategy = ?config.strategy,
        cells = shared.grid.cells().len(),
        "starting run"
    );

    let mut reports = match config.strategy {
        Strategy::Scan => scan_all(&shared, source, config)?,
        Strategy::Indexed => scan_indexed(&shared, source, config.workers)?,
    };
    reports.sort_by_key(|r| r.rank);

    let totals = Totals::from_reports(&shared.template, &reports);
    let stats = &totals.stats;
    info!(
        lines = stats.lines,
        counted = stats.counted,
        no_coordinates = stats.no_coordinates,
        out_of_region = stats.out_of_region,
        unclassified = stats.unclassified,
        "run complete"
    );
    if stats.decode_failures > 0 {
        warn!(
            skipped = stats.decode_failures,
            first_line = ?stats.first_decode_failure,
            "records skipped as undecodable"
        );
    }
    Ok(totals)
}

/// One thread per worker, each reading the full stream. Reports come back over a channel and
/// the run fails if any worker does.
fn scan_all<S: RecordSource>(
    shared: &Broadcast,
    source: &S,
    config: &RunConfig,
) -> Result<Vec<WorkerReport>, Error> {
    let (tx, rx) = channel::unbounded::<Result<WorkerReport, Error>>();

    thread::scope(|s| {
        for rank in 0..config.workers {
            let tx = tx.clone();
            s.spawn(move |_| {
                let _span = info_span!("worker", rank).entered();
                let worker = Worker::new(Partition::new(rank, config.workers), shared);
                let result = source
                    .open(config.read_buffer)
                    .and_then(|reader| worker.scan(reader));
                if let Ok(report) = &result {
                    debug!(stats = ?report.stats, "scan finished");
                }
                // the receiver outlives the scope
                let _ = tx.send(result);
            });
        }
    })
    .map_err(|_| Error::WorkerPanicked)?;
    drop(tx);

    rx.iter().collect()
}

/// Indexes the stream once, then decodes each worker's lines in parallel.
fn scan_indexed<S: RecordSource>(
    shared: &Broadcast,
    source: &S,
    workers: usize,
) -> Result<Vec<WorkerReport>, Error> {
    let data = source.bytes()?;
    let index = LineIndex::build(&data);
    debug!(lines = index.len(), "indexed record stream");

    let mut reports = (0..workers)
        .into_par_iter()
        .map(|rank| {
            let _span = info_span!("worker", rank).entered();
            let result = Worker::new(Partition::new(rank, workers), shared).scan_indexed(&data, &index);
            if let Ok(report) = &result {
                debug!(stats = ?report.stats, "scan finished");
            }
            result
        })
        .collect::<Result<Vec<_>, _>>()?;

    let lines = (index.len() + usize::from(index.terminated())) as u64;
    for report in &mut reports {
        report.stats.lines = lines;
    }
    Ok(reports)
}
