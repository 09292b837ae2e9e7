use std::io::BufRead;

use tracing::trace;

use crate::classify::Skip;
use crate::config::DecodePolicy;
use crate::counters::{CounterMaps, ScanStats};
use crate::envelope::{self, Line};
use crate::error::{DecodeError, Error};
use crate::grid::GridIndex;
use crate::partition::{LineIndex, Partition};

/// Everything workers receive before scanning starts. Shared read-only.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub grid: GridIndex,
    pub template: CounterMaps,
    pub decode_policy: DecodePolicy,
}

impl Broadcast {
    pub fn new(grid: GridIndex, decode_policy: DecodePolicy) -> Self {
        let template = CounterMaps::zeroed(&grid);
        Broadcast {
            grid,
            template,
            decode_policy,
        }
    }
}

/// What a worker hands back to the coordinator.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub rank: usize,
    pub counts: CounterMaps,
    pub stats: ScanStats,
}

pub struct Worker<'b> {
    partition: Partition,
    shared: &'b Broadcast,
    counts: CounterMaps,
    stats: ScanStats,
}

impl<'b> Worker<'b> {
    pub fn new(partition: Partition, shared: &'b Broadcast) -> Self {
        Worker {
            partition,
            shared,
            counts: shared.template.clone(),
            stats: ScanStats::default(),
        }
    }

    /// Reads the whole stream, acting only on the lines this worker owns.
    pub fn scan<R: BufRead>(mut self, mut reader: R) -> Result<WorkerReport, Error> {
        let mut buf = Vec::with_capacity(4096);
        let mut ordinal = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(Error::Stream)? == 0 {
                break;
            }
            self.stats.lines += 1;

            match Line::kind(ordinal, &buf) {
                Line::Header => {}
                Line::Terminator => break,
                Line::Record if self.partition.owns(ordinal) => self.process(ordinal, &buf)?,
                Line::Record => {}
            }
            ordinal += 1;
        }
        Ok(self.finish())
    }

    /// Decodes this worker's share of an already indexed stream.
    pub fn scan_indexed(mut self, data: &[u8], index: &LineIndex) -> Result<WorkerReport, Error> {
        for ordinal in self.partition.owned(index.records()) {
            self.process(ordinal, index.line(data, ordinal))?;
        }
        Ok(self.finish())
    }

    fn process(&mut self, ordinal: usize, raw: &[u8]) -> Result<(), DecodeError> {
        self.stats.owned += 1;
        let point = match envelope::decode(envelope::record_body(raw)) {
            Ok(point) => point,
            Err(source) if self.shared.decode_policy == DecodePolicy::Skip => {
                trace!(ordinal, %source, "skipping undecodable record");
                self.stats.decode_failure(ordinal);
                return Ok(());
            }
            Err(source) => {
                return Err(DecodeError {
                    rank: self.partition.rank,
                    ordinal,
                    source,
                })
            }
        };

        let cell = point
            .ok_or(Skip::NoCoordinates)
            .and_then(|(x, y)| self.shared.grid.classify(x, y));
        match cell {
            Ok(cell) => {
                self.counts.record(cell);
                self.stats.counted += 1;
            }
            Err(skip) => self.stats.skip(skip),
        }
        Ok(())
    }

    fn finish(self) -> WorkerReport {
        WorkerReport {
            rank: self.partition.rank,
            counts: self.counts,
            stats: self.stats,
        }
    }
}
