use std::str::FromStr;

use clap::ValueEnum;

use crate::error::ConfigError;

/// How the record stream is divided between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Every worker reads the whole stream and decodes the lines it owns.
    #[default]
    Scan,
    /// One pass indexes line offsets, then workers decode their own lines in parallel.
    Indexed,
}

/// What a worker does with a line that fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DecodePolicy {
    /// Fail the run.
    #[default]
    Abort,
    /// Count it as skipped and carry on.
    Skip,
}

/// The cells whose corners span one rectangle of the outer region: `top_left` supplies
/// `(xmin, ymax)`, `bottom_right` supplies `(xmax, ymin)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectAnchors {
    pub top_left: String,
    pub bottom_right: String,
}

impl RectAnchors {
    pub fn new(top_left: impl Into<String>, bottom_right: impl Into<String>) -> Self {
        RectAnchors {
            top_left: top_left.into(),
            bottom_right: bottom_right.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionAnchors {
    pub first: RectAnchors,
    pub second: RectAnchors,
}

impl Default for RegionAnchors {
    fn default() -> Self {
        RegionAnchors {
            first: RectAnchors::new("A1", "C4"),
            second: RectAnchors::new("C3", "D5"),
        }
    }
}

/// Parses `A1,C4,C3,D5`.
impl FromStr for RegionAnchors {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids: Vec<&str> = s.split(',').map(str::trim).collect();
        match ids[..] {
            [a, b, c, d] if ids.iter().all(|id| !id.is_empty()) => Ok(RegionAnchors {
                first: RectAnchors::new(a, b),
                second: RectAnchors::new(c, d),
            }),
            _ => Err(ConfigError::AnchorList(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub workers: usize,
    pub strategy: Strategy,
    pub decode_policy: DecodePolicy,
    pub anchors: RegionAnchors,
    /// Capacity of each worker's line reader.
    pub read_buffer: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            workers: std::thread::available_parallelism().map_or(1, usize::from),
            strategy: Strategy::default(),
            decode_policy: DecodePolicy::default(),
            anchors: RegionAnchors::default(),
            read_buffer: 2 * 1024 * 1024,
        }
    }
}

impl RunConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_anchor_list() {
        let anchors: RegionAnchors = "A1, C4,C3 ,D5".parse().unwrap();
        assert_eq!(anchors, RegionAnchors::default());
    }

    #[test]
    fn rejects_short_anchor_list() {
        assert!(matches!(
            "A1,C4,C3".parse::<RegionAnchors>(),
            Err(ConfigError::AnchorList(_))
        ));
        assert!("A1,,C3,D5".parse::<RegionAnchors>().is_err());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = RunConfig::default().with_workers(0);
        assert!(matches!(config.validate(), Err(ConfigError::NoWorkers)));
    }
}
