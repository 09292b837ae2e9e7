use std::path::PathBuf;
use thiserror::Error;

/// Problems with the grid definition or the run parameters. Always fatal, raised before any
/// worker starts scanning.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed boundary file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("boundary file defines no cells")]
    EmptyGrid,

    #[error("anchor cell `{0}` is not defined in the boundary file")]
    MissingAnchor(String),

    #[error("cell id `{0}` needs at least two characters (row and column)")]
    ShortId(String),

    #[error("cell `{id}` has inverted bounds")]
    InvertedBounds { id: String },

    #[error("expected four anchor ids, got `{0}`")]
    AnchorList(String),

    #[error("worker count must be at least 1")]
    NoWorkers,
}

/// A record line that is not valid JSON once its envelope is trimmed.
#[derive(Debug, Error)]
#[error("worker {rank}: line {ordinal} is not a valid record: {source}")]
pub struct DecodeError {
    pub rank: usize,
    pub ordinal: usize,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading record stream: {0}")]
    Stream(#[source] std::io::Error),

    #[error("a worker thread panicked")]
    WorkerPanicked,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
