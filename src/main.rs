use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use gridcount::{DecodePolicy, FileSource, GridIndex, Ranking, RegionAnchors, RunConfig, Strategy};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(version, about = "Count geotagged records per grid cell, row and column")]
struct Args {
    /// Line-delimited record stream.
    input: PathBuf,

    /// Grid boundary file.
    #[arg(long, env = "GRIDCOUNT_GRID")]
    grid: PathBuf,

    /// Number of workers. Defaults to the available parallelism.
    #[arg(short = 'n', long, env = "GRIDCOUNT_WORKERS")]
    workers: Option<usize>,

    #[arg(long, value_enum, env = "GRIDCOUNT_STRATEGY", default_value_t = Strategy::Scan)]
    strategy: Strategy,

    #[arg(long, value_enum, env = "GRIDCOUNT_ON_DECODE_ERROR", default_value_t = DecodePolicy::Abort)]
    on_decode_error: DecodePolicy,

    /// Cells spanning the two rectangles of the region of interest, as
    /// `top_left,bottom_right,top_left,bottom_right`.
    #[arg(long, env = "GRIDCOUNT_ANCHORS", default_value = "A1,C4,C3,D5")]
    anchors: RegionAnchors,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = RunConfig {
        strategy: args.strategy,
        decode_policy: args.on_decode_error,
        anchors: args.anchors,
        ..RunConfig::default()
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    let grid = GridIndex::load(&args.grid, &config.anchors)
        .with_context(|| format!("loading grid from {}", args.grid.display()))?;
    let source = FileSource::new(&args.input);
    let totals = gridcount::run(grid, &source, &config)
        .with_context(|| format!("counting records in {}", args.input.display()))?;

    let ranking = Ranking::new(&totals.counts);
    let stdout = BufWriter::new(std::io::stdout().lock());
    match args.format {
        Format::Text => ranking.write_text(stdout)?,
        Format::Json => ranking.write_json(stdout)?,
    }
    Ok(())
}
