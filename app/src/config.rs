//! Command line arguments and the validated run configuration built from them.
//!
//! Validation happens in the `TryFrom` conversions and touches no files, so a
//! bad flag combination is reported before anything is read or created.

use std::{path::PathBuf, sync::Arc};

use clap::{Args, Parser, ValueEnum};
use pcd_exporter::ply::parse_dims;
use pcd_pipeline::{NativeEngine, PdalEngine, PipelineEngine};

use crate::error::ConfigError;

pub const DEFAULT_TILE_SIZE: f64 = 15.0;
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_DIMS: &str = "X, Y, Z, Reflectance, Deviation, ReturnNumber, NumberOfReturns";
pub const DEFAULT_TILE_INDEX: &str = "tile_index.dat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// In-process LAS/PLY engine
    Native,
    /// The `pdal` command line tool
    Pdal,
}

#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Engine that executes point cloud pipelines
    #[arg(long, value_enum, default_value_t = EngineKind::Native)]
    pub engine: EngineKind,

    /// Path of the pdal executable, used with `--engine pdal`
    #[arg(long, value_name = "PATH", default_value = "pdal")]
    pub pdal: PathBuf,
}

impl EngineArgs {
    pub fn build(&self) -> Arc<dyn PipelineEngine> {
        match self.engine {
            EngineKind::Native => Arc::new(NativeEngine::new()),
            EngineKind::Pdal => Arc::new(PdalEngine::new(self.pdal.clone())),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "las2ply",
    about = "Converts LAS files into PLY tiles, optionally merging and re-tiling them first",
    author = "MIERUNE Inc.",
    version
)]
pub struct Las2PlyArgs {
    /// Directory holding the input *.las files
    #[arg(short, long, required = true, value_name = "DIR")]
    pub project: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub odir: PathBuf,

    /// Merge all inputs and split them into square tiles
    #[arg(short, long)]
    pub tile: bool,

    /// Tile edge length, in input coordinate units
    #[arg(long = "tilesize", visible_alias = "ts", value_name = "SIZE")]
    pub tile_size: Option<f64>,

    /// Name outputs after the input file stems instead of numbering them
    #[arg(long)]
    pub keep_ids: bool,

    /// Number of worker threads (0 uses every logical CPU)
    #[arg(long = "num-prcs", default_value_t = DEFAULT_WORKERS, value_name = "N")]
    pub num_workers: usize,

    /// Comma separated dimensions written to each PLY file
    #[arg(long, default_value = DEFAULT_DIMS, value_name = "LIST")]
    pub dims: String,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Stop dispatching tiles after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Keep the intermediate LAS tiles instead of deleting them
    #[arg(long)]
    pub keep_tiles: bool,

    /// Index the written tiles into this file once conversion is done
    #[arg(long, value_name = "PATH")]
    pub tile_index: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "tile-index",
    about = "Appends the XY centroid of every PLY tile in a directory to a tile index",
    author = "MIERUNE Inc.",
    version
)]
pub struct TileIndexArgs {
    /// Directory holding the *.ply tiles
    #[arg(short, long, required = true, value_name = "DIR")]
    pub idir: PathBuf,

    /// Index file records are appended to
    #[arg(short, long, default_value = DEFAULT_TILE_INDEX, value_name = "PATH")]
    pub tile_index: PathBuf,

    /// Number of worker threads (0 uses every logical CPU)
    #[arg(long = "num-prcs", default_value_t = DEFAULT_WORKERS, value_name = "N")]
    pub num_workers: usize,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Stop dispatching tiles after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

/// How inputs become conversion units.
#[derive(Debug, Clone, PartialEq)]
pub enum Tiling {
    /// One unit per input file.
    PerFile { keep_ids: bool },
    /// Inputs are merged and split into `size` x `size` tiles.
    Split { size: f64 },
}

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub project: PathBuf,
    pub odir: PathBuf,
    pub tiling: Tiling,
    pub workers: usize,
    pub dims: String,
    pub engine: EngineArgs,
    pub fail_fast: bool,
    pub keep_tiles: bool,
    pub tile_index: Option<PathBuf>,
}

impl TryFrom<Las2PlyArgs> for ConvertConfig {
    type Error = ConfigError;

    fn try_from(args: Las2PlyArgs) -> Result<Self, Self::Error> {
        let tiling = match (args.tile, args.tile_size) {
            (false, Some(_)) => return Err(ConfigError::TileSizeWithoutTile),
            (true, _) if args.keep_ids => return Err(ConfigError::KeepIdsWithTile),
            (true, size) => {
                let size = size.unwrap_or(DEFAULT_TILE_SIZE);
                if !size.is_finite() || size <= 0.0 {
                    return Err(ConfigError::InvalidTileSize(size));
                }
                Tiling::Split { size }
            }
            (false, None) => Tiling::PerFile {
                keep_ids: args.keep_ids,
            },
        };

        let dims = parse_dims(&args.dims);
        if dims.is_empty() {
            return Err(ConfigError::EmptyDims);
        }

        Ok(Self {
            project: args.project,
            odir: args.odir,
            tiling,
            workers: worker_count(args.num_workers),
            dims: dims.join(", "),
            engine: args.engine,
            fail_fast: args.fail_fast,
            keep_tiles: args.keep_tiles,
            tile_index: args.tile_index,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub idir: PathBuf,
    pub tile_index: PathBuf,
    pub workers: usize,
    pub engine: EngineArgs,
    pub fail_fast: bool,
}

impl From<TileIndexArgs> for IndexConfig {
    fn from(args: TileIndexArgs) -> Self {
        Self {
            idir: args.idir,
            tile_index: args.tile_index,
            workers: worker_count(args.num_workers),
            engine: args.engine,
            fail_fast: args.fail_fast,
        }
    }
}

/// `0` means one worker per logical CPU.
pub fn worker_count(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get()
    } else {
        requested
    }
}
