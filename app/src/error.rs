use std::path::PathBuf;

use pcd_core::tile::TileIdError;
use pcd_pipeline::PipelineError;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("--tile must be set if --tilesize is provided")]
    TileSizeWithoutTile,
    #[error("--keep-ids cannot be combined with --tile")]
    KeepIdsWithTile,
    #[error("tile size must be a positive number, got {0}")]
    InvalidTileSize(f64),
    #[error("--dims must name at least one dimension")]
    EmptyDims,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no {pattern} files found in {dir:?}")]
    NoInput { dir: PathBuf, pattern: &'static str },
    #[error("tiling failed: {0}")]
    Tiling(#[source] PipelineError),
    #[error("failed to convert {path:?}: {source}")]
    Convert {
        path: PathBuf,
        #[source]
        source: PipelineError,
    },
    #[error("failed to index {path:?}: {source}")]
    Index {
        path: PathBuf,
        #[source]
        source: PipelineError,
    },
    #[error(transparent)]
    TileId(#[from] TileIdError),
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
    #[error("aborted after {failed} failed unit(s): {first}")]
    Aborted { failed: usize, first: Box<AppError> },
    #[error("index file is unusable: a writer panicked while holding the lock")]
    PoisonedIndex,
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
    #[error("cannot read {}: {}", .0.path().display(), .0.error())]
    GlobEntry(#[from] glob::GlobError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
