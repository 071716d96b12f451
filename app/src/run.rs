//! Entry points shared by the binaries and the integration tests.

use std::{fs, path::PathBuf, time::Instant};

use pcd_core::tile::IndexRecord;

use crate::{
    config::{ConvertConfig, IndexConfig, Tiling},
    converter::convert_tile,
    error::AppError,
    indexer::{build_index, list_outputs, TileIndex},
    pool::{Pool, PoolReport},
    tiler::{list_inputs, per_file_tiles, split_into_tiles, TileSet},
};

#[derive(Debug)]
pub struct ConvertSummary {
    /// Written PLY files, sorted by path.
    pub outputs: Vec<PathBuf>,
    pub failed: usize,
    pub skipped: usize,
    /// Records appended when `--tile-index` was given.
    pub indexed: Option<usize>,
    pub kept_tiles: Option<PathBuf>,
}

pub fn las2ply(config: &ConvertConfig) -> Result<ConvertSummary, AppError> {
    log::info!("input folder: {:?}", config.project);
    log::info!("output folder: {:?}", config.odir);
    log::info!("tiling: {:?}", config.tiling);
    log::info!("dimensions: {}", config.dims);
    log::info!("engine: {:?}, workers: {}", config.engine.engine, config.workers);

    let start = Instant::now();
    let inputs = list_inputs(&config.project)?;
    log::debug!("input files: {:?}", inputs);
    fs::create_dir_all(&config.odir)?;

    let engine = config.engine.build();
    let pool = Pool::new(config.workers, config.fail_fast)?;

    let mut tile_set = match config.tiling {
        Tiling::Split { size } => split_into_tiles(engine.as_ref(), &inputs, size, &config.odir)?,
        Tiling::PerFile { keep_ids } => TileSet::untiled(per_file_tiles(inputs, keep_ids)?),
    };

    log::info!("start converting {} tile(s)...", tile_set.tiles.len());
    let start_local = Instant::now();
    let report = pool.run(&tile_set.tiles, |tile| {
        convert_tile(engine.as_ref(), tile, &config.odir, &config.dims)
    });
    log::info!(
        "finish converting in {:?}: {} written, {} failed, {} skipped",
        start_local.elapsed(),
        report.succeeded(),
        report.failed.len(),
        report.skipped
    );

    let kept_tiles = if config.keep_tiles {
        tile_set.keep()
    } else {
        None
    };
    if let Some(dir) = &kept_tiles {
        log::info!("kept intermediate tiles in {:?}", dir);
    }

    let report = report.into_result(config.fail_fast)?;
    let failed = report.failed.len();
    let skipped = report.skipped;
    let mut outputs = report.outputs;
    outputs.sort();

    let indexed = match &config.tile_index {
        Some(path) => {
            let index = TileIndex::new(path);
            let report =
                build_index(engine.as_ref(), &pool, &index, &outputs).into_result(config.fail_fast)?;
            Some(report.succeeded())
        }
        None => None,
    };

    log::info!("Elapsed: {:?}", start.elapsed());
    Ok(ConvertSummary {
        outputs,
        failed,
        skipped,
        indexed,
        kept_tiles,
    })
}

pub fn tile_index(config: &IndexConfig) -> Result<PoolReport<IndexRecord>, AppError> {
    log::info!("input folder: {:?}", config.idir);
    log::info!("tile index: {:?}", config.tile_index);
    log::info!("engine: {:?}, workers: {}", config.engine.engine, config.workers);

    let start = Instant::now();
    let paths = list_outputs(&config.idir)?;
    if paths.is_empty() {
        log::warn!("no *.ply files found in {:?}", config.idir);
    }

    let engine = config.engine.build();
    let pool = Pool::new(config.workers, config.fail_fast)?;
    let index = TileIndex::new(&config.tile_index);
    let report = build_index(engine.as_ref(), &pool, &index, &paths);
    log::info!(
        "indexed {} tile(s), {} failed, {} skipped in {:?}",
        report.succeeded(),
        report.failed.len(),
        report.skipped,
        start.elapsed()
    );
    report.into_result(config.fail_fast)
}
