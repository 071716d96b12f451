use std::path::{Path, PathBuf};

use pcd_core::tile::Tile;
use pcd_exporter::ply::StorageMode;
use pcd_pipeline::{Pipeline, PipelineEngine, PipelineError, Stage};

use crate::error::AppError;

pub const OUTPUT_EXTENSION: &str = "ply";

/// Reads one tile and writes `<odir>/<id>.ply` with the requested dimensions.
pub fn conversion_pipeline(tile: &Tile, odir: &Path, dims: &str) -> Result<Pipeline, PipelineError> {
    let reader = Stage::reader_for(&tile.path)?;
    Ok(Pipeline::new().with(reader).with(Stage::PlyWriter {
        filename: tile.output_path(odir, OUTPUT_EXTENSION),
        storage_mode: StorageMode::LittleEndian,
        dims: Some(dims.to_string()),
    }))
}

pub fn convert_tile(
    engine: &dyn PipelineEngine,
    tile: &Tile,
    odir: &Path,
    dims: &str,
) -> Result<PathBuf, AppError> {
    let failed = |source| AppError::Convert {
        path: tile.path.clone(),
        source,
    };

    let pipeline = conversion_pipeline(tile, odir, dims).map_err(failed)?;
    engine.execute(&pipeline).map_err(failed)?;

    let output = tile.output_path(odir, OUTPUT_EXTENSION);
    log::debug!("converted {:?} -> {:?}", tile.path, output);
    Ok(output)
}
