use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use pcd_core::tile::{enumerate_tiles, Tile, TileId, TileIdError};
use pcd_pipeline::{Pipeline, PipelineEngine, Stage};
use tempfile::TempDir;

use crate::error::AppError;

pub const INPUT_EXTENSION: &str = "las";
pub const TILE_FILENAME: &str = "tile_#.las";

/// Files in `dir` with `extension`, sorted by path.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, AppError> {
    let pattern = format!("{}/*.{}", Pattern::escape(&dir.to_string_lossy()), extension);
    let mut paths = Vec::new();
    for entry in glob(&pattern)? {
        paths.push(entry?);
    }
    paths.sort();
    Ok(paths)
}

/// The `*.las` files of `project`, sorted by path. An empty project is an error.
pub fn list_inputs(project: &Path) -> Result<Vec<PathBuf>, AppError> {
    let inputs = list_files(project, INPUT_EXTENSION)?;
    if inputs.is_empty() {
        return Err(AppError::NoInput {
            dir: project.to_path_buf(),
            pattern: "*.las",
        });
    }
    Ok(inputs)
}

/// Conversion units when no re-tiling happens: one per input file.
pub fn per_file_tiles(inputs: Vec<PathBuf>, keep_ids: bool) -> Result<Vec<Tile>, AppError> {
    if !keep_ids {
        return Ok(enumerate_tiles(inputs));
    }
    inputs
        .into_iter()
        .map(|path| -> Result<Tile, AppError> {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| TileIdError::MissingStem(path.clone()))?;
            Ok(Tile::new(TileId::Preserved(stem), path))
        })
        .collect()
}

pub fn tiling_pipeline(inputs: &[PathBuf], tile_size: f64, scratch: &Path) -> Pipeline {
    let mut pipeline = Pipeline::new();
    for input in inputs {
        pipeline.push(Stage::LasReader {
            filename: input.clone(),
        });
    }
    if inputs.len() > 1 {
        pipeline.push(Stage::Merge);
    }
    pipeline
        .with(Stage::Splitter {
            length: tile_size,
            origin_x: None,
            origin_y: None,
        })
        .with(Stage::LasWriter {
            filename: scratch.join(TILE_FILENAME),
            forward: Some("all".to_string()),
            extra_dims: Some("all".to_string()),
        })
}

/// Intermediate LAS tiles. The scratch directory goes away with this value unless kept.
pub struct TileSet {
    pub tiles: Vec<Tile>,
    scratch: Option<TempDir>,
}

impl TileSet {
    pub fn untiled(tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            scratch: None,
        }
    }

    /// Leaves the scratch directory on disk and returns its path.
    pub fn keep(&mut self) -> Option<PathBuf> {
        self.scratch.take().map(TempDir::keep)
    }
}

/// Merges `inputs` and splits them into tiles inside a scratch directory under `odir`.
pub fn split_into_tiles(
    engine: &dyn PipelineEngine,
    inputs: &[PathBuf],
    tile_size: f64,
    odir: &Path,
) -> Result<TileSet, AppError> {
    let scratch = tempfile::Builder::new().prefix(".tiles-").tempdir_in(odir)?;
    log::info!(
        "tiling {} file(s) with tile size {} into {:?}",
        inputs.len(),
        tile_size,
        scratch.path()
    );

    let pipeline = tiling_pipeline(inputs, tile_size, scratch.path());
    engine.execute(&pipeline).map_err(AppError::Tiling)?;

    let paths = list_files(scratch.path(), INPUT_EXTENSION)?;
    log::info!("created {} tile(s)", paths.len());
    Ok(TileSet {
        tiles: enumerate_tiles(paths),
        scratch: Some(scratch),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn single_input_skips_merge() {
        let pipeline = tiling_pipeline(&[PathBuf::from("in/a.las")], 15.0, Path::new("tmp"));
        let types: Vec<_> = pipeline.stages().iter().map(Stage::type_name).collect();
        assert_eq!(types, ["readers.las", "filters.splitter", "writers.las"]);
    }

    #[test]
    fn multiple_inputs_are_merged_before_splitting() {
        let inputs = [PathBuf::from("in/a.las"), PathBuf::from("in/b.las")];
        let pipeline = tiling_pipeline(&inputs, 20.0, Path::new("tmp"));
        let types: Vec<_> = pipeline.stages().iter().map(Stage::type_name).collect();
        assert_eq!(
            types,
            ["readers.las", "readers.las", "filters.merge", "filters.splitter", "writers.las"]
        );
        assert_eq!(
            pipeline.stages()[4],
            Stage::LasWriter {
                filename: PathBuf::from("tmp/tile_#.las"),
                forward: Some("all".to_string()),
                extra_dims: Some("all".to_string()),
            }
        );
    }

    #[test]
    fn tiles_are_numbered_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["tile_2.las", "tile_10.las", "tile_1.las", "tile_1.ply"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let tiles = enumerate_tiles(list_files(dir.path(), INPUT_EXTENSION).unwrap());
        let names: Vec<_> = tiles
            .iter()
            .map(|t| t.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["tile_1.las", "tile_10.las", "tile_2.las"]);
        assert_eq!(tiles[2].id, TileId::Sequence(2));
    }

    #[test]
    fn empty_project_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), b"").unwrap();
        assert!(matches!(
            list_inputs(dir.path()),
            Err(AppError::NoInput { .. })
        ));
    }

    #[test]
    fn keep_ids_uses_stems_verbatim() {
        let inputs = vec![PathBuf::from("in/0042.las"), PathBuf::from("in/north.las")];
        let tiles = per_file_tiles(inputs.clone(), true).unwrap();
        assert_eq!(tiles[0].id.file_name("ply"), "0042.ply");
        assert_eq!(tiles[1].id.file_name("ply"), "north.ply");

        let tiles = per_file_tiles(inputs, false).unwrap();
        assert_eq!(tiles[1].id.file_name("ply"), "001.ply");
    }
}
