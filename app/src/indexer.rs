//! Tile index: one `<id> <centroid x> <centroid y>` line per converted tile.

use std::{
    fs::OpenOptions,
    io::Write as _,
    path::{Path, PathBuf},
    sync::Mutex,
};

use pcd_core::tile::{IndexRecord, TileId};
use pcd_pipeline::{Pipeline, PipelineEngine, PipelineError, Stage};

use crate::{
    converter::OUTPUT_EXTENSION,
    error::AppError,
    pool::{Pool, PoolReport},
    tiler::list_files,
};

pub const CENTROID_DIMENSIONS: &str = "X,Y";

/// Append-only index file shared by all workers.
///
/// Each record is written with a single `write_all` while the lock is held, so
/// concurrent appends never interleave within a line.
pub struct TileIndex {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TileIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &IndexRecord) -> Result<(), AppError> {
        let _guard = self.lock.lock().map_err(|_| AppError::PoisonedIndex)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.to_line().as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

pub fn stats_pipeline(path: &Path) -> Result<Pipeline, PipelineError> {
    Ok(Pipeline::new()
        .with(Stage::reader_for(path)?)
        .with(Stage::Stats {
            dimensions: Some(CENTROID_DIMENSIONS.to_string()),
        }))
}

/// Centroid of one converted tile; the id comes from its file stem.
pub fn centroid(engine: &dyn PipelineEngine, path: &Path) -> Result<IndexRecord, AppError> {
    let id = TileId::from_path(path)?.sequence()?;
    let failed = |source| AppError::Index {
        path: path.to_path_buf(),
        source,
    };

    let pipeline = stats_pipeline(path).map_err(failed)?;
    let metadata = engine.execute(&pipeline).map_err(failed)?;
    Ok(IndexRecord {
        id,
        x: metadata.average("X").map_err(failed)?,
        y: metadata.average("Y").map_err(failed)?,
    })
}

pub fn index_tile(
    engine: &dyn PipelineEngine,
    index: &TileIndex,
    path: &Path,
) -> Result<IndexRecord, AppError> {
    let record = centroid(engine, path)?;
    index.append(&record)?;
    log::debug!("indexed {:?} as {}", path, record);
    Ok(record)
}

/// Converted tiles in `dir`, sorted by path.
pub fn list_outputs(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    list_files(dir, OUTPUT_EXTENSION)
}

pub fn build_index(
    engine: &dyn PipelineEngine,
    pool: &Pool,
    index: &TileIndex,
    paths: &[PathBuf],
) -> PoolReport<IndexRecord> {
    log::info!(
        "indexing {} tile(s) into {:?} with {} worker(s)",
        paths.len(),
        index.path(),
        pool.workers()
    );
    pool.run(paths, |path| index_tile(engine, index, path))
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Arc, thread};

    use pcd_pipeline::PipelineMetadata;

    use super::*;

    /// Reports the numeric file stem as both averages.
    struct StemEngine;

    impl PipelineEngine for StemEngine {
        fn name(&self) -> &'static str {
            "stem"
        }

        fn execute(&self, pipeline: &Pipeline) -> Result<PipelineMetadata, PipelineError> {
            let Stage::PlyReader { filename } = &pipeline.stages()[0] else {
                return Err(PipelineError::Invalid("expected a PLY reader".to_string()));
            };
            let value: f64 = filename
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(-1.0);
            let mut metadata = PipelineMetadata::default();
            metadata.set_statistics(&[
                pcd_core::pointcloud::stats::DimensionStatistic {
                    name: "X".to_string(),
                    average: value,
                    ..Default::default()
                },
                pcd_core::pointcloud::stats::DimensionStatistic {
                    name: "Y".to_string(),
                    average: value / 2.0,
                    ..Default::default()
                },
            ])?;
            Ok(metadata)
        }
    }

    #[test]
    fn stats_pipeline_reads_by_extension() {
        let pipeline = stats_pipeline(Path::new("tiles/003.ply")).unwrap();
        assert_eq!(pipeline.stages()[0].type_name(), "readers.ply");
        assert_eq!(
            pipeline.stages()[1],
            Stage::Stats {
                dimensions: Some("X,Y".to_string())
            }
        );
        let pipeline = stats_pipeline(Path::new("tiles/003.las")).unwrap();
        assert_eq!(pipeline.stages()[0].type_name(), "readers.las");
    }

    #[test]
    fn centroid_uses_stem_as_id() {
        let record = centroid(&StemEngine, Path::new("tiles/012.ply")).unwrap();
        assert_eq!(record, IndexRecord { id: 12, x: 12.0, y: 6.0 });
        assert!(matches!(
            centroid(&StemEngine, Path::new("tiles/north.ply")),
            Err(AppError::TileId(_))
        ));
    }

    #[test]
    fn concurrent_appends_keep_lines_whole() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(TileIndex::new(dir.path().join("tile_index.dat")));

        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    for i in 0..50u32 {
                        let record = IndexRecord {
                            id: t * 1000 + i,
                            x: 123456.789 + i as f64,
                            y: -0.000123456789,
                        };
                        index.append(&record).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = fs::read_to_string(index.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            let record: IndexRecord = line.parse().unwrap();
            assert_eq!(record.y, -0.000123456789);
        }
    }

    #[test]
    fn lists_ply_outputs_sorted_by_path() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["010.ply", "002.ply", "001.ply", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let names: Vec<_> = list_outputs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["001.ply", "002.ply", "010.ply"]);
    }
}
