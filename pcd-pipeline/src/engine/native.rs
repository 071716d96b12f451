use std::path::{Path, PathBuf};

use las::Header;
use pcd_core::pointcloud::{
    point::PointCloud,
    schema::Schema,
    stats::{DimensionStatistic, StatsAccumulator},
};
use pcd_exporter::{
    las::write_las,
    ply::{parse_dims, write_ply_file, StorageMode},
    ExportError,
};
use pcd_parser::{
    parsers::{las::LasParserProvider, ply::PlyParserProvider, ParsedPointCloud, ParserProvider},
    ParseError,
};
use serde_json::json;

use super::PipelineEngine;
use crate::{
    pipeline::{expand_placeholder, has_placeholder},
    transform::{merge_views, split::SplitterTransform, transform_views},
    Pipeline, PipelineError, PipelineMetadata, Stage,
};

/// Executes pipelines in process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Default)]
struct Execution {
    views: Vec<PointCloud>,
    las_template: Option<Header>,
    metadata: PipelineMetadata,
}

impl Execution {
    fn read(&mut self, provider: &dyn ParserProvider, filename: &Path) -> Result<(), PipelineError> {
        let ParsedPointCloud {
            point_cloud,
            las_header,
        } = provider.get_parser().parse()?;

        if let Some(header) = las_header {
            match &self.las_template {
                Some(template) if template.point_format() != header.point_format() => {
                    return Err(ParseError::IncompatibleFormat(filename.to_path_buf()).into());
                }
                Some(_) => {}
                None => self.las_template = Some(header),
            }
        }

        log::debug!(
            "read {} points from {:?}",
            point_cloud.metadata.point_count,
            filename
        );
        self.views.push(point_cloud);
        Ok(())
    }

    fn split(&mut self, length: f64, origin: Option<(f64, f64)>) -> Result<(), PipelineError> {
        if !length.is_finite() || length <= 0.0 {
            return Err(PipelineError::Invalid(format!(
                "splitter length must be positive, got {}",
                length
            )));
        }
        let splitter = SplitterTransform { length, origin };
        self.views = transform_views(&splitter, std::mem::take(&mut self.views));
        Ok(())
    }

    fn stats(&mut self, dimensions: Option<&str>) -> Result<(), PipelineError> {
        let names = match dimensions {
            Some(dims) => parse_dims(dims),
            None => vec!["X".to_string(), "Y".to_string(), "Z".to_string()],
        };

        let mut statistics: Vec<DimensionStatistic> = Vec::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            let mut acc = StatsAccumulator::new(name.clone(), position);
            for view in &self.views {
                let schema = &view.metadata.schema;
                let dimension = schema
                    .resolve(name)
                    .ok_or_else(|| ExportError::UnknownDimension(name.clone()))?;
                for point in &view.points {
                    acc.push(schema.value(point, &dimension));
                }
            }
            statistics.push(acc.finish());
        }

        self.metadata.set_statistics(&statistics)
    }

    /// Views to write and the file each goes to. Without a placeholder everything lands in one file.
    fn targets(&mut self, filename: &Path) -> Result<Vec<(PathBuf, PointCloud)>, PipelineError> {
        let views = std::mem::take(&mut self.views);
        if has_placeholder(filename) {
            return Ok(views
                .into_iter()
                .enumerate()
                .map(|(i, view)| (expand_placeholder(filename, i + 1), view))
                .collect());
        }

        let merged = merge_views(views)?
            .pop()
            .unwrap_or_else(|| PointCloud::new(Vec::new(), Schema::default()));
        Ok(vec![(filename.to_path_buf(), merged)])
    }

    fn write_las(&mut self, filename: &Path) -> Result<(), PipelineError> {
        let template = self
            .las_template
            .clone()
            .ok_or(ExportError::MissingTemplate)?;

        let targets = self.targets(filename)?;
        let mut written = Vec::with_capacity(targets.len());
        for (path, view) in &targets {
            write_las(path, &template, &view.points)?;
            written.push(path.to_string_lossy().into_owned());
        }

        self.metadata.insert("writers.las", json!({ "filename": written }));
        self.views = targets.into_iter().map(|(_, view)| view).collect();
        Ok(())
    }

    fn write_ply(
        &mut self,
        filename: &Path,
        storage_mode: StorageMode,
        dims: Option<&str>,
    ) -> Result<(), PipelineError> {
        let dims = dims.map(parse_dims);
        let targets = self.targets(filename)?;
        let mut written = Vec::with_capacity(targets.len());
        for (path, view) in &targets {
            write_ply_file(path, view, dims.as_deref(), storage_mode)?;
            written.push(path.to_string_lossy().into_owned());
        }

        self.metadata.insert("writers.ply", json!({ "filename": written }));
        self.views = targets.into_iter().map(|(_, view)| view).collect();
        Ok(())
    }
}

impl PipelineEngine for NativeEngine {
    fn name(&self) -> &'static str {
        "native"
    }

    fn execute(&self, pipeline: &Pipeline) -> Result<PipelineMetadata, PipelineError> {
        pipeline.validate()?;

        let mut execution = Execution::default();
        for stage in pipeline.stages() {
            match stage {
                Stage::LasReader { filename } => {
                    let provider = LasParserProvider {
                        filenames: vec![filename.clone()],
                    };
                    execution.read(&provider, filename)?;
                }
                Stage::PlyReader { filename } => {
                    let provider = PlyParserProvider {
                        filenames: vec![filename.clone()],
                    };
                    execution.read(&provider, filename)?;
                }
                Stage::Merge => execution.views = merge_views(std::mem::take(&mut execution.views))?,
                Stage::Splitter {
                    length,
                    origin_x,
                    origin_y,
                } => {
                    let origin = match (origin_x, origin_y) {
                        (Some(x), Some(y)) => Some((*x, *y)),
                        (None, None) => None,
                        _ => {
                            return Err(PipelineError::Invalid(
                                "splitter needs both origin_x and origin_y".to_string(),
                            ))
                        }
                    };
                    execution.split(*length, origin)?;
                }
                Stage::Stats { dimensions } => execution.stats(dimensions.as_deref())?,
                Stage::LasWriter { filename, .. } => execution.write_las(filename)?,
                Stage::PlyWriter {
                    filename,
                    storage_mode,
                    dims,
                } => execution.write_ply(filename, *storage_mode, dims.as_deref())?,
            }
        }

        Ok(execution.metadata)
    }
}
