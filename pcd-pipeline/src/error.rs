use std::path::PathBuf;

use pcd_exporter::ExportError;
use pcd_parser::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid pipeline: {0}")]
    Invalid(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to launch {program:?}: {source}")]
    Launch {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("pdal exited with {status}: {stderr}")]
    Pdal { status: String, stderr: String },
    #[error("no statistics for dimension '{0}'")]
    MissingStatistic(String),
}
