use std::path::PathBuf;

use pcd_exporter::ply::StorageMode;
use serde::{Deserialize, Serialize};

/// One step of a pipeline, serialized the way PDAL spells it (`{"type": "readers.las", ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stage {
    #[serde(rename = "readers.las")]
    LasReader { filename: PathBuf },

    #[serde(rename = "readers.ply")]
    PlyReader { filename: PathBuf },

    #[serde(rename = "filters.merge")]
    Merge,

    #[serde(rename = "filters.splitter")]
    Splitter {
        length: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin_x: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin_y: Option<f64>,
    },

    #[serde(rename = "filters.stats")]
    Stats {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimensions: Option<String>,
    },

    #[serde(rename = "writers.las")]
    LasWriter {
        filename: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        forward: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extra_dims: Option<String>,
    },

    #[serde(rename = "writers.ply")]
    PlyWriter {
        filename: PathBuf,
        #[serde(default)]
        storage_mode: StorageMode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dims: Option<String>,
    },
}

impl Stage {
    pub fn is_reader(&self) -> bool {
        matches!(self, Stage::LasReader { .. } | Stage::PlyReader { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::LasReader { .. } => "readers.las",
            Stage::PlyReader { .. } => "readers.ply",
            Stage::Merge => "filters.merge",
            Stage::Splitter { .. } => "filters.splitter",
            Stage::Stats { .. } => "filters.stats",
            Stage::LasWriter { .. } => "writers.las",
            Stage::PlyWriter { .. } => "writers.ply",
        }
    }

    /// Reader for `filename`, picked from its extension.
    pub fn reader_for(filename: impl Into<PathBuf>) -> Result<Self, pcd_parser::ParseError> {
        use pcd_parser::parsers::Extension;

        let filename = filename.into();
        Ok(match Extension::from_path(&filename)? {
            Extension::Las | Extension::Laz => Stage::LasReader { filename },
            Extension::Ply => Stage::PlyReader { filename },
        })
    }
}
