use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{PipelineError, Stage};

/// Marks where a writer numbers its outputs, e.g. `tile_#.las`.
pub const PLACEHOLDER: char = '#';

/// An ordered list of stages; serializes to the plain JSON array PDAL accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string(&self.stages)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let first = self
            .stages
            .first()
            .ok_or_else(|| PipelineError::Invalid("pipeline has no stages".to_string()))?;
        if !first.is_reader() {
            return Err(PipelineError::Invalid(format!(
                "pipeline must start with a reader, not {}",
                first.type_name()
            )));
        }
        Ok(())
    }
}

pub fn has_placeholder(filename: &Path) -> bool {
    filename
        .file_name()
        .map(|name| name.to_string_lossy().contains(PLACEHOLDER))
        .unwrap_or(false)
}

/// Replaces the placeholder in the file name with `n`.
pub fn expand_placeholder(filename: &Path, n: usize) -> PathBuf {
    let Some(name) = filename.file_name() else {
        return filename.to_path_buf();
    };
    let name = name
        .to_string_lossy()
        .replace(PLACEHOLDER, &n.to_string());
    filename.with_file_name(name)
}
