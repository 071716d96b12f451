use std::{
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use tempfile::NamedTempFile;

use super::PipelineEngine;
use crate::{Pipeline, PipelineError, PipelineMetadata};

/// Runs pipelines through `pdal pipeline --stdin`, reading stage metadata back from a temp file.
#[derive(Debug, Clone)]
pub struct PdalEngine {
    program: PathBuf,
}

impl PdalEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, metadata_path: &std::path::Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("pipeline")
            .arg("--stdin")
            .arg("--metadata")
            .arg(metadata_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl PipelineEngine for PdalEngine {
    fn name(&self) -> &'static str {
        "pdal"
    }

    fn execute(&self, pipeline: &Pipeline) -> Result<PipelineMetadata, PipelineError> {
        pipeline.validate()?;
        let json = pipeline.to_json()?;
        let metadata_file = NamedTempFile::new()?;

        log::debug!("running {:?} with pipeline {}", self.program, json);
        let mut child = self
            .command(metadata_file.path())
            .spawn()
            .map_err(|source| PipelineError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(json.as_bytes())?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(PipelineError::Pdal {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let contents = std::fs::read_to_string(metadata_file.path())?;
        if contents.trim().is_empty() {
            return Ok(PipelineMetadata::default());
        }
        Ok(PipelineMetadata::from_pdal_json(serde_json::from_str(
            &contents,
        )?))
    }
}
