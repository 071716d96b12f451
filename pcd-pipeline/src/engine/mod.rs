//! Engines execute a [`Pipeline`] and report stage metadata.
//!
//! [`native::NativeEngine`] runs the stages in process on top of `las` and `ply-rs`;
//! [`pdal::PdalEngine`] hands the same JSON to the `pdal` command line tool.

pub mod native;
pub mod pdal;

use crate::{Pipeline, PipelineError, PipelineMetadata};

pub trait PipelineEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(&self, pipeline: &Pipeline) -> Result<PipelineMetadata, PipelineError>;
}
