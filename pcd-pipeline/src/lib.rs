pub mod engine;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod stage;
pub mod transform;

pub use engine::{native::NativeEngine, pdal::PdalEngine, PipelineEngine};
pub use error::PipelineError;
pub use metadata::PipelineMetadata;
pub use pipeline::Pipeline;
pub use stage::Stage;
