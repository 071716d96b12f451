#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("LAS error: {0}")]
    Las(#[from] las::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dimension '{0}' is not present in the point cloud")]
    UnknownDimension(String),
    #[error("no dimensions to write")]
    NoDimensions,
    #[error("LAS writer needs a LAS header template")]
    MissingTemplate,
    #[error("extra bytes of a point have length {actual}, the point format needs {expected}")]
    ExtraBytesLength { expected: usize, actual: usize },
}
