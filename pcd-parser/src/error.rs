use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("LAS error: {0}")]
    Las(#[from] las::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PLY error in {path:?}: {message}")]
    Ply { path: PathBuf, message: String },
    #[error("malformed extra bytes descriptor: {0}")]
    ExtraBytes(String),
    #[error("unsupported extension: {0}")]
    UnsupportedExtension(String),
    #[error("point format of {0:?} differs from the first input")]
    IncompatibleFormat(PathBuf),
    #[error("no input files")]
    NoInput,
}
