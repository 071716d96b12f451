pub mod error;
pub mod las;
pub mod ply;

pub use error::ExportError;
