use std::path::Path;

use pcd_core::pointcloud::point::PointCloud;

use crate::ParseError;

pub mod las;
pub mod ply;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<ParsedPointCloud, ParseError>;
}

/// A parsed cloud plus what a LAS writer needs to reproduce the source layout.
#[derive(Debug, Clone)]
pub struct ParsedPointCloud {
    pub point_cloud: PointCloud,
    pub las_header: Option<::las::Header>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Las,
    Laz,
    Ply,
}

impl Extension {
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ParseError::UnsupportedExtension(path.display().to_string()))?;
        get_extension(extension)
    }

    /// Name of the reader stage that handles this format.
    pub fn reader_type(&self) -> &'static str {
        match self {
            Extension::Las | Extension::Laz => "readers.las",
            Extension::Ply => "readers.ply",
        }
    }
}

pub fn get_extension(extension: &str) -> Result<Extension, ParseError> {
    match extension.to_ascii_lowercase().as_str() {
        "las" => Ok(Extension::Las),
        "laz" => Ok(Extension::Laz),
        "ply" => Ok(Extension::Ply),
        _ => Err(ParseError::UnsupportedExtension(extension.to_string())),
    }
}
