use std::path::PathBuf;

use pcd_core::pointcloud::point::PointCloud;

use super::{ParsedPointCloud, Parser, ParserProvider};
use crate::{
    reader::{las::LasPointReader, PointIterator},
    ParseError,
};

pub const CHUNK_SIZE: usize = 1_000_000;

pub struct LasParserProvider {
    pub filenames: Vec<PathBuf>,
}

impl ParserProvider for LasParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(LasParser {
            filenames: self.filenames.clone(),
        })
    }
}

/// Reads every file into one cloud; the first file's header is kept as the template.
pub struct LasParser {
    pub filenames: Vec<PathBuf>,
}

impl Parser for LasParser {
    fn parse(&self) -> Result<ParsedPointCloud, ParseError> {
        let start = std::time::Instant::now();
        let reader = LasPointReader::new(self.filenames.clone())?;
        let header = reader.header().clone();
        let schema = reader.schema().clone();

        let mut points = Vec::with_capacity(header.number_of_points() as usize);
        for chunk in PointIterator::new(reader, CHUNK_SIZE) {
            points.extend(chunk?);
        }
        log::debug!(
            "read {} points from {} file(s) in {:?}",
            points.len(),
            self.filenames.len(),
            start.elapsed()
        );

        Ok(ParsedPointCloud {
            point_cloud: PointCloud::new(points, schema),
            las_header: Some(header),
        })
    }
}
