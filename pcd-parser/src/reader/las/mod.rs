pub mod extra_bytes;

use std::path::{Path, PathBuf};

use las::{point::ScanDirection, Header, Reader};
use pcd_core::pointcloud::{
    point::{Color, Point, PointAttributes, PointFlags},
    schema::Schema,
};

use super::PointReader;
use crate::ParseError;

/// Streams the points of several LAS/LAZ files as if they were one.
///
/// The first file's header is the template for the whole stream: every later file must use
/// the same point format, and its extra bytes descriptors define the extra dimensions.
pub struct LasPointReader {
    files: Vec<PathBuf>,
    current_file_index: usize,
    current_reader: Option<Reader>,
    header: Header,
    schema: Schema,
}

impl LasPointReader {
    pub fn new(files: Vec<PathBuf>) -> Result<Self, ParseError> {
        let first = files.first().ok_or(ParseError::NoInput)?;
        let reader = Reader::from_path(first)?;
        let header = reader.header().clone();
        let schema = schema_from_header(&header)?;

        Ok(Self {
            files,
            current_file_index: 1,
            current_reader: Some(reader),
            header,
            schema,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open_next_file(&mut self) -> Result<(), ParseError> {
        if self.current_file_index < self.files.len() {
            let file = &self.files[self.current_file_index];
            let reader = Reader::from_path(file)?;
            check_compatible(&self.header, reader.header(), file)?;
            log::debug!("reading {:?}", file);
            self.current_reader = Some(reader);
            self.current_file_index += 1;
        } else {
            self.current_reader = None;
        }
        Ok(())
    }

    pub fn convert_las_point(las_point: las::Point) -> Point {
        let color = las_point.color.map(|c| Color {
            r: c.red,
            g: c.green,
            b: c.blue,
        });

        let flags = PointFlags {
            is_synthetic: las_point.is_synthetic,
            is_key_point: las_point.is_key_point,
            is_withheld: las_point.is_withheld,
            is_overlap: las_point.is_overlap,
            is_edge_of_flight_line: las_point.is_edge_of_flight_line,
            scan_direction_left_to_right: las_point.scan_direction == ScanDirection::LeftToRight,
        };

        let attributes = PointAttributes {
            intensity: las_point.intensity,
            return_number: las_point.return_number,
            number_of_returns: las_point.number_of_returns,
            classification: u8::from(las_point.classification),
            scanner_channel: las_point.scanner_channel,
            scan_angle: las_point.scan_angle,
            user_data: las_point.user_data,
            point_source_id: las_point.point_source_id,
            gps_time: las_point.gps_time,
            nir: las_point.nir,
            flags,
            extra_bytes: las_point.extra_bytes,
        };

        Point {
            x: las_point.x,
            y: las_point.y,
            z: las_point.z,
            color,
            attributes,
        }
    }
}

impl PointReader for LasPointReader {
    fn next_point(&mut self) -> Result<Option<Point>, ParseError> {
        loop {
            let Some(reader) = self.current_reader.as_mut() else {
                return Ok(None);
            };

            let next = reader.points().next();
            match next {
                Some(Ok(las_point)) => return Ok(Some(Self::convert_las_point(las_point))),
                Some(Err(e)) => return Err(e.into()),
                None => self.open_next_file()?,
            }
        }
    }
}

pub fn schema_from_header(header: &Header) -> Result<Schema, ParseError> {
    let format = header.point_format();
    Ok(Schema {
        has_color: format.has_color,
        has_gps_time: format.has_gps_time,
        has_nir: format.has_nir,
        extra: extra_bytes::extra_dimensions(header)?,
    })
}

fn check_compatible(template: &Header, header: &Header, path: &Path) -> Result<(), ParseError> {
    if template.point_format() != header.point_format() {
        return Err(ParseError::IncompatibleFormat(path.to_path_buf()));
    }
    Ok(())
}
