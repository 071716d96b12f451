use std::{fs::File, io::BufReader, path::PathBuf};

use ply_rs::{
    parser::Parser as PlyReader,
    ply::{DefaultElement, Property},
};

use pcd_core::pointcloud::{
    point::{Point, PointCloud},
    schema::{ExtraDimension, ScalarKind, Schema, StandardDimension},
};

use super::{ParsedPointCloud, Parser, ParserProvider};
use crate::ParseError;

const VERTEX_ELEMENT: &str = "vertex";

pub struct PlyParserProvider {
    pub filenames: Vec<PathBuf>,
}

impl ParserProvider for PlyParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(PlyParser {
            filenames: self.filenames.clone(),
        })
    }
}

/// Reads the `vertex` element of PLY files.
///
/// Properties named like a standard dimension fill that attribute; any other scalar property
/// becomes an f64 extra dimension so it survives a later write.
pub struct PlyParser {
    pub filenames: Vec<PathBuf>,
}

enum Slot {
    Standard(StandardDimension),
    Extra(usize),
}

impl Parser for PlyParser {
    fn parse(&self) -> Result<ParsedPointCloud, ParseError> {
        if self.filenames.is_empty() {
            return Err(ParseError::NoInput);
        }

        let mut point_cloud: Option<PointCloud> = None;
        for path in &self.filenames {
            let parsed = read_vertices(path)?;
            match point_cloud.as_mut() {
                None => point_cloud = Some(parsed),
                Some(pc) if pc.metadata.schema == parsed.metadata.schema => pc.append(parsed),
                Some(_) => return Err(ParseError::IncompatibleFormat(path.clone())),
            }
        }

        Ok(ParsedPointCloud {
            point_cloud: point_cloud.ok_or(ParseError::NoInput)?,
            las_header: None,
        })
    }
}

fn read_vertices(path: &PathBuf) -> Result<PointCloud, ParseError> {
    let ply_error = |message: String| ParseError::Ply {
        path: path.clone(),
        message,
    };

    let mut reader = BufReader::new(File::open(path)?);
    let ply = PlyReader::<DefaultElement>::new()
        .read_ply(&mut reader)
        .map_err(|e| ply_error(e.to_string()))?;

    let element = ply
        .header
        .elements
        .get(VERTEX_ELEMENT)
        .ok_or_else(|| ply_error("no vertex element".to_string()))?;

    let mut schema = Schema::default();
    let mut slots = Vec::new();
    for name in element.properties.keys() {
        let slot = match StandardDimension::from_name(name) {
            Some(dim) => {
                match dim {
                    StandardDimension::Red | StandardDimension::Green | StandardDimension::Blue => {
                        schema.has_color = true
                    }
                    StandardDimension::GpsTime => schema.has_gps_time = true,
                    StandardDimension::Infrared => schema.has_nir = true,
                    _ => {}
                }
                Slot::Standard(dim)
            }
            None => {
                schema.extra.push(ExtraDimension {
                    name: name.clone(),
                    kind: ScalarKind::F64,
                    byte_offset: schema.extra.len() * ScalarKind::F64.size(),
                    scale: None,
                    offset: None,
                });
                Slot::Extra(schema.extra.len() - 1)
            }
        };
        slots.push((name.clone(), slot));
    }

    let extra_len = schema.extra.len() * ScalarKind::F64.size();
    let vertices = ply.payload.get(VERTEX_ELEMENT).map(Vec::as_slice).unwrap_or(&[]);
    let mut points = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        let mut point = Point::new(0.0, 0.0, 0.0);
        point.attributes.extra_bytes = vec![0; extra_len];
        for (name, slot) in &slots {
            let Some(value) = vertex.get(name).and_then(property_value) else {
                continue;
            };
            match slot {
                Slot::Standard(dim) => dim.assign(&mut point, value),
                Slot::Extra(index) => {
                    let start = index * ScalarKind::F64.size();
                    point.attributes.extra_bytes[start..start + 8]
                        .copy_from_slice(&value.to_le_bytes());
                }
            }
        }
        points.push(point);
    }

    Ok(PointCloud::new(points, schema))
}

fn property_value(property: &Property) -> Option<f64> {
    match property {
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn write_ascii_ply(path: &std::path::Path, body: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    const HEADER: &str = "ply\nformat ascii 1.0\nelement vertex 2\nproperty double x\nproperty double y\nproperty double z\nproperty float Reflectance\nproperty uchar ReturnNumber\nend_header\n";

    #[test]
    fn reads_standard_and_extra_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("000.ply");
        write_ascii_ply(&path, &format!("{HEADER}1 2 3 -4.5 1\n5 6 7 0.5 2\n"));

        let parsed = PlyParserProvider {
            filenames: vec![path],
        }
        .get_parser()
        .parse()
        .unwrap();
        let pc = parsed.point_cloud;
        let schema = &pc.metadata.schema;

        assert_eq!(pc.metadata.point_count, 2);
        assert_eq!(pc.points[1].x, 5.0);
        assert_eq!(pc.points[1].attributes.return_number, 2);
        let reflectance = schema.resolve("reflectance").unwrap();
        assert_eq!(schema.value(&pc.points[0], &reflectance), -4.5);
        assert!(parsed.las_header.is_none());
    }

    #[test]
    fn missing_vertex_element_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces.ply");
        write_ascii_ply(
            &path,
            "ply\nformat ascii 1.0\nelement face 0\nproperty list uchar int vertex_indices\nend_header\n",
        );

        let result = PlyParser {
            filenames: vec![path],
        }
        .parse();
        assert!(matches!(result, Err(ParseError::Ply { .. })));
    }
}
