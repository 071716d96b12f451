use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt as _};
use ply_rs::{
    ply::{
        Addable as _, DefaultElement, ElementDef, Encoding, Ply, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer as PlyWriter,
};
use serde::{Deserialize, Serialize};

use pcd_core::pointcloud::{
    point::PointCloud,
    schema::{Dimension, ScalarKind, Schema, StandardDimension},
};

use crate::ExportError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    #[default]
    #[serde(rename = "little endian")]
    LittleEndian,
    #[serde(rename = "big endian")]
    BigEndian,
    #[serde(rename = "ascii")]
    Ascii,
}

/// Splits a dimension list such as `"X, Y, Z, ReturnNumber,"`: trimmed, empty entries dropped.
pub fn parse_dims(dims: &str) -> Vec<String> {
    dims.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

/// One PLY vertex property and the dimension it is filled from.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub dimension: Dimension,
    pub kind: ScalarKind,
}

pub fn property_name(dimension_name: &str) -> String {
    match StandardDimension::from_name(dimension_name) {
        Some(
            dim @ (StandardDimension::X
            | StandardDimension::Y
            | StandardDimension::Z
            | StandardDimension::Red
            | StandardDimension::Green
            | StandardDimension::Blue),
        ) => dim.name().to_ascii_lowercase(),
        _ => dimension_name.to_string(),
    }
}

fn scalar_type(kind: ScalarKind) -> ScalarType {
    match kind {
        ScalarKind::I8 => ScalarType::Char,
        ScalarKind::U8 => ScalarType::UChar,
        ScalarKind::I16 => ScalarType::Short,
        ScalarKind::U16 => ScalarType::UShort,
        ScalarKind::I32 => ScalarType::Int,
        ScalarKind::U32 => ScalarType::UInt,
        ScalarKind::F32 => ScalarType::Float,
        // PLY has no 64 bit integers
        ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => ScalarType::Double,
    }
}

fn column_kind(kind: ScalarKind) -> ScalarKind {
    match kind {
        ScalarKind::I64 | ScalarKind::U64 => ScalarKind::F64,
        kind => kind,
    }
}

/// Resolves `dims` against the schema. `None` writes every standard dimension the cloud has
/// followed by its extra dimensions.
pub fn columns(schema: &Schema, dims: Option<&[String]>) -> Result<Vec<Column>, ExportError> {
    let names: Vec<String> = match dims {
        Some(dims) => dims.to_vec(),
        None => StandardDimension::ALL
            .iter()
            .map(|d| d.name().to_string())
            .chain(schema.extra.iter().map(|e| e.name.clone()))
            .filter(|name| schema.resolve(name).is_some())
            .collect(),
    };
    if names.is_empty() {
        return Err(ExportError::NoDimensions);
    }

    names
        .iter()
        .map(|name| {
            let dimension = schema
                .resolve(name)
                .ok_or_else(|| ExportError::UnknownDimension(name.clone()))?;
            Ok(Column {
                name: property_name(schema.name(&dimension)),
                dimension,
                kind: column_kind(schema.kind(&dimension)),
            })
        })
        .collect()
}

fn header(columns: &[Column], count: usize, storage: StorageMode) -> Ply<DefaultElement> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = match storage {
        StorageMode::LittleEndian => Encoding::BinaryLittleEndian,
        StorageMode::BigEndian => Encoding::BinaryBigEndian,
        StorageMode::Ascii => Encoding::Ascii,
    };

    let mut vertex = ElementDef::new("vertex".to_string());
    vertex.count = count;
    for column in columns {
        vertex.properties.add(PropertyDef::new(
            column.name.clone(),
            PropertyType::Scalar(scalar_type(column.kind)),
        ));
    }
    ply.header.elements.add(vertex);
    ply
}

fn write_binary_value<B: ByteOrder, W: Write>(
    writer: &mut W,
    kind: ScalarKind,
    value: f64,
) -> std::io::Result<()> {
    match kind {
        ScalarKind::I8 => writer.write_i8(value as i8),
        ScalarKind::U8 => writer.write_u8(value as u8),
        ScalarKind::I16 => writer.write_i16::<B>(value as i16),
        ScalarKind::U16 => writer.write_u16::<B>(value as u16),
        ScalarKind::I32 => writer.write_i32::<B>(value as i32),
        ScalarKind::U32 => writer.write_u32::<B>(value as u32),
        ScalarKind::F32 => writer.write_f32::<B>(value as f32),
        ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => writer.write_f64::<B>(value),
    }
}

fn write_binary_payload<B: ByteOrder, W: Write>(
    writer: &mut W,
    point_cloud: &PointCloud,
    columns: &[Column],
) -> std::io::Result<()> {
    let schema = &point_cloud.metadata.schema;
    for point in &point_cloud.points {
        for column in columns {
            let value = schema.value(point, &column.dimension);
            write_binary_value::<B, W>(writer, column.kind, value)?;
        }
    }
    Ok(())
}

fn write_ascii_payload<W: Write>(
    writer: &mut W,
    point_cloud: &PointCloud,
    columns: &[Column],
) -> std::io::Result<()> {
    let schema = &point_cloud.metadata.schema;
    for point in &point_cloud.points {
        let line = columns
            .iter()
            .map(|column| {
                let value = schema.value(point, &column.dimension);
                match column.kind {
                    ScalarKind::F32 => (value as f32).to_string(),
                    ScalarKind::F64 => value.to_string(),
                    _ => (value as i64).to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

/// Writes the `vertex` element of a PLY file. Returns the number of vertices written.
pub fn write_ply<W: Write>(
    writer: &mut W,
    point_cloud: &PointCloud,
    dims: Option<&[String]>,
    storage: StorageMode,
) -> Result<u64, ExportError> {
    let columns = columns(&point_cloud.metadata.schema, dims)?;
    let ply = header(&columns, point_cloud.points.len(), storage);
    PlyWriter::<DefaultElement>::new().write_header(writer, &ply.header)?;

    match storage {
        StorageMode::LittleEndian => {
            write_binary_payload::<LittleEndian, W>(writer, point_cloud, &columns)?
        }
        StorageMode::BigEndian => {
            write_binary_payload::<BigEndian, W>(writer, point_cloud, &columns)?
        }
        StorageMode::Ascii => write_ascii_payload(writer, point_cloud, &columns)?,
    }
    Ok(point_cloud.points.len() as u64)
}

pub fn write_ply_file(
    path: &Path,
    point_cloud: &PointCloud,
    dims: Option<&[String]>,
    storage: StorageMode,
) -> Result<u64, ExportError> {
    // resolve before creating the file so a bad dimension leaves nothing behind
    columns(&point_cloud.metadata.schema, dims)?;

    let mut writer = BufWriter::new(File::create(path)?);
    let written = write_ply(&mut writer, point_cloud, dims, storage)?;
    writer.flush()?;

    log::debug!("wrote {} vertices to {:?}", written, path);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::{
        point::Point,
        schema::{ExtraDimension, Schema},
    };

    use super::*;

    const DEFAULT_DIMS: &str = "X, Y, Z, Reflectance, Deviation, ReturnNumber, NumberOfReturns,";

    fn cloud() -> PointCloud {
        let schema = Schema {
            extra: vec![
                ExtraDimension {
                    name: "Reflectance".to_string(),
                    kind: ScalarKind::F32,
                    byte_offset: 0,
                    scale: None,
                    offset: None,
                },
                ExtraDimension {
                    name: "Deviation".to_string(),
                    kind: ScalarKind::U16,
                    byte_offset: 4,
                    scale: None,
                    offset: None,
                },
            ],
            ..Default::default()
        };
        let mut point = Point::new(1.0, 2.0, 3.0);
        point.attributes.return_number = 1;
        point.attributes.number_of_returns = 2;
        let mut extra = (-3.5f32).to_le_bytes().to_vec();
        extra.extend_from_slice(&12u16.to_le_bytes());
        point.attributes.extra_bytes = extra;
        PointCloud::new(vec![point], schema)
    }

    #[test]
    fn parse_dims_tolerates_spaces_and_trailing_comma() {
        assert_eq!(
            parse_dims(DEFAULT_DIMS),
            [
                "X",
                "Y",
                "Z",
                "Reflectance",
                "Deviation",
                "ReturnNumber",
                "NumberOfReturns"
            ]
        );
        assert!(parse_dims(" , ").is_empty());
    }

    #[test]
    fn storage_mode_uses_pdal_spelling() {
        assert_eq!(
            serde_json::to_string(&StorageMode::LittleEndian).unwrap(),
            "\"little endian\""
        );
        let mode: StorageMode = serde_json::from_str("\"ascii\"").unwrap();
        assert_eq!(mode, StorageMode::Ascii);
    }

    #[test]
    fn writes_little_endian_header_and_payload() {
        let dims = parse_dims(DEFAULT_DIMS);
        let mut buffer = Vec::new();
        write_ply(&mut buffer, &cloud(), Some(&dims), StorageMode::LittleEndian).unwrap();

        let header_end = buffer
            .windows(b"end_header\n".len())
            .position(|w| w == b"end_header\n")
            .unwrap()
            + b"end_header\n".len();
        let header = String::from_utf8(buffer[..header_end].to_vec()).unwrap();
        assert!(header.contains("format binary_little_endian 1.0"));
        assert!(header.contains("element vertex 1"));
        assert!(header.contains("property double x"));
        assert!(header.contains("property float Reflectance"));
        assert!(header.contains("property ushort Deviation"));
        assert!(header.contains("property uchar NumberOfReturns"));

        // 3 doubles, float, ushort, 2 uchars
        let payload = &buffer[header_end..];
        assert_eq!(payload.len(), 3 * 8 + 4 + 2 + 1 + 1);
        assert_eq!(LittleEndian::read_f64(&payload[0..8]), 1.0);
        assert_eq!(LittleEndian::read_f32(&payload[24..28]), -3.5);
        assert_eq!(LittleEndian::read_u16(&payload[28..30]), 12);
        assert_eq!(payload[30], 1);
        assert_eq!(payload[31], 2);
    }

    #[test]
    fn ascii_payload_is_space_separated() {
        let dims = parse_dims("X,Y,ReturnNumber");
        let mut buffer = Vec::new();
        write_ply(&mut buffer, &cloud(), Some(&dims), StorageMode::Ascii).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("format ascii 1.0"));
        assert!(text.ends_with("end_header\n1 2 1\n"));
    }

    #[test]
    fn unknown_dimension_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("000.ply");
        let dims = parse_dims("X, Y, Amplitude");
        let result = write_ply_file(&path, &cloud(), Some(&dims), StorageMode::LittleEndian);
        assert!(matches!(result, Err(ExportError::UnknownDimension(d)) if d == "Amplitude"));
        assert!(!path.exists());
    }

    #[test]
    fn all_dimensions_when_unspecified() {
        let columns = columns(&cloud().metadata.schema, None).unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(&names[..3], ["x", "y", "z"]);
        assert!(names.contains(&"Reflectance"));
        assert!(!names.contains(&"red"));
    }
}
