use std::path::Path;

use las::{
    point::{Classification, Format, ScanDirection},
    Builder, Header, Writer,
};
use pcd_core::pointcloud::point::Point;

use crate::ExportError;

/// Header for a file derived from `template`: same version, point format, transforms and
/// (E)VLRs, always uncompressed.
pub fn derived_header(template: &Header) -> Result<Header, ExportError> {
    let mut builder = Builder::from(template.clone());
    builder.point_format.is_compressed = false;
    Ok(builder.into_header()?)
}

pub fn to_las_point(point: &Point, format: &Format) -> Result<las::Point, ExportError> {
    let attributes = &point.attributes;
    let flags = &attributes.flags;

    let expected = format.extra_bytes as usize;
    if attributes.extra_bytes.len() != expected {
        return Err(ExportError::ExtraBytesLength {
            expected,
            actual: attributes.extra_bytes.len(),
        });
    }

    Ok(las::Point {
        x: point.x,
        y: point.y,
        z: point.z,
        intensity: attributes.intensity,
        return_number: attributes.return_number,
        number_of_returns: attributes.number_of_returns,
        scan_direction: if flags.scan_direction_left_to_right {
            ScanDirection::LeftToRight
        } else {
            ScanDirection::RightToLeft
        },
        is_edge_of_flight_line: flags.is_edge_of_flight_line,
        classification: Classification::new(attributes.classification)?,
        is_synthetic: flags.is_synthetic,
        is_key_point: flags.is_key_point,
        is_withheld: flags.is_withheld,
        is_overlap: flags.is_overlap,
        scanner_channel: attributes.scanner_channel,
        scan_angle: attributes.scan_angle,
        user_data: attributes.user_data,
        point_source_id: attributes.point_source_id,
        gps_time: format
            .has_gps_time
            .then(|| attributes.gps_time.unwrap_or_default()),
        color: format.has_color.then(|| {
            let c = point.color.unwrap_or_default();
            las::Color {
                red: c.r,
                green: c.g,
                blue: c.b,
            }
        }),
        nir: format.has_nir.then(|| attributes.nir.unwrap_or_default()),
        extra_bytes: attributes.extra_bytes.clone(),
        ..Default::default()
    })
}

/// Writes `points` with the layout of `template`. Returns the number of points written.
pub fn write_las(path: &Path, template: &Header, points: &[Point]) -> Result<u64, ExportError> {
    let header = derived_header(template)?;
    let format = header.point_format().clone();
    let mut writer = Writer::from_path(path, header)?;

    for point in points {
        writer.write_point(to_las_point(point, &format)?)?;
    }
    writer.close()?;

    log::debug!("wrote {} points to {:?}", points.len(), path);
    Ok(points.len() as u64)
}
