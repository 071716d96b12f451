#![allow(dead_code)]

use std::{fs, path::Path};

use las::{point::Format, Builder, Transform, Vector, Vlr, Writer};
use pcd_parser::reader::las::extra_bytes::{
    encode_descriptor, EXTRA_BYTES_RECORD_ID, EXTRA_BYTES_USER_ID,
};

/// Writes a LAS 1.4 file. With `with_extra` every point carries a scaled `Reflectance`
/// (i16, 0.01) and a `Deviation` (u16) extra dimension.
pub fn write_las(path: &Path, points: &[(f64, f64, f64)], with_extra: bool) {
    let mut builder = Builder::from((1, 4));
    builder.point_format = Format::new(1).unwrap();
    let transform = Transform {
        scale: 0.001,
        offset: 0.0,
    };
    builder.transforms = Vector {
        x: transform,
        y: transform,
        z: transform,
    };
    if with_extra {
        builder.point_format.extra_bytes = 4;
        let mut data = encode_descriptor("Reflectance", 4, Some(0.01), None).to_vec();
        data.extend_from_slice(&encode_descriptor("Deviation", 3, None, None));
        builder.vlrs.push(Vlr {
            user_id: EXTRA_BYTES_USER_ID.to_string(),
            record_id: EXTRA_BYTES_RECORD_ID,
            description: "Extra bytes".to_string(),
            data,
        });
    }

    let mut writer = Writer::from_path(path, builder.into_header().unwrap()).unwrap();
    for (i, (x, y, z)) in points.iter().enumerate() {
        let mut extra_bytes = Vec::new();
        if with_extra {
            extra_bytes.extend_from_slice(&(-(i as i16) * 150).to_le_bytes());
            extra_bytes.extend_from_slice(&(i as u16).to_le_bytes());
        }
        writer
            .write_point(las::Point {
                x: *x,
                y: *y,
                z: *z,
                return_number: 1,
                number_of_returns: 1,
                gps_time: Some(i as f64),
                extra_bytes,
                ..Default::default()
            })
            .unwrap();
    }
    writer.close().unwrap();
}

/// A row of points along X from `x0`, one unit apart.
pub fn strip(x0: f64, count: usize, y: f64) -> Vec<(f64, f64, f64)> {
    (0..count).map(|i| (x0 + i as f64, y, 1.0)).collect()
}

pub fn ply_header(path: &Path) -> String {
    let bytes = fs::read(path).unwrap();
    let end = bytes
        .windows(b"end_header\n".len())
        .position(|w| w == b"end_header\n")
        .unwrap();
    String::from_utf8(bytes[..end].to_vec()).unwrap()
}

pub fn file_names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}
