use byteorder::{ByteOrder as _, LittleEndian};
use las::{Header, Vlr};
use pcd_core::pointcloud::schema::{ExtraDimension, ScalarKind};

use crate::ParseError;

pub const EXTRA_BYTES_USER_ID: &str = "LASF_Spec";
pub const EXTRA_BYTES_RECORD_ID: u16 = 4;
pub const DESCRIPTOR_LEN: usize = 192;

const OPTION_SCALE: u8 = 1 << 3;
const OPTION_OFFSET: u8 = 1 << 4;

pub fn is_extra_bytes_vlr(vlr: &Vlr) -> bool {
    vlr.user_id == EXTRA_BYTES_USER_ID && vlr.record_id == EXTRA_BYTES_RECORD_ID
}

/// Reads the extra dimensions described in the header's extra bytes (E)VLR.
pub fn extra_dimensions(header: &Header) -> Result<Vec<ExtraDimension>, ParseError> {
    let Some(vlr) = header
        .vlrs()
        .iter()
        .chain(header.evlrs().iter())
        .find(|vlr| is_extra_bytes_vlr(vlr))
    else {
        return Ok(Vec::new());
    };

    let dims = parse_descriptors(&vlr.data)?;
    let described: usize = dims.last().map(|d| d.byte_offset + d.kind.size()).unwrap_or(0);
    let available = header.point_format().extra_bytes as usize;
    if described > available {
        return Err(ParseError::ExtraBytes(format!(
            "descriptors cover {} bytes but points carry {}",
            described, available
        )));
    }
    Ok(dims)
}

pub fn parse_descriptors(data: &[u8]) -> Result<Vec<ExtraDimension>, ParseError> {
    if data.len() % DESCRIPTOR_LEN != 0 {
        return Err(ParseError::ExtraBytes(format!(
            "record length {} is not a multiple of {}",
            data.len(),
            DESCRIPTOR_LEN
        )));
    }

    let mut dims = Vec::new();
    let mut byte_offset = 0;
    for descriptor in data.chunks_exact(DESCRIPTOR_LEN) {
        let data_type = descriptor[2];
        let options = descriptor[3];

        // undocumented bytes: `options` holds their length
        if data_type == 0 {
            byte_offset += options as usize;
            continue;
        }

        let kind = ScalarKind::from_extra_bytes_type(data_type).ok_or_else(|| {
            ParseError::ExtraBytes(format!("unsupported data type {}", data_type))
        })?;

        let name_bytes = &descriptor[4..36];
        let name_len = name_bytes.iter().position(|b| *b == 0).unwrap_or(32);
        let name = String::from_utf8_lossy(&name_bytes[..name_len])
            .trim()
            .to_string();

        let scale = (options & OPTION_SCALE != 0).then(|| LittleEndian::read_f64(&descriptor[112..120]));
        let offset = (options & OPTION_OFFSET != 0).then(|| LittleEndian::read_f64(&descriptor[136..144]));

        dims.push(ExtraDimension {
            name,
            kind,
            byte_offset,
            scale,
            offset,
        });
        byte_offset += kind.size();
    }

    Ok(dims)
}

/// Builds one 192 byte descriptor. Used to write extra bytes VLRs for derived files and fixtures.
pub fn encode_descriptor(
    name: &str,
    data_type: u8,
    scale: Option<f64>,
    offset: Option<f64>,
) -> [u8; DESCRIPTOR_LEN] {
    let mut descriptor = [0u8; DESCRIPTOR_LEN];
    descriptor[2] = data_type;

    let mut options = 0;
    if let Some(scale) = scale {
        options |= OPTION_SCALE;
        LittleEndian::write_f64(&mut descriptor[112..120], scale);
    }
    if let Some(offset) = offset {
        options |= OPTION_OFFSET;
        LittleEndian::write_f64(&mut descriptor[136..144], offset);
    }
    descriptor[3] = options;

    let name = name.as_bytes();
    let len = name.len().min(32);
    descriptor[4..4 + len].copy_from_slice(&name[..len]);
    descriptor
}
