use byteorder::{ByteOrder as _, LittleEndian};

use super::point::{Color, Point};

/// Storage type of a single dimension value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl ScalarKind {
    pub fn size(&self) -> usize {
        match self {
            ScalarKind::I8 | ScalarKind::U8 => 1,
            ScalarKind::I16 | ScalarKind::U16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => 8,
        }
    }

    // Data types of the LAS 1.4 extra bytes descriptor. 0 (undocumented) has no scalar kind.
    pub fn from_extra_bytes_type(data_type: u8) -> Option<Self> {
        match data_type {
            1 => Some(ScalarKind::U8),
            2 => Some(ScalarKind::I8),
            3 => Some(ScalarKind::U16),
            4 => Some(ScalarKind::I16),
            5 => Some(ScalarKind::U32),
            6 => Some(ScalarKind::I32),
            7 => Some(ScalarKind::U64),
            8 => Some(ScalarKind::I64),
            9 => Some(ScalarKind::F32),
            10 => Some(ScalarKind::F64),
            _ => None,
        }
    }

    fn read_le(&self, bytes: &[u8]) -> f64 {
        match self {
            ScalarKind::I8 => bytes[0] as i8 as f64,
            ScalarKind::U8 => bytes[0] as f64,
            ScalarKind::I16 => LittleEndian::read_i16(bytes) as f64,
            ScalarKind::U16 => LittleEndian::read_u16(bytes) as f64,
            ScalarKind::I32 => LittleEndian::read_i32(bytes) as f64,
            ScalarKind::U32 => LittleEndian::read_u32(bytes) as f64,
            ScalarKind::I64 => LittleEndian::read_i64(bytes) as f64,
            ScalarKind::U64 => LittleEndian::read_u64(bytes) as f64,
            ScalarKind::F32 => LittleEndian::read_f32(bytes) as f64,
            ScalarKind::F64 => LittleEndian::read_f64(bytes),
        }
    }
}

/// Dimensions every LAS point format can (potentially) carry, named the way PDAL names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardDimension {
    X,
    Y,
    Z,
    Intensity,
    ReturnNumber,
    NumberOfReturns,
    Classification,
    ScanChannel,
    ScanAngleRank,
    UserData,
    PointSourceId,
    GpsTime,
    Red,
    Green,
    Blue,
    Infrared,
}

impl StandardDimension {
    pub const ALL: [StandardDimension; 16] = [
        StandardDimension::X,
        StandardDimension::Y,
        StandardDimension::Z,
        StandardDimension::Intensity,
        StandardDimension::ReturnNumber,
        StandardDimension::NumberOfReturns,
        StandardDimension::Classification,
        StandardDimension::ScanChannel,
        StandardDimension::ScanAngleRank,
        StandardDimension::UserData,
        StandardDimension::PointSourceId,
        StandardDimension::GpsTime,
        StandardDimension::Red,
        StandardDimension::Green,
        StandardDimension::Blue,
        StandardDimension::Infrared,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StandardDimension::X => "X",
            StandardDimension::Y => "Y",
            StandardDimension::Z => "Z",
            StandardDimension::Intensity => "Intensity",
            StandardDimension::ReturnNumber => "ReturnNumber",
            StandardDimension::NumberOfReturns => "NumberOfReturns",
            StandardDimension::Classification => "Classification",
            StandardDimension::ScanChannel => "ScanChannel",
            StandardDimension::ScanAngleRank => "ScanAngleRank",
            StandardDimension::UserData => "UserData",
            StandardDimension::PointSourceId => "PointSourceId",
            StandardDimension::GpsTime => "GpsTime",
            StandardDimension::Red => "Red",
            StandardDimension::Green => "Green",
            StandardDimension::Blue => "Blue",
            StandardDimension::Infrared => "Infrared",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|dim| dim.name().eq_ignore_ascii_case(name))
    }

    pub fn kind(&self) -> ScalarKind {
        match self {
            StandardDimension::X
            | StandardDimension::Y
            | StandardDimension::Z
            | StandardDimension::GpsTime => ScalarKind::F64,
            StandardDimension::ScanAngleRank => ScalarKind::F32,
            StandardDimension::Intensity
            | StandardDimension::PointSourceId
            | StandardDimension::Red
            | StandardDimension::Green
            | StandardDimension::Blue
            | StandardDimension::Infrared => ScalarKind::U16,
            StandardDimension::ReturnNumber
            | StandardDimension::NumberOfReturns
            | StandardDimension::Classification
            | StandardDimension::ScanChannel
            | StandardDimension::UserData => ScalarKind::U8,
        }
    }

    /// Stores `value` on `point`, truncating to the dimension's storage type.
    pub fn assign(&self, point: &mut Point, value: f64) {
        let attributes = &mut point.attributes;
        match self {
            StandardDimension::X => point.x = value,
            StandardDimension::Y => point.y = value,
            StandardDimension::Z => point.z = value,
            StandardDimension::Intensity => attributes.intensity = value as u16,
            StandardDimension::ReturnNumber => attributes.return_number = value as u8,
            StandardDimension::NumberOfReturns => attributes.number_of_returns = value as u8,
            StandardDimension::Classification => attributes.classification = value as u8,
            StandardDimension::ScanChannel => attributes.scanner_channel = value as u8,
            StandardDimension::ScanAngleRank => attributes.scan_angle = value as f32,
            StandardDimension::UserData => attributes.user_data = value as u8,
            StandardDimension::PointSourceId => attributes.point_source_id = value as u16,
            StandardDimension::GpsTime => attributes.gps_time = Some(value),
            StandardDimension::Red => point.color.get_or_insert_with(Color::default).r = value as u16,
            StandardDimension::Green => point.color.get_or_insert_with(Color::default).g = value as u16,
            StandardDimension::Blue => point.color.get_or_insert_with(Color::default).b = value as u16,
            StandardDimension::Infrared => attributes.nir = Some(value as u16),
        }
    }
}

/// A dimension stored in the per-point extra bytes, as described by an extra bytes descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraDimension {
    pub name: String,
    pub kind: ScalarKind,
    pub byte_offset: usize,
    pub scale: Option<f64>,
    pub offset: Option<f64>,
}

impl ExtraDimension {
    /// Type of the decoded value. Scaled or offset values are always widened to f64.
    pub fn value_kind(&self) -> ScalarKind {
        if self.scale.is_some() || self.offset.is_some() {
            ScalarKind::F64
        } else {
            self.kind
        }
    }

    pub fn decode(&self, extra_bytes: &[u8]) -> Option<f64> {
        let end = self.byte_offset + self.kind.size();
        let bytes = extra_bytes.get(self.byte_offset..end)?;
        let raw = self.kind.read_le(bytes);
        Some(raw * self.scale.unwrap_or(1.0) + self.offset.unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Standard(StandardDimension),
    Extra(usize),
}

/// Which dimensions the points of a cloud carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub has_color: bool,
    pub has_gps_time: bool,
    pub has_nir: bool,
    pub extra: Vec<ExtraDimension>,
}

impl Schema {
    /// Looks a dimension up by name, case-insensitively. `None` when the points don't carry it.
    pub fn resolve(&self, name: &str) -> Option<Dimension> {
        if let Some(index) = self
            .extra
            .iter()
            .position(|extra| extra.name.eq_ignore_ascii_case(name))
        {
            return Some(Dimension::Extra(index));
        }

        let standard = StandardDimension::from_name(name)?;
        let available = match standard {
            StandardDimension::Red | StandardDimension::Green | StandardDimension::Blue => {
                self.has_color
            }
            StandardDimension::GpsTime => self.has_gps_time,
            StandardDimension::Infrared => self.has_nir,
            _ => true,
        };
        available.then_some(Dimension::Standard(standard))
    }

    pub fn name<'a>(&'a self, dimension: &Dimension) -> &'a str {
        match dimension {
            Dimension::Standard(standard) => standard.name(),
            Dimension::Extra(index) => &self.extra[*index].name,
        }
    }

    pub fn kind(&self, dimension: &Dimension) -> ScalarKind {
        match dimension {
            Dimension::Standard(standard) => standard.kind(),
            Dimension::Extra(index) => self.extra[*index].value_kind(),
        }
    }

    pub fn value(&self, point: &Point, dimension: &Dimension) -> f64 {
        let attributes = &point.attributes;
        match dimension {
            Dimension::Standard(standard) => match standard {
                StandardDimension::X => point.x,
                StandardDimension::Y => point.y,
                StandardDimension::Z => point.z,
                StandardDimension::Intensity => attributes.intensity as f64,
                StandardDimension::ReturnNumber => attributes.return_number as f64,
                StandardDimension::NumberOfReturns => attributes.number_of_returns as f64,
                StandardDimension::Classification => attributes.classification as f64,
                StandardDimension::ScanChannel => attributes.scanner_channel as f64,
                StandardDimension::ScanAngleRank => attributes.scan_angle as f64,
                StandardDimension::UserData => attributes.user_data as f64,
                StandardDimension::PointSourceId => attributes.point_source_id as f64,
                StandardDimension::GpsTime => attributes.gps_time.unwrap_or_default(),
                StandardDimension::Red => point.color.map(|c| c.r).unwrap_or_default() as f64,
                StandardDimension::Green => point.color.map(|c| c.g).unwrap_or_default() as f64,
                StandardDimension::Blue => point.color.map(|c| c.b).unwrap_or_default() as f64,
                StandardDimension::Infrared => attributes.nir.unwrap_or_default() as f64,
            },
            Dimension::Extra(index) => self.extra[*index]
                .decode(&attributes.extra_bytes)
                .unwrap_or_default(),
        }
    }
}
