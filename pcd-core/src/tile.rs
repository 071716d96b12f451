//! Tile identifiers and the records of the tile index.
//!
//! A tile's output file name is derived from its [`TileId`], and the indexer derives the
//! id back from the file name, so both directions live here.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Auto-numbered ids are zero-padded to at least this many digits.
pub const MIN_ID_DIGITS: usize = 3;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TileIdError {
    #[error("tile id '{0}' is not an integer")]
    NotNumeric(String),
    #[error("no usable file stem in {0:?}")]
    MissingStem(PathBuf),
    #[error("malformed index record '{0}'")]
    MalformedRecord(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileId {
    Sequence(u32),
    Preserved(String),
}

impl TileId {
    /// Stems made only of ASCII digits become `Sequence`, anything else is kept verbatim.
    pub fn from_stem(stem: &str) -> Self {
        if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = stem.parse::<u32>() {
                return TileId::Sequence(n);
            }
        }
        TileId::Preserved(stem.to_string())
    }

    pub fn from_path(path: &Path) -> Result<Self, TileIdError> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(Self::from_stem)
            .ok_or_else(|| TileIdError::MissingStem(path.to_path_buf()))
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self, extension)
    }

    /// The integer the tile index stores.
    pub fn sequence(&self) -> Result<u32, TileIdError> {
        match self {
            TileId::Sequence(n) => Ok(*n),
            TileId::Preserved(s) => s
                .parse::<u32>()
                .map_err(|_| TileIdError::NotNumeric(s.clone())),
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileId::Sequence(n) => write!(f, "{:0width$}", n, width = MIN_ID_DIGITS),
            TileId::Preserved(s) => f.write_str(s),
        }
    }
}

/// One unit of conversion work: an id and the single file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub path: PathBuf,
}

impl Tile {
    pub fn new(id: TileId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    pub fn output_path(&self, dir: &Path, extension: &str) -> PathBuf {
        dir.join(self.id.file_name(extension))
    }
}

/// Numbers `paths` from 0 in the given order.
pub fn enumerate_tiles(paths: Vec<PathBuf>) -> Vec<Tile> {
    paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| Tile::new(TileId::Sequence(i as u32), path))
        .collect()
}

/// A line of the tile index: `<id> <centroid x> <centroid y>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexRecord {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

impl IndexRecord {
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for IndexRecord {
    // Debug formatting keeps the decimal point on integral floats ("12.0")
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {:?}", self.id, self.x, self.y)
    }
}

impl FromStr for IndexRecord {
    type Err = TileIdError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || TileIdError::MalformedRecord(line.to_string());
        let mut fields = line.split_whitespace();
        let id = fields.next().ok_or_else(malformed)?;
        let x = fields.next().ok_or_else(malformed)?;
        let y = fields.next().ok_or_else(malformed)?;
        if fields.next().is_some() {
            return Err(malformed());
        }

        Ok(IndexRecord {
            id: id.parse().map_err(|_| malformed())?,
            x: x.parse().map_err(|_| malformed())?,
            y: y.parse().map_err(|_| malformed())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_ids_are_padded_to_three_digits() {
        assert_eq!(TileId::Sequence(0).file_name("ply"), "000.ply");
        assert_eq!(TileId::Sequence(7).file_name("ply"), "007.ply");
        assert_eq!(TileId::Sequence(42).to_string(), "042");
        assert_eq!(TileId::Sequence(1234).to_string(), "1234");
    }

    #[test]
    fn preserved_ids_are_kept_verbatim() {
        let id = TileId::from_stem("scan_north");
        assert_eq!(id, TileId::Preserved("scan_north".to_string()));
        assert_eq!(id.file_name("ply"), "scan_north.ply");
        assert_eq!(
            id.sequence(),
            Err(TileIdError::NotNumeric("scan_north".to_string()))
        );
        assert_eq!(TileId::Preserved("0042".to_string()).sequence(), Ok(42));
    }

    #[test]
    fn file_names_round_trip_through_paths() {
        for id in [TileId::Sequence(3), TileId::Sequence(250), TileId::Sequence(1000)] {
            let path = PathBuf::from("/tmp/out").join(id.file_name("ply"));
            assert_eq!(TileId::from_path(&path).unwrap(), id);
        }
        let id = TileId::Preserved("a1".to_string());
        let path = PathBuf::from(id.file_name("ply"));
        assert_eq!(TileId::from_path(&path).unwrap(), id);
    }

    #[test]
    fn over_padded_stems_still_parse_as_integers() {
        assert_eq!(TileId::from_stem("0012").sequence(), Ok(12));
        assert_eq!(
            TileId::from_stem("99999999999"),
            TileId::Preserved("99999999999".to_string())
        );
    }

    #[test]
    fn enumerate_numbers_from_zero() {
        let tiles = enumerate_tiles(vec![PathBuf::from("a.las"), PathBuf::from("b.las")]);
        assert_eq!(tiles[0].id, TileId::Sequence(0));
        assert_eq!(tiles[1].id, TileId::Sequence(1));
        assert_eq!(
            tiles[1].output_path(Path::new("out"), "ply"),
            PathBuf::from("out/001.ply")
        );
    }

    #[test]
    fn index_record_line_format() {
        let record = IndexRecord {
            id: 3,
            x: 12.0,
            y: 4.25,
        };
        assert_eq!(record.to_line(), "3 12.0 4.25\n");
        assert_eq!("3 12.0 4.25".parse::<IndexRecord>().unwrap(), record);
        assert!("3 12.0".parse::<IndexRecord>().is_err());
        assert!("x 1 2".parse::<IndexRecord>().is_err());
    }
}
