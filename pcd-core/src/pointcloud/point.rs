use super::schema::Schema;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointFlags {
    pub is_synthetic: bool,
    pub is_key_point: bool,
    pub is_withheld: bool,
    pub is_overlap: bool,
    pub is_edge_of_flight_line: bool,
    pub scan_direction_left_to_right: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointAttributes {
    pub intensity: u16,
    pub return_number: u8,
    pub number_of_returns: u8,
    pub classification: u8,
    pub scanner_channel: u8,
    pub scan_angle: f32,
    pub user_data: u8,
    pub point_source_id: u16,
    pub gps_time: Option<f64>,
    pub nir: Option<u16>,
    pub flags: PointFlags,
    // Raw bytes past the standard record; decoded through `Schema::extra`
    pub extra_bytes: Vec<u8>,
}

// LAS data coordinates are stored as scaled integers.
// Points here always hold the real coordinates: x = (raw_x * scale[0]) + offset[0]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: Option<Color>,
    pub attributes: PointAttributes,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointCloud {
    pub points: Vec<Point>,
    pub metadata: Metadata,
}

impl PointCloud {
    pub fn new(points: Vec<Point>, schema: Schema) -> Self {
        let mut bounding_volume = BoundingVolume::empty();
        for point in &points {
            bounding_volume.expand(point.x, point.y, point.z);
        }

        let metadata = Metadata {
            point_count: points.len(),
            bounding_volume,
            schema,
        };

        PointCloud { points, metadata }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends the points of `other`. The schema of `self` is kept.
    pub fn append(&mut self, other: PointCloud) {
        let bounds = &other.metadata.bounding_volume;
        if !other.is_empty() {
            self.metadata
                .bounding_volume
                .expand(bounds.min[0], bounds.min[1], bounds.min[2]);
            self.metadata
                .bounding_volume
                .expand(bounds.max[0], bounds.max[1], bounds.max[2]);
        }
        self.points.extend(other.points);
        self.metadata.point_count = self.points.len();
    }
}

// Axis-aligned bounds of the real coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingVolume {
    pub fn empty() -> Self {
        Self {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        }
    }

    pub fn expand(&mut self, x: f64, y: f64, z: f64) {
        self.min[0] = self.min[0].min(x);
        self.min[1] = self.min[1].min(y);
        self.min[2] = self.min[2].min(z);
        self.max[0] = self.max[0].max(x);
        self.max[1] = self.max[1].max(y);
        self.max[2] = self.max[2].max(z);
    }

    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0]
    }
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub point_count: usize,
    pub bounding_volume: BoundingVolume,
    pub schema: Schema,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_computes_bounds() {
        let pc = PointCloud::new(
            vec![Point::new(1.0, 5.0, -2.0), Point::new(3.0, 2.0, 4.0)],
            Schema::default(),
        );
        assert_eq!(pc.metadata.point_count, 2);
        assert_eq!(pc.metadata.bounding_volume.min, [1.0, 2.0, -2.0]);
        assert_eq!(pc.metadata.bounding_volume.max, [3.0, 5.0, 4.0]);
    }

    #[test]
    fn append_merges_bounds_and_points() {
        let mut pc = PointCloud::new(vec![Point::new(0.0, 0.0, 0.0)], Schema::default());
        let other = PointCloud::new(vec![Point::new(10.0, -1.0, 2.0)], Schema::default());
        pc.append(other);

        assert_eq!(pc.metadata.point_count, 2);
        assert_eq!(pc.metadata.bounding_volume.min, [0.0, -1.0, 0.0]);
        assert_eq!(pc.metadata.bounding_volume.max, [10.0, 0.0, 2.0]);
    }

    #[test]
    fn empty_cloud_has_empty_bounds() {
        let mut pc = PointCloud::new(vec![], Schema::default());
        assert!(pc.metadata.bounding_volume.is_empty());
        pc.append(PointCloud::new(vec![], Schema::default()));
        assert!(pc.is_empty());
        assert!(pc.metadata.bounding_volume.is_empty());
    }
}
