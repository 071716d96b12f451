use std::collections::BTreeMap;

use pcd_core::pointcloud::point::{Point, PointCloud};

use super::Transform;

/// Splits a point cloud into square XY cells of `length`.
///
/// Cells are anchored at `origin`, or at the cloud's minimum X/Y when none is given.
/// Empty cells produce nothing; cells come out ordered by (column, row).
pub struct SplitterTransform {
    pub length: f64,
    pub origin: Option<(f64, f64)>,
}

impl SplitterTransform {
    pub fn new(length: f64) -> Self {
        Self {
            length,
            origin: None,
        }
    }

    fn cell(&self, point: &Point, origin: (f64, f64)) -> (i64, i64) {
        (
            ((point.x - origin.0) / self.length).floor() as i64,
            ((point.y - origin.1) / self.length).floor() as i64,
        )
    }
}

impl Transform for SplitterTransform {
    fn transform(&self, point_cloud: PointCloud) -> Vec<PointCloud> {
        if point_cloud.is_empty() {
            return Vec::new();
        }

        let bounds = &point_cloud.metadata.bounding_volume;
        let origin = self.origin.unwrap_or((bounds.min[0], bounds.min[1]));
        let schema = point_cloud.metadata.schema.clone();

        let mut cells: BTreeMap<(i64, i64), Vec<Point>> = BTreeMap::new();
        for point in point_cloud.points {
            let cell = self.cell(&point, origin);
            cells.entry(cell).or_default().push(point);
        }

        cells
            .into_values()
            .map(|points| PointCloud::new(points, schema.clone()))
            .collect()
    }
}
