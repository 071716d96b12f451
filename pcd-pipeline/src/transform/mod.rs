use pcd_core::pointcloud::point::PointCloud;

use crate::PipelineError;

pub mod split;

pub trait Transform {
    fn transform(&self, point_cloud: PointCloud) -> Vec<PointCloud>;
}

/// Runs `transform` over every view and concatenates the results.
pub fn transform_views(transform: &dyn Transform, views: Vec<PointCloud>) -> Vec<PointCloud> {
    let mut next_stage = Vec::new();
    for pc in views {
        next_stage.extend(transform.transform(pc));
    }
    next_stage
}

/// Collapses all views into one. Views must share a schema.
pub fn merge_views(views: Vec<PointCloud>) -> Result<Vec<PointCloud>, PipelineError> {
    let mut views = views.into_iter();
    let Some(mut merged) = views.next() else {
        return Ok(Vec::new());
    };

    for view in views {
        if view.metadata.schema != merged.metadata.schema {
            return Err(PipelineError::Invalid(
                "cannot merge point clouds with different dimensions".to_string(),
            ));
        }
        merged.append(view);
    }
    Ok(vec![merged])
}

#[cfg(test)]
mod tests {
    use pcd_core::pointcloud::{
        point::Point,
        schema::{ExtraDimension, ScalarKind, Schema},
    };

    use super::*;

    #[test]
    fn merge_concatenates_views() {
        let views = vec![
            PointCloud::new(vec![Point::new(0.0, 0.0, 0.0)], Schema::default()),
            PointCloud::new(
                vec![Point::new(1.0, 1.0, 1.0), Point::new(2.0, 2.0, 2.0)],
                Schema::default(),
            ),
        ];
        let merged = merge_views(views).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].metadata.point_count, 3);
        assert_eq!(merged[0].metadata.bounding_volume.max, [2.0, 2.0, 2.0]);
    }

    #[test]
    fn merge_rejects_mismatched_schemas() {
        let extra = Schema {
            extra: vec![ExtraDimension {
                name: "Deviation".to_string(),
                kind: ScalarKind::U16,
                byte_offset: 0,
                scale: None,
                offset: None,
            }],
            ..Default::default()
        };
        let views = vec![
            PointCloud::new(vec![], Schema::default()),
            PointCloud::new(vec![], extra),
        ];
        assert!(merge_views(views).is_err());
        assert!(merge_views(vec![]).unwrap().is_empty());
    }
}
