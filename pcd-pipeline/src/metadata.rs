use pcd_core::pointcloud::stats::DimensionStatistic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::PipelineError;

pub const STATS_STAGE: &str = "filters.stats";

/// Per-stage metadata returned by an engine, keyed by stage type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub stages: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatsMetadata {
    statistic: Vec<DimensionStatistic>,
}

impl PipelineMetadata {
    /// Accepts what `pdal pipeline --metadata` writes: stage metadata nested under `stages`
    /// or `metadata`, or the stage map itself.
    pub fn from_pdal_json(value: Value) -> Self {
        let stages = match value {
            Value::Object(mut root) => {
                match root.remove("stages").or_else(|| root.remove("metadata")) {
                    Some(Value::Object(stages)) => stages,
                    _ => root,
                }
            }
            _ => Map::new(),
        };
        Self { stages }
    }

    pub fn insert(&mut self, stage: &str, value: Value) {
        self.stages.insert(stage.to_string(), value);
    }

    pub fn set_statistics(&mut self, statistics: &[DimensionStatistic]) -> Result<(), PipelineError> {
        let value = serde_json::to_value(StatsMetadata {
            statistic: statistics.to_vec(),
        })?;
        self.insert(STATS_STAGE, value);
        Ok(())
    }

    pub fn statistics(&self) -> Result<Vec<DimensionStatistic>, PipelineError> {
        let stats = self
            .stages
            .get(STATS_STAGE)
            .ok_or_else(|| PipelineError::Invalid("no filters.stats metadata".to_string()))?;
        let stats: StatsMetadata = serde_json::from_value(stats.clone())?;
        Ok(stats.statistic)
    }

    /// Mean of `dimension` as reported by `filters.stats`.
    pub fn average(&self, dimension: &str) -> Result<f64, PipelineError> {
        self.statistics()?
            .iter()
            .find(|stat| stat.name.eq_ignore_ascii_case(dimension))
            .map(|stat| stat.average)
            .ok_or_else(|| PipelineError::MissingStatistic(dimension.to_string()))
    }
}
