use serde::{Deserialize, Serialize};

/// Summary of one dimension, in the shape `filters.stats` reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionStatistic {
    pub name: String,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub count: u64,
    pub average: f64,
    #[serde(default)]
    pub minimum: f64,
    #[serde(default)]
    pub maximum: f64,
    #[serde(default)]
    pub stddev: f64,
    #[serde(default)]
    pub variance: f64,
}

/// Running mean/variance (Welford), so a pass never keeps the values around.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    name: String,
    position: usize,
    count: u64,
    mean: f64,
    m2: f64,
    minimum: f64,
    maximum: f64,
}

impl StatsAccumulator {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            count: 0,
            mean: 0.0,
            m2: 0.0,
            minimum: f64::MAX,
            maximum: f64::MIN,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.minimum = self.minimum.min(value);
        self.maximum = self.maximum.max(value);
    }

    pub fn finish(self) -> DimensionStatistic {
        let variance = if self.count > 1 {
            self.m2 / (self.count - 1) as f64
        } else {
            0.0
        };
        let (minimum, maximum) = if self.count == 0 {
            (0.0, 0.0)
        } else {
            (self.minimum, self.maximum)
        };

        DimensionStatistic {
            name: self.name,
            position: self.position,
            count: self.count,
            average: self.mean,
            minimum,
            maximum,
            stddev: variance.sqrt(),
            variance,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn accumulates_mean_and_spread() {
        let mut acc = StatsAccumulator::new("X", 0);
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            acc.push(v);
        }
        let stat = acc.finish();

        assert_eq!(stat.count, 8);
        assert_relative_eq!(stat.average, 5.0);
        assert_relative_eq!(stat.minimum, 2.0);
        assert_relative_eq!(stat.maximum, 9.0);
        assert_relative_eq!(stat.variance, 32.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_accumulator_reports_zeroes() {
        let stat = StatsAccumulator::new("Y", 1).finish();
        assert_eq!(stat.count, 0);
        assert_eq!(stat.average, 0.0);
        assert_eq!(stat.minimum, 0.0);
        assert_eq!(stat.maximum, 0.0);
    }

    #[test]
    fn deserializes_pdal_statistic() {
        let json = r#"{"average": 637.5, "count": 4, "maximum": 640.0, "minimum": 635.0,
            "name": "X", "position": 0, "stddev": 2.1, "variance": 4.4}"#;
        let stat: DimensionStatistic = serde_json::from_str(json).unwrap();
        assert_eq!(stat.name, "X");
        assert_relative_eq!(stat.average, 637.5);
    }
}
