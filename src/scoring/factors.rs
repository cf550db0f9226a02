use serde::{Deserialize, Serialize};
use std::fmt;

use crate::supplier::SupplierRecord;

/// The four scoring metrics, in feature-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cost,
    Co2,
    DeliveryTime,
    EthicalScore,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Cost,
        Metric::Co2,
        Metric::DeliveryTime,
        Metric::EthicalScore,
    ];

    /// Field name as it appears in records and config files
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Cost => "cost",
            Metric::Co2 => "co2",
            Metric::DeliveryTime => "delivery_time",
            Metric::EthicalScore => "ethical_score",
        }
    }

    /// Human label for tables and breakdowns
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cost => "Cost",
            Metric::Co2 => "CO2",
            Metric::DeliveryTime => "Delivery",
            Metric::EthicalScore => "Ethics",
        }
    }

    /// Lower raw values are better for cost, CO2 and delivery time
    pub fn lower_is_better(&self) -> bool {
        !matches!(self, Metric::EthicalScore)
    }

    /// Raw value of this metric on a record
    pub fn value_of(&self, record: &SupplierRecord) -> f64 {
        match self {
            Metric::Cost => record.cost,
            Metric::Co2 => record.co2,
            Metric::DeliveryTime => f64::from(record.delivery_time),
            Metric::EthicalScore => record.ethical_score,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Observed min/max of one metric across a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    /// Returns None for an empty iterator
    pub fn observe(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(MetricRange { min: v, max: v }),
            Some(r) => Some(MetricRange {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// Min-max normalize then invert, so the batch minimum maps to 1.0.
    /// A zero-range metric carries no information and scores 1.0 for everyone.
    pub fn inverted(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        1.0 - (value - self.min) / (self.max - self.min)
    }
}

/// Batch-relative ranges for the "lower is better" metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchRanges {
    pub cost: MetricRange,
    pub co2: MetricRange,
    pub delivery_time: MetricRange,
}

impl BatchRanges {
    pub fn observe(suppliers: &[SupplierRecord]) -> Option<Self> {
        Some(BatchRanges {
            cost: MetricRange::observe(suppliers.iter().map(|s| s.cost))?,
            co2: MetricRange::observe(suppliers.iter().map(|s| s.co2))?,
            delivery_time: MetricRange::observe(
                suppliers.iter().map(|s| f64::from(s.delivery_time)),
            )?,
        })
    }
}

/// Normalized feature vector for one supplier. Every component is in [0, 1]
/// for in-domain input and higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub cost: f64,
    pub co2: f64,
    pub delivery_time: f64,
    pub ethical_score: f64,
}

impl Features {
    pub fn from_record(record: &SupplierRecord, ranges: &BatchRanges) -> Self {
        Features {
            cost: ranges.cost.inverted(record.cost),
            co2: ranges.co2.inverted(record.co2),
            delivery_time: ranges.delivery_time.inverted(f64::from(record.delivery_time)),
            // Absolute scale, not batch-relative
            ethical_score: record.ethical_score / 100.0,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cost => self.cost,
            Metric::Co2 => self.co2,
            Metric::DeliveryTime => self.delivery_time,
            Metric::EthicalScore => self.ethical_score,
        }
    }

    /// Feature vector in `Metric::ALL` order, the layout model inputs expect
    pub fn to_array(&self) -> [f64; 4] {
        [self.cost, self.co2, self.delivery_time, self.ethical_score]
    }
}

/// Normalize every record of a batch. Empty batches produce no features.
pub fn normalize_batch(suppliers: &[SupplierRecord]) -> Vec<Features> {
    match BatchRanges::observe(suppliers) {
        Some(ranges) => suppliers
            .iter()
            .map(|s| Features::from_record(s, &ranges))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier(cost: f64, co2: f64, delivery_time: u32, ethical_score: f64) -> SupplierRecord {
        SupplierRecord::new("s", cost, co2, delivery_time, ethical_score)
    }

    #[test]
    fn test_range_observe() {
        let range = MetricRange::observe([300.0, 100.0, 200.0]).unwrap();
        assert_eq!(range.min, 100.0);
        assert_eq!(range.max, 300.0);
    }

    #[test]
    fn test_range_observe_empty() {
        assert!(MetricRange::observe(std::iter::empty()).is_none());
    }

    #[test]
    fn test_inverted_endpoints() {
        let range = MetricRange {
            min: 100.0,
            max: 500.0,
        };
        assert_eq!(range.inverted(100.0), 1.0);
        assert_eq!(range.inverted(500.0), 0.0);
        assert_eq!(range.inverted(300.0), 0.5);
    }

    #[test]
    fn test_inverted_zero_range_is_perfect() {
        let range = MetricRange {
            min: 250.0,
            max: 250.0,
        };
        assert!(range.is_degenerate());
        assert_eq!(range.inverted(250.0), 1.0);
    }

    #[test]
    fn test_ethical_is_absolute() {
        // Both suppliers share ethics 40; batch-relative would give 1.0
        let batch = vec![supplier(100.0, 50.0, 1, 40.0), supplier(200.0, 60.0, 2, 40.0)];
        let features = normalize_batch(&batch);
        assert_eq!(features[0].ethical_score, 0.4);
        assert_eq!(features[1].ethical_score, 0.4);
    }

    #[test]
    fn test_normalize_batch_inverts_lower_is_better() {
        let batch = vec![supplier(100.0, 200.0, 30, 0.0), supplier(5000.0, 50.0, 1, 100.0)];
        let features = normalize_batch(&batch);
        assert_eq!(features[0].cost, 1.0);
        assert_eq!(features[0].co2, 0.0);
        assert_eq!(features[0].delivery_time, 0.0);
        assert_eq!(features[1].cost, 0.0);
        assert_eq!(features[1].co2, 1.0);
        assert_eq!(features[1].delivery_time, 1.0);
    }

    #[test]
    fn test_normalize_empty_batch() {
        assert!(normalize_batch(&[]).is_empty());
    }

    #[test]
    fn test_metric_keys() {
        let keys: Vec<&str> = Metric::ALL.iter().map(|m| m.key()).collect();
        assert_eq!(keys, vec!["cost", "co2", "delivery_time", "ethical_score"]);
        assert!(Metric::Cost.lower_is_better());
        assert!(!Metric::EthicalScore.lower_is_better());
    }
}
