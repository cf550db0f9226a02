use serde::Serialize;
use tracing::{debug, warn};

use super::config::{Domains, WeightConfig};
use super::error::ScoreError;
use super::factors::{normalize_batch, Features, Metric};
use super::validation::{validate_batch, validate_weights};
use crate::supplier::SupplierRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricContribution {
    pub metric: Metric,
    pub feature: f64, // Normalized value, higher is better
    pub weight: f64,
    pub points: f64, // weight * feature
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub features: Features,
    pub contributions: Vec<MetricContribution>,
}

/// One ranked supplier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub supplier: SupplierRecord,
    pub predicted_score: f64,
    /// Position of this supplier in the input batch (0-based)
    pub input_index: usize,
    pub breakdown: ScoreBreakdown,
}

/// Anything that turns a normalized feature vector into a predicted score.
///
/// Strategies see features, never raw records, so batch-relative
/// normalization stays in one place and every strategy ranks the same way.
pub trait ScoringStrategy {
    fn name(&self) -> &str;

    fn predict(&self, features: &Features) -> f64;

    /// Per-metric explanation of a prediction, if the strategy has one
    fn contributions(&self, _features: &Features) -> Vec<MetricContribution> {
        Vec::new()
    }
}

/// Linear weighted sum over the four normalized features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSum {
    weights: WeightConfig,
}

impl WeightedSum {
    /// Rejects negative or non-finite weights. An unnormalized sum is logged
    /// and accepted.
    pub fn new(weights: WeightConfig) -> Result<Self, ScoreError> {
        for warning in validate_weights(&weights)? {
            warn!("{}", warning);
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.weights
    }
}

impl ScoringStrategy for WeightedSum {
    fn name(&self) -> &str {
        "weighted"
    }

    fn predict(&self, features: &Features) -> f64 {
        self.weights.cost * features.cost
            + self.weights.co2 * features.co2
            + self.weights.delivery_time * features.delivery_time
            + self.weights.ethical_score * features.ethical_score
    }

    fn contributions(&self, features: &Features) -> Vec<MetricContribution> {
        Metric::ALL
            .iter()
            .map(|&metric| {
                let feature = features.get(metric);
                let weight = self.weights.get(metric);
                MetricContribution {
                    metric,
                    feature,
                    weight,
                    points: weight * feature,
                }
            })
            .collect()
    }
}

/// Rank suppliers with the default weighted-sum strategy and default domains.
pub fn score(
    suppliers: &[SupplierRecord],
    weights: &WeightConfig,
) -> Result<Vec<ScoreResult>, ScoreError> {
    let strategy = WeightedSum::new(*weights)?;
    rank(suppliers, &strategy, &Domains::default())
}

/// Validate, normalize, predict and sort.
///
/// Output is a permutation of the input sorted by `predicted_score`
/// descending. Equal scores keep their input order, so identical input
/// always yields identical output.
pub fn rank(
    suppliers: &[SupplierRecord],
    strategy: &dyn ScoringStrategy,
    domains: &Domains,
) -> Result<Vec<ScoreResult>, ScoreError> {
    validate_batch(suppliers, domains)?;

    let features = normalize_batch(suppliers);
    let mut results: Vec<ScoreResult> = suppliers
        .iter()
        .zip(features)
        .enumerate()
        .map(|(input_index, (supplier, features))| ScoreResult {
            supplier: supplier.clone(),
            predicted_score: strategy.predict(&features),
            input_index,
            breakdown: ScoreBreakdown {
                contributions: strategy.contributions(&features),
                features,
            },
        })
        .collect();

    // sort_by is stable: ties keep input order
    results.sort_by(|a, b| {
        b.predicted_score
            .partial_cmp(&a.predicted_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        strategy = strategy.name(),
        suppliers = results.len(),
        "ranked supplier batch"
    );

    Ok(results)
}
