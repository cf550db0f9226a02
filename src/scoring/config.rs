use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::factors::Metric;

/// Weight configuration.
///
/// One non-negative weight per metric. Weights conventionally sum to 1.0 so
/// that composite scores land in [0, 1], but that is not enforced: an
/// unnormalized set only produces a warning.
///
/// Example YAML:
/// ```yaml
/// weights:
///   cost: 0.30
///   co2: 0.25
///   delivery_time: 0.25
///   ethical_score: 0.20
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightConfig {
    pub cost: f64,
    pub co2: f64,
    pub delivery_time: f64,
    pub ethical_score: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            cost: 0.30,
            co2: 0.25,
            delivery_time: 0.25,
            ethical_score: 0.20,
        }
    }
}

impl WeightConfig {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cost => self.cost,
            Metric::Co2 => self.co2,
            Metric::DeliveryTime => self.delivery_time,
            Metric::EthicalScore => self.ethical_score,
        }
    }

    pub fn sum(&self) -> f64 {
        self.cost + self.co2 + self.delivery_time + self.ethical_score
    }

    /// Rescale so the weights sum to 1.0. None when the sum is zero.
    pub fn normalized(&self) -> Option<Self> {
        let sum = self.sum();
        if sum <= 0.0 || !sum.is_finite() {
            return None;
        }
        Some(Self {
            cost: self.cost / sum,
            co2: self.co2 / sum,
            delivery_time: self.delivery_time / sum,
            ethical_score: self.ethical_score / sum,
        })
    }
}

/// Inclusive bounds for one record field.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldDomain {
    pub min: f64,
    pub max: f64,
}

impl FieldDomain {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Accepted value ranges for supplier records.
///
/// Records outside these bounds are rejected before scoring, never clamped.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Domains {
    #[serde(default = "default_cost_domain")]
    pub cost: FieldDomain,
    #[serde(default = "default_co2_domain")]
    pub co2: FieldDomain,
    #[serde(default = "default_delivery_domain")]
    pub delivery_time: FieldDomain,
    #[serde(default = "default_ethical_domain")]
    pub ethical_score: FieldDomain,
}

fn default_cost_domain() -> FieldDomain {
    FieldDomain::new(100.0, 5000.0)
}

fn default_co2_domain() -> FieldDomain {
    FieldDomain::new(50.0, 200.0)
}

fn default_delivery_domain() -> FieldDomain {
    FieldDomain::new(1.0, 60.0)
}

fn default_ethical_domain() -> FieldDomain {
    FieldDomain::new(0.0, 100.0)
}

impl Default for Domains {
    fn default() -> Self {
        Self {
            cost: default_cost_domain(),
            co2: default_co2_domain(),
            delivery_time: default_delivery_domain(),
            ethical_score: default_ethical_domain(),
        }
    }
}

impl Domains {
    pub fn get(&self, metric: Metric) -> FieldDomain {
        match metric {
            Metric::Cost => self.cost,
            Metric::Co2 => self.co2,
            Metric::DeliveryTime => self.delivery_time,
            Metric::EthicalScore => self.ethical_score,
        }
    }
}

/// Which suppliers count as "selected" after ranking.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// Number of top suppliers to select (default: 3)
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Suppliers below this ethical score are never selected
    /// Example: 50 drops every supplier scoring under 50/100
    #[serde(default)]
    pub min_ethical_score: Option<f64>,
}

fn default_top_k() -> usize {
    3
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_ethical_score: None,
        }
    }
}

/// Scoring strategy selection.
///
/// Example YAML:
/// ```yaml
/// strategy:
///   kind: model
///   path: ~/.config/supplier-rank/model.json
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Linear weighted sum over normalized features
    #[default]
    Weighted,
    /// Feed-forward network loaded from a JSON weights file
    Model { path: PathBuf },
}
