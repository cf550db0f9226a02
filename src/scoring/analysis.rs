//! Read-only projections over a ranking: top-K selection, per-metric
//! distribution, selection summary and percentile standing.

use serde::{Deserialize, Serialize};

use super::config::SelectionConfig;
use super::engine::ScoreResult;
use super::factors::Metric;

/// Share of the batch a supplier must beat to count a metric as a strength
pub const STRENGTH_PERCENTILE: f64 = 25.0;

/// First `k` entries of a ranking (fewer if the ranking is shorter)
pub fn top_k(ranked: &[ScoreResult], k: usize) -> &[ScoreResult] {
    &ranked[..k.min(ranked.len())]
}

/// Apply the selection rules: drop suppliers under the ethical floor, then
/// take the best `top_k` of what remains, in rank order.
pub fn select<'a>(ranked: &'a [ScoreResult], config: &SelectionConfig) -> Vec<&'a ScoreResult> {
    ranked
        .iter()
        .filter(|r| match config.min_ethical_score {
            Some(floor) => r.supplier.ethical_score >= floor,
            None => true,
        })
        .take(config.top_k)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Stats {
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        if count == 0 {
            None
        } else {
            Some(Stats {
                min,
                max,
                mean: sum / count as f64,
            })
        }
    }
}

/// Spread of scores and raw metrics across a ranked set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub predicted_score: Stats,
    pub cost: Stats,
    pub co2: Stats,
    pub delivery_time: Stats,
    pub ethical_score: Stats,
}

impl Distribution {
    pub fn get(&self, metric: Metric) -> &Stats {
        match metric {
            Metric::Cost => &self.cost,
            Metric::Co2 => &self.co2,
            Metric::DeliveryTime => &self.delivery_time,
            Metric::EthicalScore => &self.ethical_score,
        }
    }
}

/// Returns None for an empty ranking
pub fn distribution(ranked: &[ScoreResult]) -> Option<Distribution> {
    let metric = |m: Metric| Stats::of(ranked.iter().map(move |r| m.value_of(&r.supplier)));
    Some(Distribution {
        predicted_score: Stats::of(ranked.iter().map(|r| r.predicted_score))?,
        cost: metric(Metric::Cost)?,
        co2: metric(Metric::Co2)?,
        delivery_time: metric(Metric::DeliveryTime)?,
        ethical_score: metric(Metric::EthicalScore)?,
    })
}

/// Aggregate view of the selected suppliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub count: usize,
    pub total_cost: f64,
    pub mean_co2: f64,
    pub mean_delivery_time: f64,
    pub mean_ethical_score: f64,
}

/// Returns None when nothing was selected
pub fn summarize(selected: &[&ScoreResult]) -> Option<SelectionSummary> {
    if selected.is_empty() {
        return None;
    }
    let n = selected.len() as f64;
    let total = |m: Metric| -> f64 { selected.iter().map(|r| m.value_of(&r.supplier)).sum() };
    Some(SelectionSummary {
        count: selected.len(),
        total_cost: total(Metric::Cost),
        mean_co2: total(Metric::Co2) / n,
        mean_delivery_time: total(Metric::DeliveryTime) / n,
        mean_ethical_score: total(Metric::EthicalScore) / n,
    })
}

/// Where one supplier stands on one metric within its batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Standing {
    pub metric: Metric,
    /// Percentage of the batch at least as good as this supplier (lower is better)
    pub top_percent: f64,
}

impl Standing {
    pub fn is_strength(&self) -> bool {
        self.top_percent <= STRENGTH_PERCENTILE
    }

    pub fn strength_label(&self) -> &'static str {
        match self.metric {
            Metric::Cost => "competitive pricing",
            Metric::Co2 => "excellent environmental performance",
            Metric::DeliveryTime => "superior delivery times",
            Metric::EthicalScore => "outstanding ethical standards",
        }
    }
}

/// Percentile standing of `subject` on every metric, relative to `ranked`.
pub fn standings(subject: &ScoreResult, ranked: &[ScoreResult]) -> Vec<Standing> {
    if ranked.is_empty() {
        return Vec::new();
    }
    let n = ranked.len() as f64;
    Metric::ALL
        .iter()
        .map(|&metric| {
            let own = metric.value_of(&subject.supplier);
            let as_good = ranked
                .iter()
                .filter(|r| {
                    let v = metric.value_of(&r.supplier);
                    if metric.lower_is_better() {
                        v <= own
                    } else {
                        v >= own
                    }
                })
                .count();
            Standing {
                metric,
                top_percent: as_good as f64 / n * 100.0,
            }
        })
        .collect()
}

/// One-line description of why a supplier ranks well
pub fn describe_strengths(standings: &[Standing]) -> String {
    let labels: Vec<&str> = standings
        .iter()
        .filter(|s| s.is_strength())
        .map(|s| s.strength_label())
        .collect();
    match labels.as_slice() {
        [] => "balanced performance across all metrics".to_string(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
