use std::fmt;

use super::config::{Domains, FieldDomain, StrategyConfig, WeightConfig};
use super::error::ScoreError;
use super::factors::Metric;
use crate::config::Config;
use crate::supplier::SupplierRecord;

/// Tolerance when checking that weights sum to one
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Non-fatal weight problems. Scoring proceeds, but scores may leave [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub enum WeightWarning {
    UnnormalizedSum { sum: f64 },
}

impl fmt::Display for WeightWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightWarning::UnnormalizedSum { sum } => write!(
                f,
                "weights sum to {:.3} instead of 1.0; scores may fall outside [0, 1]",
                sum
            ),
        }
    }
}

/// Reject negative or non-finite weights; report an unnormalized sum as a warning.
pub fn validate_weights(weights: &WeightConfig) -> Result<Vec<WeightWarning>, ScoreError> {
    for metric in Metric::ALL {
        let value = weights.get(metric);
        if !value.is_finite() {
            return Err(ScoreError::NonFiniteWeight { metric });
        }
        if value < 0.0 {
            return Err(ScoreError::NegativeWeight { metric, value });
        }
    }

    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        Ok(vec![WeightWarning::UnnormalizedSum { sum }])
    } else {
        Ok(Vec::new())
    }
}

/// Check one record against the field domains. Fails on the first bad field.
pub fn validate_record(
    index: usize,
    record: &SupplierRecord,
    domains: &Domains,
) -> Result<(), ScoreError> {
    if record.name.trim().is_empty() {
        return Err(ScoreError::invalid(index, &record.name, "name", "is required"));
    }

    for metric in Metric::ALL {
        let value = metric.value_of(record);
        if !value.is_finite() {
            return Err(ScoreError::invalid(
                index,
                &record.name,
                metric.key(),
                "is not a number",
            ));
        }
        let domain = domains.get(metric);
        if !domain.contains(value) {
            return Err(ScoreError::invalid(
                index,
                &record.name,
                metric.key(),
                format!(
                    "must be between {} and {}, got {}",
                    domain.min, domain.max, value
                ),
            ));
        }
    }

    Ok(())
}

/// Validate a whole batch before scoring: non-empty, every record in domain.
pub fn validate_batch(suppliers: &[SupplierRecord], domains: &Domains) -> Result<(), ScoreError> {
    if suppliers.is_empty() {
        return Err(ScoreError::EmptyBatch);
    }
    for (index, record) in suppliers.iter().enumerate() {
        validate_record(index, record, domains)?;
    }
    Ok(())
}

/// Why a configured domain is unusable for `metric`, if it is.
///
/// Bounds must be finite with `min <= max`, and may not widen past the hard
/// limits: cost and CO2 stay positive, delivery covers at least one whole
/// day starting from day 1, ethical score stays in 0-100.
pub fn domain_problem(metric: Metric, domain: FieldDomain) -> Option<String> {
    if !domain.min.is_finite() || !domain.max.is_finite() {
        return Some("bounds must be finite numbers".to_string());
    }
    if domain.min > domain.max {
        return Some(format!(
            "min ({}) must not exceed max ({})",
            domain.min, domain.max
        ));
    }
    match metric {
        Metric::Cost | Metric::Co2 if domain.min <= 0.0 => Some(format!(
            "min must be greater than 0, got {}",
            domain.min
        )),
        Metric::DeliveryTime if domain.min < 1.0 => Some(format!(
            "min must be at least 1 day, got {}",
            domain.min
        )),
        Metric::DeliveryTime if domain.max.floor() < domain.min.ceil() => Some(format!(
            "range {}-{} contains no whole number of days",
            domain.min, domain.max
        )),
        Metric::EthicalScore if domain.min < 0.0 || domain.max > 100.0 => Some(format!(
            "bounds must lie within 0-100, got {}-{}",
            domain.min, domain.max
        )),
        _ => None,
    }
}

/// Validate the settings file at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref weights) = config.weights {
        for metric in Metric::ALL {
            let value = weights.get(metric);
            if !value.is_finite() {
                errors.push(format!("weights.{}: must be a finite number", metric));
            } else if value < 0.0 {
                errors.push(format!("weights.{}: must be non-negative", metric));
            }
        }
    }

    if let Some(ref domains) = config.domains {
        for metric in Metric::ALL {
            if let Some(problem) = domain_problem(metric, domains.get(metric)) {
                errors.push(format!("domains.{}: {}", metric, problem));
            }
        }
    }

    if let Some(ref selection) = config.selection {
        if selection.top_k == 0 {
            errors.push("selection.top_k: must be at least 1".to_string());
        }
        if let Some(floor) = selection.min_ethical_score {
            if !(0.0..=100.0).contains(&floor) {
                errors.push(format!(
                    "selection.min_ethical_score: must be between 0 and 100, got {}",
                    floor
                ));
            }
        }
    }

    if let Some(StrategyConfig::Model { ref path }) = config.strategy {
        if path.as_os_str().is_empty() {
            errors.push("strategy.path: must not be empty".to_string());
        }
    }

    if let Some(ref patterns) = config.exclude {
        for (i, pattern) in patterns.iter().enumerate() {
            if let Err(e) = glob::Pattern::new(pattern) {
                errors.push(format!("exclude[{}]: invalid pattern '{}' - {}", i, pattern, e));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
