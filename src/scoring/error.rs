use thiserror::Error;

use super::factors::Metric;

/// Errors that stop a ranking run before any score is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// Nothing to rank
    #[error("no suppliers to score: at least one supplier is required")]
    EmptyBatch,

    /// A supplier field is missing, non-numeric or outside its domain
    #[error("supplier #{index} ('{name}'): field '{field}' {reason}")]
    InvalidRecord {
        index: usize,
        name: String,
        field: &'static str,
        reason: String,
    },

    /// Weights must be non-negative
    #[error("weight '{metric}' must be non-negative, got {value}")]
    NegativeWeight { metric: Metric, value: f64 },

    /// NaN or infinite weight
    #[error("weight '{metric}' is not a finite number")]
    NonFiniteWeight { metric: Metric },
}

impl ScoreError {
    pub(crate) fn invalid(
        index: usize,
        name: &str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        ScoreError::InvalidRecord {
            index,
            name: name.to_string(),
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_record_message_names_field_and_record() {
        let err = ScoreError::invalid(2, "Acme", "cost", "must be between 100 and 5000, got -5");
        let msg = err.to_string();
        assert!(msg.contains("#2"));
        assert!(msg.contains("Acme"));
        assert!(msg.contains("'cost'"));
        assert!(msg.contains("-5"));
    }

    #[test]
    fn test_negative_weight_message() {
        let err = ScoreError::NegativeWeight {
            metric: Metric::Co2,
            value: -0.5,
        };
        assert_eq!(err.to_string(), "weight 'co2' must be non-negative, got -0.5");
    }
}
