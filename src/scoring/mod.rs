pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod factors;
pub mod model;
pub mod validation;

pub use config::*;
pub use engine::{
    rank, score, MetricContribution, ScoreBreakdown, ScoreResult, ScoringStrategy, WeightedSum,
};
pub use error::ScoreError;
pub use factors::{normalize_batch, BatchRanges, Features, Metric, MetricRange};
pub use model::FeedForwardModel;
pub use validation::{
    domain_problem, validate_batch, validate_config, validate_record, validate_weights,
    WeightWarning,
};
