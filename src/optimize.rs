use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::history::{NewRun, RunEntry};
use crate::scoring::analysis::{self, SelectionSummary};
use crate::scoring::{
    rank, FeedForwardModel, ScoreResult, ScoringStrategy, StrategyConfig, WeightConfig,
    WeightedSum,
};
use crate::supplier::{
    compile_patterns, filter_active_suppliers, filter_excluded_suppliers, SupplierRecord,
};

/// Build the configured scoring strategy.
///
/// Weighted strategies reject invalid weights; model strategies fail if the
/// model file cannot be read or has the wrong shape.
pub fn build_strategy(
    config: &StrategyConfig,
    weights: &WeightConfig,
) -> Result<Box<dyn ScoringStrategy>> {
    match config {
        StrategyConfig::Weighted => {
            let strategy = WeightedSum::new(*weights).context("Invalid scoring weights")?;
            Ok(Box::new(strategy))
        }
        StrategyConfig::Model { path } => {
            let path = crate::config::expand_home(path);
            let model = FeedForwardModel::load(&path)?;
            info!(path = %path.display(), layers = model.layers.len(), "loaded scoring model");
            Ok(Box::new(model))
        }
    }
}

/// Result of one ranking pass over the store.
#[derive(Debug, Clone)]
pub struct RankOutcome {
    pub strategy: String,
    /// Every scored supplier, best first
    pub ranked: Vec<ScoreResult>,
    /// Positions in `ranked` that made the selection, in rank order
    pub selected: Vec<usize>,
    pub summary: Option<SelectionSummary>,
    /// Suppliers left out by exclude patterns
    pub excluded: Vec<SupplierRecord>,
}

impl RankOutcome {
    pub fn is_selected(&self, position: usize) -> bool {
        self.selected.contains(&position)
    }

    pub fn selected_results(&self) -> Vec<&ScoreResult> {
        self.selected.iter().map(|&i| &self.ranked[i]).collect()
    }

    /// History entry for this outcome
    pub fn to_new_run(&self, description: Option<String>) -> NewRun {
        let entries = self
            .ranked
            .iter()
            .enumerate()
            .map(|(i, r)| RunEntry {
                supplier_id: r.supplier.id,
                name: r.supplier.name.clone(),
                predicted_score: r.predicted_score,
                selected: self.is_selected(i),
            })
            .collect();
        NewRun {
            description,
            strategy: self.strategy.clone(),
            entries,
            selection: self.summary,
        }
    }
}

/// Drop excluded suppliers, rank the rest and apply the selection rules.
///
/// Errors from the engine (`ScoreError`) pass through unchanged so callers
/// can tell validation failures apart from everything else.
pub fn rank_suppliers(
    suppliers: &[SupplierRecord],
    strategy: &dyn ScoringStrategy,
    config: &Config,
) -> Result<RankOutcome> {
    let patterns = compile_patterns(config.exclude_patterns());
    let active = filter_active_suppliers(suppliers, &patterns);
    let excluded = filter_excluded_suppliers(suppliers, &patterns);

    debug!(
        active = active.len(),
        excluded = excluded.len(),
        "after exclude filter"
    );

    let ranked = rank(&active, strategy, &config.effective_domains())?;

    let selection = config.effective_selection();
    let chosen = analysis::select(&ranked, &selection);
    let summary = analysis::summarize(&chosen);
    let selected: Vec<usize> = chosen
        .iter()
        .filter_map(|c| ranked.iter().position(|r| std::ptr::eq(r, *c)))
        .collect();

    debug!(selected = selected.len(), top_k = selection.top_k, "selection applied");

    Ok(RankOutcome {
        strategy: strategy.name().to_string(),
        ranked,
        selected,
        summary,
        excluded,
    })
}
