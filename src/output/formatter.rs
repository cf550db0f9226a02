use std::io::IsTerminal;
use chrono::Duration;
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{Width, terminal_size};

use crate::optimize::RankOutcome;
use crate::scoring::analysis::{describe_strengths, standings, Distribution, SelectionSummary};
use crate::scoring::{Metric, ScoreResult};
use crate::supplier::SupplierRecord;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a predicted score with three decimals ("0.823")
pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

/// A ranked supplier for display
pub struct ScoredSupplier<'a> {
    pub result: &'a ScoreResult,
    pub selected: bool,
}

impl<'a> ScoredSupplier<'a> {
    /// Pair every ranked supplier of an outcome with its selection flag
    pub fn from_outcome(outcome: &'a RankOutcome) -> Vec<Self> {
        outcome
            .ranked
            .iter()
            .enumerate()
            .map(|(i, result)| ScoredSupplier {
                result,
                selected: outcome.is_selected(i),
            })
            .collect()
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Fixed-width raw metric columns: cost, CO2, delivery days, ethical score
fn format_metrics(record: &SupplierRecord) -> String {
    format!(
        "{:>9.2}  {:>7.2} kg  {:>3} d  {:>5.1}",
        record.cost, record.co2, record.delivery_time, record.ethical_score
    )
}

/// Format ranked suppliers as a table: Index, Score, Selected marker, Name, Metrics
/// No headers. Selected suppliers are marked with '*'.
/// Index column: 3 chars (fits "99."), right-aligned
pub fn format_scored_table(suppliers: &[ScoredSupplier], use_colors: bool) -> String {
    if suppliers.is_empty() {
        return "No suppliers found.".to_string();
    }

    let term_width = get_terminal_width();
    let index_width = 3;
    let score_width = 6;
    let separator = "  ";

    suppliers
        .iter()
        .enumerate()
        .map(|(idx, scored)| {
            let record = &scored.result.supplier;
            let index_str = format!("{:>2}.", idx + 1);
            let score_padded = format!(
                "{:>width$}",
                format_score(scored.result.predicted_score),
                width = score_width
            );
            let marker = if scored.selected { "*" } else { " " };
            let metrics = format_metrics(record);

            let fixed_width =
                index_width + 1 + score_width + 2 + separator.len() * 2 + metrics.len();
            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&record.name, width - fixed_width)
                }
                // Very narrow terminal, show truncated
                Some(_) => truncate_name(&record.name, 20),
                // No terminal (pipe), don't truncate
                None => record.name.clone(),
            };

            if use_colors {
                let name = if scored.selected {
                    name.green().bold().to_string()
                } else {
                    name
                };
                format!(
                    "{} {} {}{}{}{}{}",
                    index_str.dimmed(),
                    score_padded.bold(),
                    marker.green(),
                    separator,
                    name,
                    separator,
                    metrics.dimmed()
                )
            } else {
                format!(
                    "{} {} {}{}{}{}{}",
                    index_str, score_padded, marker, separator, name, separator, metrics
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked suppliers as tab-separated values for scripting
/// Columns: score, id, name, cost, co2, delivery_time, ethical_score, selected
/// (no headers, no colors; id is empty for unsaved records)
pub fn format_tsv(suppliers: &[ScoredSupplier]) -> String {
    if suppliers.is_empty() {
        return String::new();
    }

    suppliers
        .iter()
        .map(|scored| {
            let record = &scored.result.supplier;
            format!(
                "{:.6}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                scored.result.predicted_score,
                record.id.map(|id| id.to_string()).unwrap_or_default(),
                record.name,
                record.cost,
                record.co2,
                record.delivery_time,
                record.ethical_score,
                if scored.selected { 1 } else { 0 }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct JsonRanked<'a> {
    rank: usize,
    selected: bool,
    #[serde(flatten)]
    result: &'a ScoreResult,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    strategy: &'a str,
    ranked: Vec<JsonRanked<'a>>,
    selection: Option<&'a SelectionSummary>,
    excluded: Vec<&'a str>,
}

/// Format a ranking outcome as pretty-printed JSON, keeping the first `limit` rows
pub fn format_json(outcome: &RankOutcome, limit: usize) -> serde_json::Result<String> {
    let report = JsonReport {
        strategy: &outcome.strategy,
        ranked: outcome
            .ranked
            .iter()
            .enumerate()
            .take(limit)
            .map(|(i, result)| JsonRanked {
                rank: i + 1,
                selected: outcome.is_selected(i),
                result,
            })
            .collect(),
        selection: outcome.summary.as_ref(),
        excluded: outcome.excluded.iter().map(|s| s.name.as_str()).collect(),
    };
    serde_json::to_string_pretty(&report)
}

/// Format stored suppliers one per line: "#id name | cost | CO2 | delivery | ethical"
pub fn format_supplier_list(suppliers: &[SupplierRecord], use_colors: bool) -> String {
    if suppliers.is_empty() {
        return "No suppliers stored.".to_string();
    }

    suppliers
        .iter()
        .map(|s| {
            let id = s.id.map(|id| format!("#{}", id)).unwrap_or_else(|| "-".to_string());
            if use_colors {
                format!(
                    "{:>5} {} | {:.2} | {:.2} kg | {} d | {:.1}",
                    id.dimmed(),
                    s.name.bold(),
                    s.cost,
                    s.co2,
                    s.delivery_time,
                    s.ethical_score
                )
            } else {
                format!(
                    "{:>5} {} | {:.2} | {:.2} kg | {} d | {:.1}",
                    id, s.name, s.cost, s.co2, s.delivery_time, s.ethical_score
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a single supplier with detailed multi-line output
pub fn format_supplier_detail(record: &SupplierRecord, use_colors: bool) -> String {
    let label = record.label();
    let label = if use_colors {
        label.bold().to_string()
    } else {
        label
    };
    format!(
        "{}\n  Cost: {:.2}\n  CO2: {:.2} kg\n  Delivery: {} days\n  Ethical score: {:.1}",
        label, record.cost, record.co2, record.delivery_time, record.ethical_score
    )
}

/// Explain one ranked supplier: per-metric contributions, standing in the
/// batch and a one-line strengths summary.
pub fn format_explain(result: &ScoreResult, ranked: &[ScoreResult], use_colors: bool) -> String {
    let mut lines = Vec::new();
    let header = format!(
        "{}  score {}",
        result.supplier.label(),
        format_score(result.predicted_score)
    );
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    if result.breakdown.contributions.is_empty() {
        for metric in Metric::ALL {
            lines.push(format!(
                "  {:<14} feature {:.3}",
                metric.label(),
                result.breakdown.features.get(metric)
            ));
        }
    } else {
        for c in &result.breakdown.contributions {
            lines.push(format!(
                "  {:<14} feature {:.3}  weight {:.2}  {:+.3}",
                c.metric.label(),
                c.feature,
                c.weight,
                c.points
            ));
        }
    }

    let standings = standings(result, ranked);
    let standing_text = standings
        .iter()
        .map(|s| format!("{} top {:.0}%", s.metric.key(), s.top_percent))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("  Standing: {}", standing_text));

    let strengths = describe_strengths(&standings);
    lines.push(if use_colors {
        format!("  Strengths: {}", strengths.green())
    } else {
        format!("  Strengths: {}", strengths)
    });

    lines.join("\n")
}

/// Per-metric min/mean/max over a ranked set
pub fn format_distribution(distribution: &Distribution) -> String {
    let row = |label: &str, min: f64, mean: f64, max: f64| {
        format!(
            "  {:<14} min {:>9.2}  mean {:>9.2}  max {:>9.2}",
            label, min, mean, max
        )
    };
    let mut lines = vec![
        "Distribution:".to_string(),
        format!(
            "  {:<14} min {:>9.3}  mean {:>9.3}  max {:>9.3}",
            "Score",
            distribution.predicted_score.min,
            distribution.predicted_score.mean,
            distribution.predicted_score.max
        ),
    ];
    for metric in Metric::ALL {
        let stats = distribution.get(metric);
        lines.push(row(metric.label(), stats.min, stats.mean, stats.max));
    }
    lines.join("\n")
}

pub fn format_selection_summary(summary: &SelectionSummary) -> String {
    format!(
        "Selected {} supplier{}: total cost {:.2}, mean CO2 {:.2} kg, mean delivery {:.1} days, mean ethical score {:.1}",
        summary.count,
        if summary.count == 1 { "" } else { "s" },
        summary.total_cost,
        summary.mean_co2,
        summary.mean_delivery_time,
        summary.mean_ethical_score
    )
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}
