use owo_colors::OwoColorize;

use super::formatter::{format_age, format_score};
use crate::history::{RunRecord, TrendPoint};

const MAX_LISTED_NAMES: usize = 3;

fn selected_names(run: &RunRecord) -> String {
    let names: Vec<&str> = run.selected().map(|e| e.name.as_str()).collect();
    match names.len() {
        0 => "nothing selected".to_string(),
        n if n <= MAX_LISTED_NAMES => names.join(", "),
        n => format!(
            "{} +{} more",
            names[..MAX_LISTED_NAMES].join(", "),
            n - MAX_LISTED_NAMES
        ),
    }
}

/// Format recorded runs one per line:
/// "#id  age  strategy  N suppliers  description -> selected names"
pub fn format_history_list(runs: &[&RunRecord], use_colors: bool) -> String {
    if runs.is_empty() {
        return "No runs recorded.".to_string();
    }

    runs.iter()
        .map(|run| {
            let id = format!("#{}", run.id);
            let age = format!("{:>4}", format_age(run.age()));
            let count = format!("{:>3} suppliers", run.num_suppliers);
            if use_colors {
                format!(
                    "{:>5}  {}  {:<8}  {}  {} -> {}",
                    id.dimmed(),
                    age,
                    run.strategy.cyan(),
                    count,
                    run.description.bold(),
                    selected_names(run).green()
                )
            } else {
                format!(
                    "{:>5}  {}  {:<8}  {}  {} -> {}",
                    id,
                    age,
                    run.strategy,
                    count,
                    run.description,
                    selected_names(run)
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a single run with its full ranking
pub fn format_run_detail(run: &RunRecord, use_colors: bool) -> String {
    let header = format!("#{} {}", run.id, run.description);
    let mut lines = vec![
        if use_colors {
            header.bold().to_string()
        } else {
            header
        },
        format!(
            "  Recorded: {} ({} ago)",
            run.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            format_age(run.age())
        ),
        format!("  Strategy: {}", run.strategy),
    ];
    for (i, entry) in run.entries.iter().enumerate() {
        let marker = if entry.selected { "*" } else { " " };
        lines.push(format!(
            "  {:>2}. {} {} {}",
            i + 1,
            format_score(entry.predicted_score),
            marker,
            entry.name
        ));
    }
    lines.join("\n")
}

/// Format trend points as a small table, oldest first
pub fn format_trends(points: &[TrendPoint]) -> String {
    if points.is_empty() {
        return "No runs with a selection recorded.".to_string();
    }

    let mut lines = vec![format!(
        "{:>5}  {:<10}  {:>10}  {:>9}  {:>9}  {:>8}",
        "run", "date", "mean cost", "mean CO2", "delivery", "ethical"
    )];
    for p in points {
        lines.push(format!(
            "{:>5}  {:<10}  {:>10.2}  {:>9.2}  {:>9.1}  {:>8.1}",
            format!("#{}", p.run_id),
            p.timestamp.format("%Y-%m-%d"),
            p.mean_cost,
            p.mean_co2,
            p.mean_delivery_time,
            p.mean_ethical_score
        ));
    }
    lines.join("\n")
}
