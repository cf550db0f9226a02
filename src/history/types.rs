use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::analysis::SelectionSummary;

/// Number of runs kept before the oldest are dropped
pub const DEFAULT_HISTORY_CAP: usize = 100;

/// One supplier's outcome in a recorded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub supplier_id: Option<u64>,
    pub name: String,
    pub predicted_score: f64,
    pub selected: bool,
}

/// A recorded optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub strategy: String,
    pub num_suppliers: usize,
    /// Entries in rank order
    pub entries: Vec<RunEntry>,
    /// Aggregate of the selected suppliers; None if nothing was selected
    pub selection: Option<SelectionSummary>,
}

impl RunRecord {
    pub fn selected(&self) -> impl Iterator<Item = &RunEntry> {
        self.entries.iter().filter(|e| e.selected)
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.timestamp
    }
}

/// Input for a new run; the history assigns id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewRun {
    pub description: Option<String>,
    pub strategy: String,
    pub entries: Vec<RunEntry>,
    pub selection: Option<SelectionSummary>,
}

/// One point of the trend series: selected-supplier means for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub run_id: u64,
    pub timestamp: DateTime<Utc>,
    pub mean_cost: f64,
    pub mean_co2: f64,
    pub mean_delivery_time: f64,
    pub mean_ethical_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    pub version: u32,
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default)]
    pub runs: Vec<RunRecord>,
}

fn first_id() -> u64 {
    1
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create a new empty history with version 1
    pub fn new() -> Self {
        Self {
            version: 1,
            next_id: first_id(),
            runs: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Append a run stamped now, dropping the oldest runs beyond `cap`
    pub fn record(&mut self, run: NewRun, cap: usize) -> &RunRecord {
        self.record_at(run, Utc::now(), cap)
    }

    pub fn record_at(&mut self, run: NewRun, timestamp: DateTime<Utc>, cap: usize) -> &RunRecord {
        let description = run.description.unwrap_or_else(|| {
            format!(
                "Optimization run at {}",
                timestamp.format("%Y-%m-%d %H:%M:%S")
            )
        });
        let record = RunRecord {
            id: self.next_id,
            timestamp,
            description,
            strategy: run.strategy,
            num_suppliers: run.entries.len(),
            entries: run.entries,
            selection: run.selection,
        };
        self.next_id += 1;
        self.runs.push(record);

        if cap > 0 && self.runs.len() > cap {
            let overflow = self.runs.len() - cap;
            self.runs.drain(..overflow);
        }

        &self.runs[self.runs.len() - 1]
    }

    pub fn get(&self, id: u64) -> Option<&RunRecord> {
        self.runs.iter().find(|r| r.id == id)
    }

    /// Most recent runs first, at most `limit`
    pub fn recent(&self, limit: usize) -> Vec<&RunRecord> {
        let mut runs: Vec<&RunRecord> = self.runs.iter().collect();
        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        runs.truncate(limit);
        runs
    }

    /// Runs no older than `window`, most recent first. A window reaching past
    /// the earliest representable time covers every run.
    pub fn since(&self, window: Duration) -> Vec<&RunRecord> {
        let mut runs: Vec<&RunRecord> = match Utc::now().checked_sub_signed(window) {
            Some(cutoff) => self
                .runs
                .iter()
                .filter(|r| r.timestamp >= cutoff)
                .collect(),
            None => self.runs.iter().collect(),
        };
        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        runs
    }

    /// Selected-supplier means over the last `limit` runs, oldest first.
    ///
    /// `limit` counts runs, not points: runs without a selection are skipped
    /// after the window is taken, so fewer than `limit` points can come back.
    pub fn trends(&self, limit: usize) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = self
            .recent(limit)
            .into_iter()
            .filter_map(|run| {
                let summary = run.selection?;
                Some(TrendPoint {
                    run_id: run.id,
                    timestamp: run.timestamp,
                    mean_cost: summary.total_cost / summary.count as f64,
                    mean_co2: summary.mean_co2,
                    mean_delivery_time: summary.mean_delivery_time,
                    mean_ethical_score: summary.mean_ethical_score,
                })
            })
            .collect();
        points.reverse();
        points
    }

    /// Drop every run. Ids keep counting up.
    pub fn clear(&mut self) -> usize {
        let removed = self.runs.len();
        self.runs.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: f64, selected: bool) -> RunEntry {
        RunEntry {
            supplier_id: None,
            name: name.to_string(),
            predicted_score: score,
            selected,
        }
    }

    fn summary(total_cost: f64, count: usize) -> SelectionSummary {
        SelectionSummary {
            count,
            total_cost,
            mean_co2: 100.0,
            mean_delivery_time: 10.0,
            mean_ethical_score: 70.0,
        }
    }

    fn run(description: Option<&str>, selection: Option<SelectionSummary>) -> NewRun {
        NewRun {
            description: description.map(str::to_string),
            strategy: "weighted".to_string(),
            entries: vec![entry("A", 0.9, true), entry("B", 0.4, false)],
            selection,
        }
    }

    #[test]
    fn test_new_history_empty() {
        let history = History::new();
        assert_eq!(history.version, 1);
        assert!(history.is_empty());
    }

    #[test]
    fn test_record_assigns_id_and_default_description() {
        let mut history = History::new();
        let ts = DateTime::parse_from_rfc3339("2026-03-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = history.record_at(run(None, None), ts, DEFAULT_HISTORY_CAP);
        assert_eq!(record.id, 1);
        assert_eq!(record.num_suppliers, 2);
        assert_eq!(record.description, "Optimization run at 2026-03-01 09:30:00");
        assert_eq!(record.selected().count(), 1);
    }

    #[test]
    fn test_record_keeps_custom_description() {
        let mut history = History::new();
        let record = history.record(run(Some("Q3 sourcing"), None), DEFAULT_HISTORY_CAP);
        assert_eq!(record.description, "Q3 sourcing");
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut history = History::new();
        for _ in 0..5 {
            history.record(run(None, None), 3);
        }
        assert_eq!(history.len(), 3);
        let ids: Vec<u64> = history.runs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert!(history.get(1).is_none());
    }

    #[test]
    fn test_recent_newest_first() {
        let mut history = History::new();
        let base = Utc::now() - Duration::days(3);
        for i in 0..4 {
            history.record_at(run(None, None), base + Duration::hours(i), DEFAULT_HISTORY_CAP);
        }
        let recent = history.recent(2);
        let ids: Vec<u64> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn test_since_filters_by_age() {
        let mut history = History::new();
        history.record_at(run(None, None), Utc::now() - Duration::days(10), DEFAULT_HISTORY_CAP);
        history.record_at(run(None, None), Utc::now() - Duration::hours(2), DEFAULT_HISTORY_CAP);
        let within_week = history.since(Duration::days(7));
        assert_eq!(within_week.len(), 1);
        assert_eq!(within_week[0].id, 2);
    }

    #[test]
    fn test_since_huge_window_returns_all() {
        let mut history = History::new();
        history.record_at(run(None, None), Utc::now() - Duration::days(10), DEFAULT_HISTORY_CAP);
        history.record_at(run(None, None), Utc::now() - Duration::hours(2), DEFAULT_HISTORY_CAP);
        let all = history.since(Duration::days(365 * 1_000_000));
        let ids: Vec<u64> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_trends_chronological_and_skip_empty_selection() {
        let mut history = History::new();
        let base = Utc::now() - Duration::days(1);
        history.record_at(run(None, Some(summary(900.0, 3))), base, DEFAULT_HISTORY_CAP);
        history.record_at(run(None, None), base + Duration::hours(1), DEFAULT_HISTORY_CAP);
        history.record_at(
            run(None, Some(summary(1200.0, 2))),
            base + Duration::hours(2),
            DEFAULT_HISTORY_CAP,
        );

        let trends = history.trends(7);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].run_id, 1);
        assert_eq!(trends[0].mean_cost, 300.0);
        assert_eq!(trends[1].run_id, 3);
        assert_eq!(trends[1].mean_cost, 600.0);
    }

    #[test]
    fn test_trends_limit_takes_latest() {
        let mut history = History::new();
        let base = Utc::now() - Duration::days(1);
        for i in 0..5 {
            history.record_at(
                run(None, Some(summary(300.0, 1))),
                base + Duration::hours(i),
                DEFAULT_HISTORY_CAP,
            );
        }
        let trends = history.trends(2);
        let ids: Vec<u64> = trends.iter().map(|t| t.run_id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_trends_limit_counts_runs_without_selection() {
        let mut history = History::new();
        let base = Utc::now() - Duration::days(1);
        history.record_at(run(None, Some(summary(900.0, 3))), base, DEFAULT_HISTORY_CAP);
        history.record_at(run(None, None), base + Duration::hours(1), DEFAULT_HISTORY_CAP);
        history.record_at(
            run(None, Some(summary(1200.0, 2))),
            base + Duration::hours(2),
            DEFAULT_HISTORY_CAP,
        );

        let trends = history.trends(2);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].run_id, 3);
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.record(run(None, None), DEFAULT_HISTORY_CAP);
        history.record(run(None, None), DEFAULT_HISTORY_CAP);
        assert_eq!(history.clear(), 2);
        assert!(history.is_empty());
        assert_eq!(history.record(run(None, None), DEFAULT_HISTORY_CAP).id, 3);
    }
}
