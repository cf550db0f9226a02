use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::history::DEFAULT_HISTORY_CAP;
use crate::scoring::{Domains, SelectionConfig, StrategyConfig, WeightConfig};

/// Settings file contents. Every section is optional; missing sections use
/// the built-in defaults.
///
/// Example YAML:
/// ```yaml
/// weights:
///   cost: 0.3
///   co2: 0.25
///   delivery_time: 0.25
///   ethical_score: 0.2
/// selection:
///   top_k: 3
///   min_ethical_score: 50
/// exclude: ["Test*"]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Domains>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyConfig>,

    /// Glob patterns for supplier names to leave out of ranking
    /// Example: ["Test*", "Legacy Supplier"]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    /// Supplier store location (default: ~/.config/supplier-rank/suppliers.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Run history location (default: ~/.config/supplier-rank/history.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_path: Option<PathBuf>,

    /// Maximum number of runs kept in history (default: 100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_cap: Option<usize>,
}

impl Config {
    pub fn effective_weights(&self) -> WeightConfig {
        self.weights.unwrap_or_default()
    }

    pub fn effective_domains(&self) -> Domains {
        self.domains.unwrap_or_default()
    }

    pub fn effective_selection(&self) -> SelectionConfig {
        self.selection.unwrap_or_default()
    }

    pub fn effective_strategy(&self) -> StrategyConfig {
        self.strategy.clone().unwrap_or_default()
    }

    pub fn exclude_patterns(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or(&[])
    }

    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .as_deref()
            .map(super::expand_home)
            .unwrap_or_else(crate::supplier::get_store_path)
    }

    pub fn history_path(&self) -> PathBuf {
        self.history_path
            .as_deref()
            .map(super::expand_home)
            .unwrap_or_else(crate::history::get_history_path)
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap.unwrap_or(DEFAULT_HISTORY_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::FieldDomain;

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.effective_weights(), WeightConfig::default());
        assert_eq!(config.effective_selection().top_k, 3);
        assert_eq!(config.effective_strategy(), StrategyConfig::Weighted);
        assert!(config.exclude_patterns().is_empty());
        assert_eq!(config.history_cap(), 100);
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
weights:
  cost: 0.4
  co2: 0.2
  delivery_time: 0.2
  ethical_score: 0.2
domains:
  cost:
    min: 50
    max: 8000
selection:
  top_k: 5
  min_ethical_score: 50
strategy:
  kind: model
  path: /opt/models/supplier.json
exclude:
  - "Test*"
store_path: /var/lib/suppliers.json
history_cap: 20
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.effective_weights().cost, 0.4);
        assert_eq!(config.effective_domains().cost, FieldDomain::new(50.0, 8000.0));
        assert_eq!(config.effective_domains().co2, FieldDomain::new(50.0, 200.0));
        assert_eq!(config.effective_selection().top_k, 5);
        assert_eq!(config.effective_selection().min_ethical_score, Some(50.0));
        assert_eq!(
            config.effective_strategy(),
            StrategyConfig::Model {
                path: PathBuf::from("/opt/models/supplier.json")
            }
        );
        assert_eq!(config.exclude_patterns(), &["Test*".to_string()]);
        assert_eq!(config.store_path(), PathBuf::from("/var/lib/suppliers.json"));
        assert_eq!(config.history_cap(), 20);
    }

    #[test]
    fn test_unknown_section_rejected() {
        let yaml = "queries: []";
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            weights: Some(WeightConfig::default()),
            selection: Some(SelectionConfig::default()),
            exclude: Some(vec!["Legacy*".to_string()]),
            ..Config::default()
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
