use super::types::History;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Get the default run history path (~/.config/supplier-rank/history.json)
pub fn get_history_path() -> PathBuf {
    crate::config::get_config_dir().join("history.json")
}

/// Load run history from a JSON file
///
/// If the file doesn't exist, returns a new empty history.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_history(path: &Path) -> Result<History> {
    if !path.exists() {
        return Ok(History::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open run history at {}", path.display()))?;

    let history: History = serde_json::from_reader(file).context("Failed to load run history")?;

    if history.version != 1 {
        anyhow::bail!("Unsupported run history version: {}", history.version);
    }

    Ok(history)
}

/// Save run history to a JSON file atomically
pub fn save_history(path: &Path, history: &History) -> Result<()> {
    crate::config::ensure_parent_dir(path)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, history).context("Failed to serialize run history")?;

    file.commit().context("Failed to save run history")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{NewRun, RunEntry, DEFAULT_HISTORY_CAP};
    use std::env;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let temp_path = env::temp_dir().join("supplier_rank_test_history_missing.json");
        let _ = std::fs::remove_file(&temp_path);

        let history = load_history(&temp_path).unwrap();
        assert_eq!(history.version, 1);
        assert!(history.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_path = env::temp_dir().join("supplier_rank_test_history_roundtrip.json");
        let _ = std::fs::remove_file(&temp_path);

        let mut history = History::new();
        history.record(
            NewRun {
                description: Some("Weekly review".to_string()),
                strategy: "weighted".to_string(),
                entries: vec![RunEntry {
                    supplier_id: Some(4),
                    name: "Acme".to_string(),
                    predicted_score: 0.75,
                    selected: true,
                }],
                selection: None,
            },
            DEFAULT_HISTORY_CAP,
        );

        save_history(&temp_path, &history).unwrap();
        let loaded = load_history(&temp_path).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.next_id, 2);
        assert_eq!(loaded.runs, history.runs);

        let _ = std::fs::remove_file(&temp_path);
    }
}
