use super::types::SupplierStore;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Get the default supplier store path (~/.config/supplier-rank/suppliers.json)
pub fn get_store_path() -> PathBuf {
    crate::config::get_config_dir().join("suppliers.json")
}

/// Load the supplier store from a JSON file
///
/// If the file doesn't exist, returns a new empty store.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_store(path: &Path) -> Result<SupplierStore> {
    if !path.exists() {
        return Ok(SupplierStore::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open supplier store at {}", path.display()))?;

    let store: SupplierStore = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load supplier store at {}", path.display()))?;

    if store.version != 1 {
        anyhow::bail!("Unsupported supplier store version: {}", store.version);
    }

    Ok(store)
}

/// Save the supplier store to a JSON file atomically
///
/// Creates the parent directory if it doesn't exist.
pub fn save_store(path: &Path, store: &SupplierStore) -> Result<()> {
    crate::config::ensure_parent_dir(path)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, store).context("Failed to serialize supplier store")?;

    file.commit().context("Failed to save supplier store")?;

    Ok(())
}
