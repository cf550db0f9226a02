pub mod filter;
pub mod storage;
pub mod types;

pub use filter::{compile_patterns, filter_active_suppliers, filter_excluded_suppliers, is_excluded};
pub use storage::{get_store_path, load_store, save_store};
pub use types::{SupplierPatch, SupplierRecord, SupplierStore};
