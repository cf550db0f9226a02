pub mod formatter;
pub mod history;

pub use formatter::{
    format_age, format_distribution, format_explain, format_json, format_score,
    format_scored_table, format_selection_summary, format_supplier_detail, format_supplier_list,
    format_tsv, should_use_colors, ScoredSupplier,
};
pub use history::{format_history_list, format_run_detail, format_trends};
