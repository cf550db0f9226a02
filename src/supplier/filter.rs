use glob::Pattern;

use super::types::SupplierRecord;

/// Compile exclusion patterns, skipping any that fail to parse
/// (config validation reports those at startup).
pub fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect()
}

/// Check if a supplier name matches any exclusion pattern
pub fn is_excluded(record: &SupplierRecord, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|p| p.matches(&record.name))
}

/// Keep only suppliers that match no exclusion pattern, preserving order
pub fn filter_active_suppliers(
    suppliers: &[SupplierRecord],
    patterns: &[Pattern],
) -> Vec<SupplierRecord> {
    suppliers
        .iter()
        .filter(|s| !is_excluded(s, patterns))
        .cloned()
        .collect()
}

/// Inverse of filter_active_suppliers
pub fn filter_excluded_suppliers(
    suppliers: &[SupplierRecord],
    patterns: &[Pattern],
) -> Vec<SupplierRecord> {
    suppliers
        .iter()
        .filter(|s| is_excluded(s, patterns))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suppliers() -> Vec<SupplierRecord> {
        vec![
            SupplierRecord::new("Acme Metals", 500.0, 100.0, 5, 60.0),
            SupplierRecord::new("Globex", 700.0, 120.0, 8, 40.0),
            SupplierRecord::new("Acme Plastics", 300.0, 180.0, 2, 20.0),
            SupplierRecord::new("Initech", 900.0, 60.0, 20, 90.0),
        ]
    }

    fn patterns(raw: &[&str]) -> Vec<Pattern> {
        compile_patterns(&raw.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_no_patterns_keeps_all() {
        let active = filter_active_suppliers(&suppliers(), &[]);
        assert_eq!(active.len(), 4);
    }

    #[test]
    fn test_glob_excludes_matching_names() {
        let active = filter_active_suppliers(&suppliers(), &patterns(&["Acme*"]));
        let names: Vec<&str> = active.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Globex", "Initech"]);
    }

    #[test]
    fn test_excluded_is_inverse() {
        let excluded = filter_excluded_suppliers(&suppliers(), &patterns(&["Acme*", "Initech"]));
        assert_eq!(excluded.len(), 3);
        assert_eq!(excluded[0].name, "Acme Metals");
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let compiled = patterns(&["[unclosed", "Globex"]);
        assert_eq!(compiled.len(), 1);
    }

    #[test]
    fn test_exact_match_only() {
        let active = filter_active_suppliers(&suppliers(), &patterns(&["Glob"]));
        assert_eq!(active.len(), 4);
    }
}
