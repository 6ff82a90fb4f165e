//! `check` command: load a catalog and lint it

use crate::catalog::EventCatalog;
use crate::lint::{self, LintResult};

/// Load and lint a catalog, printing every finding.
///
/// Returns the lint result; load warnings are printed but not counted.
pub fn run_check(catalog_json: &str) -> anyhow::Result<LintResult> {
    let report = EventCatalog::from_json_str(catalog_json)?;
    for warning in &report.warnings {
        println!("load warning: {}", warning);
    }

    let result = lint::check(&report.catalog);
    for issue in &result.issues {
        println!("{}", issue);
    }
    println!(
        "map {}: {} events, {} errors, {} warnings, {} notes",
        report.catalog.map_id(),
        report.catalog.len(),
        result.error_count,
        result.warning_count,
        result.info_count
    );
    Ok(result)
}
