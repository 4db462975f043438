//! Validate command implementation

use crate::config::{validate_catalog, ExtensionCatalog};
use anyhow::Result;
use console::style;
use std::path::Path;

pub fn run(rules: &Path) -> Result<()> {
    let catalog = ExtensionCatalog::load(rules)?;
    let issues = validate_catalog(&catalog);

    if issues.is_empty() {
        println!("{}", style("No problems found.").green());
        return Ok(());
    }

    for issue in &issues {
        println!("{} {}", style("warning:").yellow().bold(), issue);
    }
    println!("\n{} problem(s) found in {}", issues.len(), rules.display());
    std::process::exit(1);
}
