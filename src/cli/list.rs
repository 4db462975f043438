//! List command implementation

use crate::config::ExtensionCatalog;
use anyhow::Result;
use console::style;
use std::path::Path;

pub fn run(rules: &Path) -> Result<()> {
    let catalog = ExtensionCatalog::load(rules)?;

    if catalog.extensions.is_empty() {
        println!("No extensions declared in {}", rules.display());
        return Ok(());
    }

    if let Some((extension, version)) = catalog.default_selection() {
        println!("Default: {} {}\n", style(extension).bold(), version);
    }

    for (name, entry) in &catalog.extensions {
        let tlp = catalog.tlp(Some(name), None);
        println!("{}  {}", style(name).bold(), style(format!("TLP:{tlp}")).dim());
        for (version, ventry) in &entry.versions {
            println!(
                "  {version}: {} metrics, {} combos",
                ventry.rules.metrics.len(),
                ventry.rules.combos.len()
            );
            let display = catalog.display_rules(Some(name), Some(version));
            if !display.hide.is_empty() {
                println!("    hides: {}", join(&display.hide));
            }
            if !display.disable.is_empty() {
                println!("    disables: {}", join(&display.disable));
            }
        }
    }

    Ok(())
}

fn join(set: &std::collections::BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}
