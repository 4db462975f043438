//! Score command implementation

use crate::config::ExtensionCatalog;
use crate::reporters::{self, OutputFormat, ScoreReport};
use crate::scoring::ExtensionScorer;
use crate::vector::ExtensionVector;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub struct ScoreArgs {
    pub rules: PathBuf,
    pub base_score: Option<f64>,
    pub extension: Option<String>,
    pub ext_version: Option<String>,
    pub no_defaults: bool,
    pub format: String,
    pub output: Option<PathBuf>,
    pub vector: String,
}

pub fn run(args: ScoreArgs) -> Result<()> {
    let catalog = ExtensionCatalog::load(&args.rules)?;
    let mut vector = ExtensionVector::parse(&args.vector);

    let (extension, version) = select(&catalog, &args, &vector)?;
    let rules = catalog.rule_set(&extension, &version)?;
    let tlp = catalog.tlp(Some(&extension), Some(&version));

    if !args.no_defaults {
        vector.fill_defaults(rules);
    }

    let scorer = ExtensionScorer::new(Some(rules));
    let result = scorer.evaluate(args.base_score, &vector);

    if let (Some(score), Some(severity)) = (result.score, result.severity) {
        info!("{extension} {version}: final score {score:.1} ({severity})");
    }

    let report = ScoreReport::build(
        &extension,
        &version,
        &tlp,
        args.base_score,
        &vector,
        rules,
        &result,
    );
    let format: OutputFormat = args.format.parse()?;
    let rendered = reporters::render(&report, format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Pick the extension/version to score under: explicit flags first, then
/// detection from the vector, then the document default.
fn select(
    catalog: &ExtensionCatalog,
    args: &ScoreArgs,
    vector: &ExtensionVector,
) -> Result<(String, String)> {
    if let Some(extension) = &args.extension {
        let version = match &args.ext_version {
            Some(v) => v.clone(),
            None => first_version(catalog, extension)?,
        };
        return Ok((extension.clone(), version));
    }
    if let Some((extension, version)) = catalog.detect_from_vector(vector) {
        return Ok((extension.to_string(), version.to_string()));
    }
    if let Some((extension, version)) = catalog.default_selection() {
        return Ok((extension.to_string(), version.to_string()));
    }
    anyhow::bail!(
        "No extension selected: pass --extension, include the extension in the vector, \
         or declare default_ext in the rules file"
    );
}

fn first_version(catalog: &ExtensionCatalog, extension: &str) -> Result<String> {
    let entry = catalog
        .extensions
        .get(extension)
        .ok_or_else(|| anyhow::anyhow!("unknown extension '{extension}'"))?;
    entry
        .versions
        .keys()
        .next()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("extension '{extension}' declares no versions"))
}
