//! CLI command definitions and handlers

mod list;
mod score;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate a base score (0.0-10.0)
fn parse_base_score(s: &str) -> Result<f64, String> {
    let score: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !score.is_finite() {
        Err("base score must be finite".to_string())
    } else if !(0.0..=10.0).contains(&score) {
        Err("base score must be between 0.0 and 10.0".to_string())
    } else {
        Ok(score)
    }
}

/// cvssx - CVSS extension scoring
#[derive(Parser, Debug)]
#[command(name = "cvssx")]
#[command(
    version,
    about = "Score CVSS vectors against organization-defined extension rules",
    long_about = "cvssx augments an externally computed CVSS base score with an extension's \
declarative rules: per-metric modifiers and multi-metric combo rules, producing a final \
clamped score, a severity band, and a full audit trail of which rules fired.",
    after_help = "\
Examples:
  cvssx score -r extension.yaml -b 5.0 'CVSS:4.0/AV:N/KSEC:1.0/EXF:T'
  cvssx score -r extension.yaml -b 5.0 -e KSEC --ext-version 1.0 'EXF:T/RC:C' --format json
  cvssx list -r extension.yaml
  cvssx validate -r extension.yaml"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a vector against an extension's rules
    Score {
        /// Path to the extension rules file (YAML)
        #[arg(long, short = 'r', env = "CVSSX_RULES")]
        rules: PathBuf,

        /// Base CVSS score computed by the standard calculator.
        /// Omitting it yields the "not applicable" empty result.
        #[arg(long, short = 'b', value_parser = parse_base_score)]
        base_score: Option<f64>,

        /// Extension name (default: detected from the vector, then the
        /// document's default_ext)
        #[arg(long, short = 'e')]
        extension: Option<String>,

        /// Extension version
        #[arg(long, requires = "extension")]
        ext_version: Option<String>,

        /// Do not fill declared-but-unset metrics with their defaults
        #[arg(long)]
        no_defaults: bool,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Write output to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// The vector to score, e.g. 'CVSS:4.0/AV:N/.../EXF:T'
        vector: String,
    },

    /// List the extensions and versions a rules file declares
    List {
        /// Path to the extension rules file (YAML)
        #[arg(long, short = 'r', env = "CVSSX_RULES")]
        rules: PathBuf,
    },

    /// Lint a rules file for shapes that evaluate in surprising ways
    Validate {
        /// Path to the extension rules file (YAML)
        #[arg(long, short = 'r', env = "CVSSX_RULES")]
        rules: PathBuf,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Score {
            rules,
            base_score,
            extension,
            ext_version,
            no_defaults,
            format,
            output,
            vector,
        } => score::run(score::ScoreArgs {
            rules,
            base_score,
            extension,
            ext_version,
            no_defaults,
            format,
            output,
            vector,
        }),
        Commands::List { rules } => list::run(&rules),
        Commands::Validate { rules } => validate::run(&rules),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_score_parser_bounds() {
        assert!(parse_base_score("0").is_ok());
        assert!(parse_base_score("10").is_ok());
        assert!(parse_base_score("5.5").is_ok());
        assert!(parse_base_score("10.1").is_err());
        assert!(parse_base_score("-1").is_err());
        assert!(parse_base_score("NaN").is_err());
        assert!(parse_base_score("abc").is_err());
    }

    #[test]
    fn cli_parses_score_command() {
        let cli = Cli::try_parse_from([
            "cvssx", "score", "-r", "ext.yaml", "-b", "5.0", "CVSS:4.0/EXF:T",
        ])
        .unwrap();
        match cli.command {
            Commands::Score {
                base_score, vector, ..
            } => {
                assert_eq!(base_score, Some(5.0));
                assert_eq!(vector, "CVSS:4.0/EXF:T");
            }
            _ => panic!("expected score command"),
        }
    }
}
