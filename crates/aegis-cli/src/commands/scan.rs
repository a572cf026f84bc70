//! `aegis scan` command implementation

use super::{load_settings, read_input};
use crate::error::CliError;
use crate::output::{OutputFormat, Table, to_json};
use aegis_foundation::{Registry, Scanner, resolve_overlaps, risk_score};
use colored::Colorize;
use serde_json::json;
use std::path::Path;

/// Reports what the gateway would redact. No key is needed and nothing is
/// encrypted or audited.
pub fn run(config: Option<&Path>, format: OutputFormat, text: Option<String>) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    settings.validate()?;
    let text = read_input(text, "TEXT")?;

    let registry = Registry::from_settings(&settings)?;
    let registry_version = registry.version().to_string();
    let scanner = Scanner::new(registry)
        .with_min_confidence(settings.min_confidence)
        .with_detector_timeout(settings.detector_timeout())
        .with_scan_timeout(settings.scan_timeout());

    let findings = scanner.scan(&text, &settings.recognized_entities)?;
    let applied = resolve_overlaps(&findings);
    let risk = risk_score(&applied);

    match format {
        OutputFormat::Text => {
            if findings.is_empty() {
                println!("{} No findings", "✓".green());
                return Ok(());
            }
            println!("{}", Table::findings(&findings));
            println!(
                "{} {} finding(s), {} after overlap resolution, risk score {}",
                "->".yellow(),
                findings.len(),
                applied.len(),
                risk
            );
        }
        OutputFormat::Json => {
            let report = json!({
                "findings": findings,
                "applied": applied.len(),
                "risk_score": risk,
                "registry_version": registry_version,
            });
            println!("{}", to_json(&report)?);
        }
    }
    Ok(())
}
