//! `aegis config` command implementations

use super::load_settings;
use crate::error::CliError;
use crate::output::Table;
use aegis_foundation::{Registry, SecretKey};
use aegis_kernel::Recognizer;
use aegis_kernel::error::ConfigurationError;
use colored::Colorize;
use std::path::Path;

/// Checks everything a gateway build checks, except that a missing key is
/// reported instead of failing.
pub fn run_validate(file: &Path) -> Result<(), CliError> {
    let settings = load_settings(Some(file))?;
    settings.validate()?;

    let registry = Registry::from_settings(&settings)?;
    let policy = settings.redaction_policy();
    if let Some(entity) = policy.first_uncovered(&settings.recognized_entities) {
        return Err(ConfigurationError::PolicyMissing(entity).into());
    }

    let key_status = match SecretKey::from_env(&settings.key_env) {
        Ok(_) => "present",
        Err(ConfigurationError::MissingKey(_)) => "not set",
        Err(_) => "invalid",
    };

    println!("{} {} is valid", "✓".green(), file.display());

    let detectors = registry
        .detectors()
        .iter()
        .map(|d| d.name())
        .collect::<Vec<_>>()
        .join(", ");
    let table = Table::builder()
        .headers(&["Setting", "Value"])
        .add_row(&["language", &settings.language])
        .add_row(&["entities", &settings.recognized_entities.to_string()])
        .add_row(&["min_confidence", &settings.min_confidence.to_string()])
        .add_row(&["detectors", &detectors])
        .add_row(&["registry_version", registry.version()])
        .add_row(&["key", &format!("{} ({})", settings.key_env, key_status)])
        .build();
    println!("{table}");
    Ok(())
}
