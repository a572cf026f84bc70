//! `aegis process` command implementation

use super::{load_settings, read_input};
use crate::error::CliError;
use crate::output::{OutputFormat, to_json};
use aegis_foundation::Gateway;
use serde_json::json;
use std::path::Path;

/// Runs the full pipeline on one input.
///
/// On failure nothing but the error is printed. In JSON mode a
/// `{"status": "failed", ...}` object is written to stdout first.
pub fn run(
    actor: &str,
    config: Option<&Path>,
    format: OutputFormat,
    text: Option<String>,
) -> Result<(), CliError> {
    let settings = load_settings(config)?;
    let text = read_input(text, "TEXT")?;
    let gateway = Gateway::from_env(settings)?;

    match gateway.process(&text, actor) {
        Ok(output) => {
            match format {
                OutputFormat::Text => {
                    println!("sanitized:  {}", output.sanitized_text);
                    println!("ciphertext: {}", output.ciphertext_blob);
                }
                OutputFormat::Json => println!("{}", to_json(&output)?),
            }
            Ok(())
        }
        Err(err) => {
            if format == OutputFormat::Json {
                let failure = json!({
                    "status": "failed",
                    "stage": err.stage().as_str(),
                    "error": err.to_string(),
                });
                println!("{}", to_json(&failure)?);
            }
            Err(err.into())
        }
    }
}
