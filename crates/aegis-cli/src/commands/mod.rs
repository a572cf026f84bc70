//! CLI command implementations

pub mod config_cmd;
pub mod decrypt;
pub mod keygen;
pub mod process;
pub mod scan;

use crate::error::CliError;
use aegis_kernel::config::{GatewaySettings, load_with_env};
use aegis_kernel::error::ConfigurationError;
use std::io::{IsTerminal, Read};
use std::path::Path;

/// Prefix for environment overrides such as `AEGIS_MIN_CONFIDENCE`.
pub const ENV_PREFIX: &str = "AEGIS";

/// Settings from `path` with `AEGIS_*` overrides, or the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<GatewaySettings, CliError> {
    let settings = match path {
        Some(path) => load_with_env::<GatewaySettings>(&path.to_string_lossy(), ENV_PREFIX)
            .map_err(ConfigurationError::from)?,
        None => GatewaySettings::default(),
    };
    Ok(settings)
}

/// The positional argument, or all of stdin when it is absent.
///
/// One trailing newline is dropped from stdin so `echo` pipelines behave
/// like inline arguments.
pub fn read_input(arg: Option<String>, what: &'static str) -> Result<String, CliError> {
    if let Some(arg) = arg {
        return Ok(arg);
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(CliError::NoInput(what));
    }

    let mut buf = String::new();
    stdin.lock().read_to_string(&mut buf)?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}
