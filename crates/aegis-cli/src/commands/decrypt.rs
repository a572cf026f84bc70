//! `aegis decrypt` command implementation

use super::read_input;
use crate::error::CliError;
use aegis_foundation::{AuditCipher, SecretKey};
use std::time::Duration;
use tracing::info;

/// Opens a blob with the key in `key_env` and prints the original text.
pub fn run(ttl: Option<u64>, key_env: &str, blob: Option<String>) -> Result<(), CliError> {
    let blob = read_input(blob, "BLOB")?;
    let cipher = AuditCipher::new(&SecretKey::from_env(key_env)?);

    let plaintext = match ttl {
        Some(secs) => cipher.decrypt_with_ttl(blob.trim(), Duration::from_secs(secs))?,
        None => cipher.decrypt(blob.trim())?,
    };

    info!(key_env, ttl_secs = ?ttl, "Envelope opened");
    println!("{plaintext}");
    Ok(())
}
