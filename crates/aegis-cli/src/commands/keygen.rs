//! `aegis keygen` command implementation

use aegis_foundation::SecretKey;
use aegis_kernel::config::DEFAULT_KEY_ENV;

/// Prints a fresh 256-bit key. The key goes to stdout only.
pub fn run(env_line: bool) {
    let key = SecretKey::generate().to_base64();
    if env_line {
        println!("{DEFAULT_KEY_ENV}={key}");
    } else {
        println!("{key}");
    }
}
