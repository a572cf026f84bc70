use aegis_kernel::error::{ConfigurationError, DecryptionError, GatewayError};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Processing failed during {stage}: {0}", stage = .0.stage())]
    Gateway(#[from] GatewayError),

    #[error("Decryption error: {0}")]
    Decryption(#[from] DecryptionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No input: pass {0} as an argument or pipe it on stdin")]
    NoInput(&'static str),
}
