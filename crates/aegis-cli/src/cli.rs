//! CLI definition using clap

use aegis_kernel::config::DEFAULT_KEY_ENV;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Aegis - sanitize prompts before they cross the trust boundary
#[derive(Parser)]
#[command(name = "aegis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new base64 encryption key
    Keygen {
        /// Print as a `NAME=value` line ready for a .env file
        #[arg(long)]
        env: bool,
    },

    /// Sanitize text and seal the original
    Process {
        /// Identity of the caller, recorded in the audit record
        #[arg(short, long, env = "AEGIS_ACTOR_ID")]
        actor: String,

        /// Gateway settings file (toml, yaml, json, ini, ron, json5)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Text to process; read from stdin when omitted
        text: Option<String>,
    },

    /// List findings without redacting, encrypting or auditing
    Scan {
        /// Gateway settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Text to scan; read from stdin when omitted
        text: Option<String>,
    },

    /// Recover the original text from a ciphertext blob
    Decrypt {
        /// Reject blobs older than this many seconds
        #[arg(long)]
        ttl: Option<u64>,

        /// Environment variable holding the key
        #[arg(long, default_value = DEFAULT_KEY_ENV)]
        key_env: String,

        /// Blob to open; read from stdin when omitted
        blob: Option<String>,
    },

    /// Settings file utilities
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Check that a settings file would build a gateway
    Validate {
        /// Settings file
        file: PathBuf,
    },
}
