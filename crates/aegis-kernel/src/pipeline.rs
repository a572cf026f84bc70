//! Per-call pipeline stages.
//!
//! Every call to the gateway walks the same linear path:
//!
//! ```text
//! RECEIVED ──► ENCRYPTING ──► SCANNING ──► REDACTING ──► LOGGING ──► DONE
//!     │             │             │             │            │
//!     └─────────────┴─────────────┴──────┬──────┴────────────┘
//!                                        ▼
//!                                      FAILED
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stage of the detect-and-redact pipeline for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    /// Input accepted, nothing done yet.
    Received,
    /// Original text is being sealed into the audit envelope.
    Encrypting,
    /// Detectors are running over the original text.
    Scanning,
    /// Findings are being replaced in the text.
    Redacting,
    /// The audit record is being emitted.
    Logging,
    /// Both outputs are valid.
    Done,
    /// Terminal failure; no output is returned.
    Failed,
}

impl PipelineStage {
    /// Returns `true` for `Done` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// The stage that follows this one on the success path.
    ///
    /// Terminal stages return themselves.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Received => Self::Encrypting,
            Self::Encrypting => Self::Scanning,
            Self::Scanning => Self::Redacting,
            Self::Redacting => Self::Logging,
            Self::Logging => Self::Done,
            Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }

    /// Upper-case wire name, as used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Encrypting => "ENCRYPTING",
            Self::Scanning => "SCANNING",
            Self::Redacting => "REDACTING",
            Self::Logging => "LOGGING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
