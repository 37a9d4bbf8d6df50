//! Error taxonomy for the skeleton extractor (spec §7).
//!
//! Parse and walk failures are *not* represented here — they are
//! non-fatal and recorded as [`crate::parsing::Issue`]s instead. This
//! enum covers everything that aborts the current command.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkellyError {
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("State file at '{path}' is corrupt: {reason}")]
    StateCorrupt { path: PathBuf, reason: String },

    #[error(
        "State was produced by a different parser/output version (stored {stored}, current {current}); run 'skelly generate' to rebuild"
    )]
    VersionMismatch { stored: String, current: String },

    #[error("Symbol query '{query}' is ambiguous; candidates: {candidates:?}")]
    AmbiguousQuery {
        query: String,
        candidates: Vec<String>,
    },

    #[error("No symbol matched '{query}'")]
    SymbolNotFound { query: String },

    #[error("Artifact '{name}' is missing; run 'skelly update' or 'skelly generate' first")]
    MissingArtifact { name: String },

    #[error("No path exists from '{from}' to '{to}'")]
    NoPath { from: String, to: String },

    #[error("Unsupported input: {reason}")]
    UnsupportedInput { reason: String },

    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    #[error("{0}")]
    General(String),
}

impl SkellyError {
    /// Actionable hints the CLI prints alongside the error message.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::StateCorrupt { .. } => vec![
                "Run 'skelly generate' to rebuild the index from scratch",
                "The corrupt state file is left in place for inspection",
            ],
            Self::VersionMismatch { .. } => {
                vec!["Run 'skelly generate' to produce state in the current format"]
            }
            Self::MissingArtifact { .. } => {
                vec!["Run 'skelly update' (or 'skelly generate' for a full rebuild)"]
            }
            Self::AmbiguousQuery { .. } => {
                vec!["Re-run the query with one of the listed candidate IDs"]
            }
            Self::FileRead { .. } => vec!["Check the file exists and is readable"],
            _ => vec![],
        }
    }

    /// Process exit code convention used by `main.rs`: 0 success (never
    /// constructed here), 1 general failure, 2 user input error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AmbiguousQuery { .. }
            | Self::SymbolNotFound { .. }
            | Self::NoPath { .. }
            | Self::UnsupportedInput { .. }
            | Self::MissingArtifact { .. } => 2,
            _ => 1,
        }
    }
}

pub type SkellyResult<T> = Result<T, SkellyError>;
