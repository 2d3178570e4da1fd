//! CLI error types

use dpp_sdk::SdkError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// No address given and none saved in the config
    #[error("No {0} address: pass --address or deploy one first")]
    MissingAddress(&'static str),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// SDK error
    #[error(transparent)]
    Sdk(#[from] SdkError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}

impl CliError {
    /// Process exit code: 2 when a transaction was sent but its outcome
    /// is unknown, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Sdk(e) if e.is_indeterminate() => 2,
            _ => 1,
        }
    }
}
