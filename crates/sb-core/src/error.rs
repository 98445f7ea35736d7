//! Error types for sb-core

use thiserror::Error;

/// Main error type for sb-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load Slack credentials: {0}")]
    CredentialLoad(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sb-core
pub type Result<T> = std::result::Result<T, Error>;
