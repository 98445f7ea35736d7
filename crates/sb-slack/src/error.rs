//! Error types (sb-slack)

use thiserror::Error;

/// sb-slack error type
#[derive(Error, Debug)]
pub enum SlackError {
    /// Credential or configuration failure from sb-core
    #[error(transparent)]
    Core(#[from] sb_core::Error),

    #[error("No Slack user found for {0}")]
    UserNotFound(String),

    #[error("Direct-message channel for user {user_id} still missing after open and refresh")]
    InternalInconsistency { user_id: String },

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Slack API error: {0}")]
    ApiError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited")]
    RateLimited,
}

impl SlackError {
    /// Whether this is a credential loading failure
    pub fn is_credential_error(&self) -> bool {
        matches!(self, SlackError::Core(sb_core::Error::CredentialLoad(_)))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SlackError>;
