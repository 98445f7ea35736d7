//! Slack API types

use serde::{Deserialize, Serialize};

/// Slack user info
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl SlackUser {
    /// Name used to greet the user: profile real name, then account real
    /// name, display name, and finally the handle.
    pub fn display_name(&self) -> &str {
        let profile = self.profile.as_ref();
        [
            profile.and_then(|p| p.real_name.as_deref()),
            self.real_name.as_deref(),
            profile.and_then(|p| p.display_name.as_deref()),
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or(self.name.as_str())
    }
}

/// User profile details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Slack conversation info. DM conversations carry `user` and no `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_im: bool,
    #[serde(default)]
    pub user: Option<String>,
}

/// Message to send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMessage {
    pub channel: String,
    pub text: String,
}

/// File to upload
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub channel: String,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub title: String,
    pub initial_comment: String,
}

/// API response wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_metadata: Option<ResponseMetadata>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T> SlackResponse<T> {
    /// Error code reported by Slack, or a placeholder
    pub fn error_code(&self) -> &str {
        self.error.as_deref().unwrap_or("unknown_error")
    }

    /// A failed response of another payload type carrying the same error
    pub fn into_failure<U>(self) -> SlackResponse<U> {
        SlackResponse {
            ok: false,
            error: self.error,
            response_metadata: self.response_metadata,
            data: None,
        }
    }

    /// A failed response with the given error code
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            response_metadata: None,
            data: None,
        }
    }
}

/// Response metadata (for pagination, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Conversations list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsListResponse {
    pub channels: Vec<SlackChannel>,
}

/// users.lookupByEmail response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLookupResponse {
    pub user: SlackUser,
}

/// conversations.open response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationOpenResponse {
    pub channel: SlackChannel,
}

/// Message echoed back by chat.postMessage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedMessage {
    pub text: String,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

/// Post message response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMessageResponse {
    pub channel: String,
    pub ts: String,
    #[serde(default)]
    pub message: Option<PostedMessage>,
}

/// files.getUploadURLExternal response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub file_id: String,
}

/// Uploaded file record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// files.completeUploadExternal response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUploadResponse {
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}
