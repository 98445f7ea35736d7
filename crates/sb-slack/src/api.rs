//! Slack Web API client
//!
//! Communicates with the Slack Web API. [`SlackApi`] is the seam the
//! [`crate::Messenger`] talks through; [`SlackApiClient`] implements it over
//! HTTP with a bearer token.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use sb_core::SlackbotConfig;

use crate::error::{Result, SlackError};
use crate::types::*;

const DM_PAGE_LIMIT: &str = "200";

/// The Slack operations the messenger relies on
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Every DM conversation the bot is a member of
    async fn list_dm_channels(&self) -> Result<Vec<SlackChannel>>;

    /// Look up a user by email; `UserNotFound` when Slack has no match
    async fn lookup_user_by_email(&self, email: &str) -> Result<SlackUser>;

    /// Open (or reopen) a DM with a user, returning the channel ID
    async fn open_dm(&self, user_id: &str) -> Result<String>;

    /// Post a message. The response is returned as-is, `ok` unchecked; an
    /// HTTP failure other than 429 is reported as `ok: false`.
    async fn post_message(&self, message: &PostMessage) -> Result<SlackResponse<PostMessageResponse>>;

    /// Upload a file to a channel. The response is returned as-is, `ok`
    /// unchecked; an HTTP failure other than 429 is reported as `ok: false`.
    async fn upload_file(&self, upload: &FileUpload) -> Result<SlackResponse<FileUploadResponse>>;
}

/// Slack Web API client
#[derive(Clone)]
pub struct SlackApiClient {
    client: Client,
    bot_token: String,
    base_url: String,
}

impl SlackApiClient {
    /// Create a new Slack API client against slack.com
    pub fn new(bot_token: &str) -> Result<Self> {
        let config = SlackbotConfig::default();
        Self::with_base_url(bot_token, config.base_url(), Duration::from_secs(config.timeout_secs))
    }

    /// Create a client using the endpoint and timeout from configuration
    pub fn from_config(bot_token: &str, config: &SlackbotConfig) -> Result<Self> {
        config.validate()?;
        Self::with_base_url(bot_token, config.base_url(), Duration::from_secs(config.timeout_secs))
    }

    /// Create a client against a custom API base URL
    pub fn with_base_url(bot_token: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        if bot_token.trim().is_empty() {
            return Err(SlackError::Core(sb_core::Error::CredentialLoad(
                "Slack token is empty".to_string(),
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SlackError::HttpError)?;

        Ok(Self {
            client,
            bot_token: bot_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Add authorization header
    fn add_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.bot_token)
    }

    /// Send a request and decode the Slack envelope.
    ///
    /// A non-2xx status other than 429 comes back as the inner `Err` with a
    /// `http_<code>` description.
    async fn fetch<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<std::result::Result<SlackResponse<T>, String>> {
        let response = self
            .add_auth(request)
            .send()
            .await
            .map_err(SlackError::HttpError)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            error!("{} rate limited", method);
            return Err(SlackError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("{} failed: {} - {}", method, status, error_text);
            return Ok(Err(format!("http_{}: {}", status.as_u16(), error_text)));
        }

        response
            .json()
            .await
            .map(Ok)
            .map_err(|e| SlackError::ParseError(format!("{}: {}", method, e)))
    }

    /// Lookup-style call: HTTP failures are errors
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<SlackResponse<T>> {
        self.fetch(method, request)
            .await?
            .map_err(|e| SlackError::ApiError(format!("{}: {}", method, e)))
    }

    /// Send-style call: HTTP failures become an `ok: false` envelope
    async fn call_send<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<SlackResponse<T>> {
        Ok(self
            .fetch(method, request)
            .await?
            .unwrap_or_else(|e| SlackResponse::failure(e)))
    }

    /// Unwrap a response whose payload is required
    fn require<T>(method: &str, result: SlackResponse<T>) -> Result<T> {
        if !result.ok {
            return Err(SlackError::ApiError(format!("{}: {}", method, result.error_code())));
        }
        result
            .data
            .ok_or_else(|| SlackError::ParseError(format!("{}: missing response payload", method)))
    }
}

#[async_trait]
impl SlackApi for SlackApiClient {
    async fn list_dm_channels(&self) -> Result<Vec<SlackChannel>> {
        let url = self.url("conversations.list");
        let mut channels = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        loop {
            let mut params = vec![("types", "im"), ("limit", DM_PAGE_LIMIT)];
            if let Some(cursor) = cursor.as_deref() {
                params.push(("cursor", cursor));
            }

            debug!("Listing DM conversations (cursor: {:?})", cursor);

            let result: SlackResponse<ConversationsListResponse> = self
                .call("conversations.list", self.client.get(&url).query(&params))
                .await?;
            let next_cursor = result
                .response_metadata
                .as_ref()
                .and_then(|m| m.next_cursor.clone())
                .filter(|c| !c.is_empty());

            channels.extend(Self::require("conversations.list", result)?.channels);

            match next_cursor {
                Some(next) => {
                    if !seen_cursors.insert(next.clone()) {
                        error!("conversations.list returned cursor {} twice", next);
                        return Err(SlackError::ApiError(format!(
                            "conversations.list: repeated cursor {}",
                            next
                        )));
                    }
                    cursor = Some(next);
                }
                None => break,
            }
        }

        debug!("Listed {} DM conversations", channels.len());
        Ok(channels)
    }

    async fn lookup_user_by_email(&self, email: &str) -> Result<SlackUser> {
        let url = self.url("users.lookupByEmail");

        debug!("Looking up user by email: {}", email);

        let result: SlackResponse<UserLookupResponse> = self
            .call("users.lookupByEmail", self.client.get(&url).query(&[("email", email)]))
            .await?;

        if !result.ok && result.error.as_deref() == Some("users_not_found") {
            return Err(SlackError::UserNotFound(email.to_string()));
        }

        Ok(Self::require("users.lookupByEmail", result)?.user)
    }

    async fn open_dm(&self, user_id: &str) -> Result<String> {
        let url = self.url("conversations.open");

        debug!("Opening DM with user: {}", user_id);

        let body = serde_json::json!({
            "users": user_id,
        });

        let result: SlackResponse<ConversationOpenResponse> = self
            .call("conversations.open", self.client.post(&url).json(&body))
            .await?;

        Ok(Self::require("conversations.open", result)?.channel.id)
    }

    async fn post_message(&self, message: &PostMessage) -> Result<SlackResponse<PostMessageResponse>> {
        let url = self.url("chat.postMessage");

        debug!("Posting message to channel: {}", message.channel);

        self.call_send("chat.postMessage", self.client.post(&url).json(message))
            .await
    }

    async fn upload_file(&self, upload: &FileUpload) -> Result<SlackResponse<FileUploadResponse>> {
        debug!(
            "Uploading {} ({} bytes) to channel: {}",
            upload.filename,
            upload.bytes.len(),
            upload.channel
        );

        // 1. reserve an upload URL
        let length = upload.bytes.len().to_string();
        let reserved: SlackResponse<UploadUrlResponse> = self
            .call_send(
                "files.getUploadURLExternal",
                self.client
                    .post(self.url("files.getUploadURLExternal"))
                    .form(&[("filename", upload.filename.as_str()), ("length", length.as_str())]),
            )
            .await?;
        if !reserved.ok {
            return Ok(reserved.into_failure());
        }
        let Some(target) = reserved.data else {
            return Err(SlackError::ParseError(
                "files.getUploadURLExternal: missing upload_url".to_string(),
            ));
        };

        // 2. push the bytes
        let response = self
            .client
            .post(&target.upload_url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(upload.bytes.clone())
            .send()
            .await
            .map_err(SlackError::HttpError)?;
        if !response.status().is_success() {
            let status = response.status();
            error!("File upload to external URL failed: {}", status);
            return Ok(SlackResponse::failure(format!("upload_failed: {}", status)));
        }

        // 3. share it in the channel
        let title = if upload.title.is_empty() {
            upload.filename.as_str()
        } else {
            upload.title.as_str()
        };
        let mut body = serde_json::json!({
            "files": [{ "id": target.file_id, "title": title }],
            "channel_id": upload.channel,
        });
        if !upload.initial_comment.is_empty() {
            body["initial_comment"] = serde_json::Value::String(upload.initial_comment.clone());
        }

        self.call_send(
            "files.completeUploadExternal",
            self.client.post(self.url("files.completeUploadExternal")).json(&body),
        )
        .await
    }
}
