//! Messenger: destination resolution and validated sends
//!
//! A destination is either a channel handle (used verbatim) or an email
//! address. Emails are resolved to the user's DM channel; when the bot has
//! no DM with that user yet, one is opened, the DM cache is refreshed, and an
//! onboarding message is posted before the caller's own send goes out.
//!
//! Mutating operations take `&mut self`; share a `Messenger` behind a mutex.
//! Separate instances do not coordinate, so two of them resolving the same
//! new user concurrently may each post an onboarding message.

use std::path::Path;

use tracing::{debug, info, warn};

use sb_core::SlackbotConfig;

use crate::api::{SlackApi, SlackApiClient};
use crate::cache::DmCache;
use crate::email::is_email;
use crate::error::{Result, SlackError};
use crate::types::{
    FileUpload, FileUploadResponse, PostMessage, PostMessageResponse, SlackResponse, SlackUser,
};

/// First-contact message for a newly opened DM
pub fn onboarding_message(user: &SlackUser, channel_id: &str) -> String {
    format!(
        "Ahoy, {}!\n\nYour Slack ID is {}\nOur IM ID is {}",
        user.display_name(),
        user.id,
        channel_id
    )
}

/// Sends messages and files to channels or users' DMs
pub struct Messenger<A: SlackApi = SlackApiClient> {
    api: A,
    cache: DmCache,
}

impl Messenger<SlackApiClient> {
    /// Build a messenger from configuration.
    ///
    /// Uses `config.token` when set, otherwise loads the credential file;
    /// fails with a credential error if neither yields a token.
    pub async fn connect(config: &SlackbotConfig) -> Result<Self> {
        let token = config.resolve_token()?;
        let api = SlackApiClient::from_config(&token, config)?;
        Self::new(api).await
    }
}

impl<A: SlackApi> Messenger<A> {
    /// Wrap an API client and fill the DM cache
    pub async fn new(api: A) -> Result<Self> {
        let mut messenger = Self {
            api,
            cache: DmCache::default(),
        };
        messenger.refresh().await?;
        Ok(messenger)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &DmCache {
        &self.cache
    }

    /// Replace the DM cache with a fresh listing from Slack
    pub async fn refresh(&mut self) -> Result<()> {
        let channels = self.api.list_dm_channels().await?;
        self.cache.replace(channels);
        info!("DM cache refreshed: {} channels", self.cache.len());
        Ok(())
    }

    /// Resolve a destination to a channel ID.
    ///
    /// Channel handles come back unchanged without touching the API.
    pub async fn resolve_channel(&mut self, identifier: &str) -> Result<String> {
        if !is_email(identifier) {
            return Ok(identifier.to_string());
        }

        let user = self.api.lookup_user_by_email(identifier).await?;

        if let Some(channel) = self.cache.channel_for(&user.id) {
            debug!("DM cache hit for {}: {}", user.id, channel);
            return Ok(channel.to_string());
        }

        let channel = self.open_dm(&user).await?;
        self.post_checked(&channel, &onboarding_message(&user, &channel))
            .await?;
        info!("Sent onboarding message to {} in {}", user.id, channel);

        Ok(channel)
    }

    /// Look up a user by email and post the onboarding message to their DM,
    /// opening the DM first if needed.
    pub async fn send_onboarding_message(
        &mut self,
        email: &str,
    ) -> Result<SlackResponse<PostMessageResponse>> {
        let user = self.api.lookup_user_by_email(email).await?;

        let channel = match self.cache.channel_for(&user.id) {
            Some(channel) => channel.to_string(),
            None => self.open_dm(&user).await?,
        };

        self.post_checked(&channel, &onboarding_message(&user, &channel))
            .await
    }

    /// Send a text message to a channel handle or an email address.
    ///
    /// Fails with `Delivery` unless Slack reports `ok` and echoes the exact
    /// text back; HTTP failures of the post land there too. A 429 is
    /// `RateLimited` instead.
    pub async fn send_message(
        &mut self,
        text: &str,
        destination: &str,
    ) -> Result<SlackResponse<PostMessageResponse>> {
        let channel = self.resolve_channel(destination).await?;
        self.post_checked(&channel, text).await
    }

    /// Upload a file to a channel handle or an email address.
    ///
    /// `title` and `comment` may be empty. Fails with `Delivery` unless Slack
    /// reports `ok` (including HTTP failures of the upload steps; a 429 is
    /// `RateLimited`).
    pub async fn send_file(
        &mut self,
        path: impl AsRef<Path>,
        destination: &str,
        title: &str,
        comment: &str,
    ) -> Result<SlackResponse<FileUploadResponse>> {
        let path = path.as_ref();
        let channel = self.resolve_channel(destination).await?;

        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let upload = FileUpload {
            channel,
            filename,
            bytes,
            title: title.to_string(),
            initial_comment: comment.to_string(),
        };
        let response = self.api.upload_file(&upload).await?;

        if !response.ok {
            warn!("File upload to {} failed: {}", upload.channel, response.error_code());
            return Err(SlackError::Delivery(format!(
                "files upload to {}: {}",
                upload.channel,
                response.error_code()
            )));
        }

        Ok(response)
    }

    /// Open a DM, refresh the cache, and return the channel from the cache
    async fn open_dm(&mut self, user: &SlackUser) -> Result<String> {
        let opened = self.api.open_dm(&user.id).await?;
        info!("Opened DM {} with {}", opened, user.id);

        self.refresh().await?;

        self.cache
            .channel_for(&user.id)
            .map(str::to_string)
            .ok_or_else(|| SlackError::InternalInconsistency {
                user_id: user.id.clone(),
            })
    }

    async fn post_checked(
        &self,
        channel: &str,
        text: &str,
    ) -> Result<SlackResponse<PostMessageResponse>> {
        let message = PostMessage {
            channel: channel.to_string(),
            text: text.to_string(),
        };
        let response = self.api.post_message(&message).await?;

        if !response.ok {
            warn!("chat.postMessage to {} failed: {}", channel, response.error_code());
            return Err(SlackError::Delivery(format!(
                "chat.postMessage to {}: {}",
                channel,
                response.error_code()
            )));
        }

        let echoed = response
            .data
            .as_ref()
            .and_then(|data| data.message.as_ref())
            .map(|message| message.text.as_str());
        if echoed != Some(text) {
            warn!("chat.postMessage to {} echoed different text", channel);
            return Err(SlackError::Delivery(format!(
                "chat.postMessage to {}: echoed text {:?} does not match sent text",
                channel, echoed
            )));
        }

        Ok(response)
    }
}
