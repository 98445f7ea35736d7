//! Direct-message channel cache
//!
//! Maps Slack user IDs to the DM channel the bot shares with them. The cache
//! is only ever replaced wholesale from a full DM listing; there is no
//! incremental insert. It carries no locking: the owning [`crate::Messenger`]
//! mutates it through `&mut self`.

use std::collections::HashMap;

use crate::types::SlackChannel;

/// User ID → DM channel ID
#[derive(Debug, Clone, Default)]
pub struct DmCache {
    channels: HashMap<String, String>,
}

impl DmCache {
    /// Build a cache from a DM listing
    pub fn from_channels(channels: impl IntoIterator<Item = SlackChannel>) -> Self {
        let mut cache = Self::default();
        cache.replace(channels);
        cache
    }

    /// Replace every entry with the given DM listing.
    ///
    /// Conversations that are not DMs or have no `user` are skipped. If a
    /// user appears twice, the first channel listed wins.
    pub fn replace(&mut self, channels: impl IntoIterator<Item = SlackChannel>) {
        self.channels.clear();
        for channel in channels.into_iter().filter(|c| c.is_im) {
            if let Some(user) = channel.user {
                self.channels.entry(user).or_insert(channel.id);
            }
        }
    }

    /// DM channel ID for a user, if cached
    pub fn channel_for(&self, user_id: &str) -> Option<&str> {
        self.channels.get(user_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dm(id: &str, user: Option<&str>) -> SlackChannel {
        SlackChannel {
            id: id.to_string(),
            name: None,
            is_im: true,
            user: user.map(str::to_string),
        }
    }

    #[test]
    fn test_lookup() {
        let cache = DmCache::from_channels(vec![dm("D1", Some("U1")), dm("D2", Some("U2"))]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.channel_for("U1"), Some("D1"));
        assert_eq!(cache.channel_for("U2"), Some("D2"));
        assert_eq!(cache.channel_for("U3"), None);
    }

    #[test]
    fn test_replace_drops_stale_entries() {
        let mut cache = DmCache::from_channels(vec![dm("D1", Some("U1"))]);
        cache.replace(vec![dm("D2", Some("U2"))]);
        assert_eq!(cache.channel_for("U1"), None);
        assert_eq!(cache.channel_for("U2"), Some("D2"));
    }

    #[test]
    fn test_first_listing_wins() {
        let cache = DmCache::from_channels(vec![dm("D1", Some("U1")), dm("D9", Some("U1"))]);
        assert_eq!(cache.channel_for("U1"), Some("D1"));
    }

    #[test]
    fn test_non_dm_channels_skipped() {
        let mut channel = dm("C1", Some("U1"));
        channel.is_im = false;
        channel.name = Some("general".to_string());

        let cache = DmCache::from_channels(vec![channel, dm("D2", Some("U2"))]);
        assert_eq!(cache.channel_for("U1"), None);
        assert_eq!(cache.channel_for("U2"), Some("D2"));
    }

    #[test]
    fn test_channels_without_user_skipped() {
        let cache = DmCache::from_channels(vec![dm("D1", None)]);
        assert!(cache.is_empty());
    }
}
