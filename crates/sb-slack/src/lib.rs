//! sb-slack: Slack messaging helpers
//!
//! Sends messages and files to Slack channels or, given an email address,
//! to the user's direct-message channel. DM channels are opened on first
//! contact, announced with an onboarding message, and tracked in an
//! in-memory cache owned by the [`Messenger`].

pub mod api;
pub mod cache;
pub mod email;
pub mod error;
pub mod messenger;
pub mod types;

pub use api::{SlackApi, SlackApiClient};
pub use cache::DmCache;
pub use email::is_email;
pub use error::{Result, SlackError};
pub use messenger::{Messenger, onboarding_message};
