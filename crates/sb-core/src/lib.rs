//! sb-core: shared plumbing for the Slack messenger
//!
//! Configuration, credential loading, logging setup and the core error type.

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;

pub use config::SlackbotConfig;
pub use credentials::{Credentials, default_credentials_path};
pub use error::{Error, Result};
pub use logging::init_tracing;
