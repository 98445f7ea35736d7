//! Destination classification
//!
//! A destination is either an email address (resolved to the user's DM
//! channel) or a channel handle used verbatim. The check is a loose
//! heuristic, not RFC 5322 validation: the dot before the TLD is unescaped
//! and matches any character, and the end anchor tolerates one trailing
//! newline. Both quirks are kept so classification stays stable.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.+@(\[?)[a-zA-Z0-9.\-]+.([a-zA-Z]{2,3}|[0-9]{1,3})(\]?)\n?$")
        .expect("email pattern is a valid regex")
});

/// Whether `text` looks like an email address
pub fn is_email(text: &str) -> bool {
    EMAIL_PATTERN.is_match(text)
}
