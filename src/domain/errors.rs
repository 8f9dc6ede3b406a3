//! # Errors
//!
//! Typed errors surfaced to users. The `Display` text of each variant is what the bot
//! puts after "Reason:" in its replies, so it has to read well in chat.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TwitterError {
    /// Credentials needed for the request are missing from the config.
    #[error("The bot isn't configured to talk to Twitter, ask the owner to fix this!")]
    NotConfigured,

    /// Twitter answered with a non-200 status and an error message.
    #[error("{0}")]
    Api(String),

    /// Twitter answered with a non-200 status and no usable message.
    #[error("Twitter returned HTTP {0}")]
    Status(u16),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected response from Twitter: {0}")]
    Decode(String),
}
