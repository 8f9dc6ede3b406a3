//! # Message Context
//!
//! Everything a handler needs to act on one message: the message, its guild, the resolved
//! prefix, the parsed arguments and the shared services.

use anyhow::{Result, anyhow};
use std::sync::Arc;

use crate::application::guild::GuildData;
use crate::application::services::Services;
use crate::domain::types::IncomingMessage;

pub struct MessageContext {
    pub message: IncomingMessage,
    pub guild: GuildData,
    pub prefix: String,
    /// Whitespace separated tokens with the prefix stripped from the first.
    pub args: Vec<String>,
    pub services: Arc<Services>,
}

impl MessageContext {
    pub fn new(
        message: IncomingMessage,
        guild: GuildData,
        prefix: impl Into<String>,
        args: Vec<String>,
        services: Arc<Services>,
    ) -> Self {
        Self {
            message,
            guild,
            prefix: prefix.into(),
            args,
            services,
        }
    }

    pub fn author_id(&self) -> &str {
        &self.message.author_id
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Send to the channel the message came from.
    pub async fn reply(&self, content: &str) -> Result<()> {
        self.services
            .chat
            .send_message(&self.message.channel_id, content)
            .await
            .map_err(|e| anyhow!(e))
    }

    /// Send privately to the message author.
    pub async fn reply_private(&self, content: &str) -> Result<()> {
        self.services
            .chat
            .send_direct(&self.message.author_id, content)
            .await
            .map_err(|e| anyhow!(e))
    }
}
