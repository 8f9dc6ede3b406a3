//! # Command Handlers
//!
//! One handler per command family (`admin`, `twitter`, account commands). The dispatcher
//! checks permissions before calling into a handler, so handlers only parse and act.

pub mod accounts;
pub mod admin;
pub mod twitter;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::context::MessageContext;
use crate::domain::types::{PermissionLevel, Visibility};
use crate::strings::messages;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Tokens this handler is registered under.
    fn commands(&self) -> &'static [&'static str];

    fn permission_level(&self) -> PermissionLevel;

    /// Only member commands show up in the help listing.
    fn visibility(&self) -> Visibility {
        match self.permission_level() {
            PermissionLevel::Member => Visibility::Public,
            _ => Visibility::Hidden,
        }
    }

    /// General usage text for the handler.
    fn usage(&self, _prefix: &str) -> Option<String> {
        None
    }

    /// Usage text for one subcommand, if the handler has one.
    fn subcommand_usage(&self, _subcommand: &str, _prefix: &str) -> Option<String> {
        None
    }

    async fn apply(&self, ctx: &MessageContext) -> Result<()>;

    async fn help(&self, ctx: &MessageContext) -> Result<()> {
        let text = help_subcommand(&ctx.args)
            .and_then(|sub| self.subcommand_usage(sub, &ctx.prefix))
            .or_else(|| self.usage(&ctx.prefix))
            .unwrap_or_else(|| messages::NO_HELP.to_string());
        send_help(self.permission_level(), ctx, &text).await
    }
}

/// The subcommand a help request is about. "help" may sit in any of the first three
/// positions: `help cmd sub`, `cmd help sub` and `cmd sub help` all name `sub`.
pub fn help_subcommand(args: &[String]) -> Option<&str> {
    args.iter()
        .take(3)
        .map(String::as_str)
        .filter(|arg| *arg != "help")
        .nth(1)
}

/// Member help goes to the channel; officer and owner help goes to the author privately.
pub async fn send_help(level: PermissionLevel, ctx: &MessageContext, text: &str) -> Result<()> {
    match level {
        PermissionLevel::Member => ctx.reply(text).await,
        PermissionLevel::Officer | PermissionLevel::Owner => ctx.reply_private(text).await,
    }
}
