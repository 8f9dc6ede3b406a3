//! # Admin Command
//!
//! Handles `admin`, the guild owner's configuration command:
//! `admin prefix <c>`, `admin role (member|officer) <name>` and
//! `admin twitter (channel|listscreenname|listslug) <value>`.

use anyhow::Result;
use async_trait::async_trait;

use crate::application::context::MessageContext;
use crate::domain::types::{PermissionLevel, TwitterKey};
use crate::interface::commands::CommandHandler;
use crate::strings::{help, messages};

pub struct AdminHandler;

#[async_trait]
impl CommandHandler for AdminHandler {
    fn commands(&self) -> &'static [&'static str] {
        &["admin"]
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Owner
    }

    fn usage(&self, prefix: &str) -> Option<String> {
        Some(help::usage_block(
            [help::ADMIN_PREFIX, help::ADMIN_ROLE, help::ADMIN_TWITTER],
            prefix,
        ))
    }

    fn subcommand_usage(&self, subcommand: &str, prefix: &str) -> Option<String> {
        let template = match subcommand {
            "prefix" => help::ADMIN_PREFIX,
            "role" => help::ADMIN_ROLE,
            "twitter" => help::ADMIN_TWITTER,
            _ => return None,
        };
        Some(format!("Usage: {}", help::render(template, prefix)))
    }

    async fn apply(&self, ctx: &MessageContext) -> Result<()> {
        let rest: Vec<&str> = ctx.args.iter().skip(2).map(String::as_str).collect();

        match ctx.arg(1) {
            Some("prefix") => match rest.as_slice() {
                [prefix] if prefix.chars().count() == 1 => {
                    ctx.guild.set_command_prefix(prefix).await?;
                    ctx.reply(messages::PREFIX_UPDATED).await
                }
                [_] => ctx.reply(messages::PREFIX_NOT_SINGLE_CHAR).await,
                _ => self.usage_reply(ctx, "prefix").await,
            },
            Some("role") => match rest.as_slice() {
                ["member", role] => {
                    ctx.guild.set_member_role(role).await?;
                    ctx.reply(messages::MEMBER_ROLE_UPDATED).await
                }
                ["officer", role] => {
                    ctx.guild.set_officer_role(role).await?;
                    ctx.reply(messages::OFFICER_ROLE_UPDATED).await
                }
                _ => self.usage_reply(ctx, "role").await,
            },
            Some("twitter") => match rest.as_slice() {
                [key, value] => match key.parse::<TwitterKey>() {
                    Ok(key) => {
                        ctx.guild.set_twitter_data(key, value).await?;
                        ctx.reply(&messages::twitter_setting_updated(key.as_str(), value))
                            .await
                    }
                    Err(_) => self.usage_reply(ctx, "twitter").await,
                },
                _ => self.usage_reply(ctx, "twitter").await,
            },
            _ => self.help(ctx).await,
        }
    }
}

impl AdminHandler {
    /// Malformed subcommands get their usage line in the channel they were sent to.
    async fn usage_reply(&self, ctx: &MessageContext, subcommand: &str) -> Result<()> {
        match self.subcommand_usage(subcommand, &ctx.prefix) {
            Some(text) => ctx.reply(&text).await,
            None => Ok(()),
        }
    }
}
