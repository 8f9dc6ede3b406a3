//! # Twitter Command
//!
//! Lets officers inspect and manage the guild's Twitter list:
//! `twitter lasttweet [screen_name]`, `twitter list (add|remove) <screen_name>`, `twitter list url`.
//! Officer-only because list changes act on the bot's Twitter account.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::application::context::MessageContext;
use crate::domain::errors::TwitterError;
use crate::domain::traits::TwitterApi;
use crate::domain::types::{PermissionLevel, Tweet, twitter_list_url};
use crate::interface::commands::CommandHandler;
use crate::strings::{help, messages};

pub struct TwitterHandler {
    twitter: Arc<dyn TwitterApi>,
}

impl TwitterHandler {
    pub fn new(twitter: Arc<dyn TwitterApi>) -> Self {
        Self { twitter }
    }

    async fn last_tweet(&self, ctx: &MessageContext) -> Result<()> {
        let result = match ctx.args.len() {
            2 => {
                let Some((owner, slug)) = ctx.guild.twitter_list().await? else {
                    tracing::error!("No Twitter list configured for {}", ctx.guild.guild_id());
                    return ctx.reply(messages::DATABASE_ERROR).await;
                };
                self.twitter.list_statuses(&owner, &slug, 1).await
            }
            3 => self.twitter.user_timeline(&ctx.args[2], 1).await,
            _ => return self.help(ctx).await,
        };
        ctx.reply(&last_tweet_reply(result)).await
    }

    async fn list(&self, ctx: &MessageContext) -> Result<()> {
        let action = ctx.arg(2);
        if !matches!(action, Some("add" | "remove" | "url")) {
            return self.help(ctx).await;
        }

        let Some((owner, slug)) = ctx.guild.twitter_list().await? else {
            tracing::error!("No Twitter list configured for {}", ctx.guild.guild_id());
            return ctx.reply(messages::LIST_NOT_CONFIGURED).await;
        };

        if action == Some("url") {
            return ctx.reply(&twitter_list_url(&owner, &slug)).await;
        }

        let [_, _, action, screen_name] = ctx.args.as_slice() else {
            return self.help(ctx).await;
        };
        let response = if action == "add" {
            match self.twitter.add_list_member(&owner, &slug, screen_name).await {
                Ok(()) => messages::list_member_added(screen_name),
                Err(e) => messages::request_failed(&e.to_string()),
            }
        } else {
            match self.twitter.remove_list_member(&owner, &slug, screen_name).await {
                Ok(()) => messages::list_member_removed(screen_name),
                Err(e) => messages::request_failed(&e.to_string()),
            }
        };
        ctx.reply(&response).await
    }
}

fn last_tweet_reply(result: Result<Vec<Tweet>, TwitterError>) -> String {
    match result {
        Ok(tweets) => tweets
            .first()
            .map(Tweet::url)
            .unwrap_or_else(|| messages::NO_NEW_TWEETS.to_string()),
        Err(e) => messages::request_failed(&e.to_string()),
    }
}

#[async_trait]
impl CommandHandler for TwitterHandler {
    fn commands(&self) -> &'static [&'static str] {
        &["twitter"]
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Officer
    }

    fn usage(&self, prefix: &str) -> Option<String> {
        let templates = help::TWITTER_LIST
            .iter()
            .copied()
            .chain([help::TWITTER_LASTTWEET]);
        Some(help::usage_block(templates, prefix))
    }

    fn subcommand_usage(&self, subcommand: &str, prefix: &str) -> Option<String> {
        match subcommand {
            "list" => Some(help::usage_block(help::TWITTER_LIST.iter().copied(), prefix)),
            "lasttweet" => Some(format!(
                "Usage: {}",
                help::render(help::TWITTER_LASTTWEET, prefix)
            )),
            _ => None,
        }
    }

    async fn apply(&self, ctx: &MessageContext) -> Result<()> {
        tracing::debug!("Handling twitter command with args: {:?}", ctx.args);
        match ctx.arg(1) {
            Some("lasttweet") => self.last_tweet(ctx).await,
            Some("list") => self.list(ctx).await,
            _ => self.help(ctx).await,
        }
    }
}
