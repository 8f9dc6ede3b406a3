//! # Account Commands
//!
//! Lets members register game accounts with the guild:
//! `<type> set <id>`, `<type> clear`, `<type> view`, `<type> list`, where `<type>` is
//! `steamid` or `battletag`. `accounts` lists the supported types.

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use crate::application::context::MessageContext;
use crate::domain::types::{AccountType, PermissionLevel};
use crate::interface::commands::{CommandHandler, send_help};
use crate::strings::{help, messages};

/// Keeps stored Steam ids bounded.
const STEAM_ID_MAX_LEN: usize = 128;

// Name part of a battletag: no leading digit, no whitespace or punctuation.
static BATTLETAG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^0-9\s[:punct:]][^\s[:punct:]]+$").expect("battletag regex is valid")
});
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digits regex is valid"));

pub fn validate_account_id(account_type: AccountType, account_id: &str) -> bool {
    match account_type {
        AccountType::SteamId => account_id.chars().count() <= STEAM_ID_MAX_LEN,
        AccountType::BattleTag => {
            let mut parts = account_id.split('#');
            let (Some(name), Some(number), None) = (parts.next(), parts.next(), parts.next())
            else {
                return false;
            };
            (3..=12).contains(&name.chars().count())
                && BATTLETAG_NAME.is_match(name)
                && DIGITS.is_match(number)
        }
    }
}

fn format_account_id(account_type: AccountType, account_id: &str) -> String {
    match account_type {
        AccountType::SteamId => messages::steam_profile_link(account_id),
        AccountType::BattleTag => account_id.to_string(),
    }
}

fn account_usage(template: &str, prefix: &str, account_type: AccountType) -> String {
    help::render(template, prefix).replace("{t}", account_type.as_str())
}

fn account_type_names() -> Vec<&'static str> {
    AccountType::ALL.iter().map(AccountType::as_str).collect()
}

pub struct AccountHandler;

impl AccountHandler {
    async fn set(&self, ctx: &MessageContext, account_type: AccountType) -> Result<()> {
        let Some(account_id) = ctx.arg(2) else {
            return ctx.reply(&account_usage(help::ACCOUNT_SET, &ctx.prefix, account_type)).await;
        };
        if !validate_account_id(account_type, account_id) {
            return ctx.reply(messages::ACCOUNT_VALIDATION_FAILED).await;
        }
        ctx.guild
            .member(ctx.author_id())
            .set_account_id(account_type, account_id)
            .await?;
        ctx.guild
            .add_account_holder(account_type, ctx.author_id())
            .await?;
        ctx.reply(&messages::account_updated(
            account_type.as_str(),
            &ctx.message.author_name,
        ))
        .await
    }

    async fn clear(&self, ctx: &MessageContext, account_type: AccountType) -> Result<()> {
        ctx.guild
            .member(ctx.author_id())
            .clear_account_id(account_type)
            .await?;
        ctx.guild
            .remove_account_holder(account_type, ctx.author_id())
            .await?;
        ctx.reply(&messages::account_cleared(
            account_type.as_str(),
            &ctx.message.author_name,
        ))
        .await
    }

    async fn view(&self, ctx: &MessageContext, account_type: AccountType) -> Result<()> {
        let account_id = ctx
            .guild
            .member(ctx.author_id())
            .account_id(account_type)
            .await?;
        match account_id {
            Some(id) => ctx.reply(&id).await,
            None => ctx.reply(&messages::account_not_set(account_type.as_str())).await,
        }
    }

    /// `name: id` for every member still in the guild who registered this type, sorted.
    async fn listing(&self, ctx: &MessageContext, account_type: AccountType) -> Result<String> {
        let directory = &ctx.services.directory;
        let mut entries = Vec::new();
        for member_id in ctx.guild.account_holders(account_type).await? {
            let Some(name) = directory.display_name(ctx.guild.guild_id(), &member_id).await else {
                continue;
            };
            let Some(account_id) = ctx.guild.member(&member_id).account_id(account_type).await?
            else {
                continue;
            };
            entries.push(format!(
                "{}: {}",
                name,
                format_account_id(account_type, &account_id)
            ));
        }
        entries.sort();
        Ok(messages::account_list(account_type.as_str(), &entries))
    }
}

#[async_trait]
impl CommandHandler for AccountHandler {
    fn commands(&self) -> &'static [&'static str] {
        &["accounts", "steamid", "battletag"]
    }

    fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::Member
    }

    async fn apply(&self, ctx: &MessageContext) -> Result<()> {
        let Ok(account_type) = ctx.args[0].parse::<AccountType>() else {
            return ctx.reply(&messages::account_types(&account_type_names())).await;
        };

        match ctx.arg(1) {
            None => {
                let listing = self.listing(ctx, account_type).await?;
                let hint = messages::account_hint(&ctx.prefix, account_type.as_str());
                ctx.reply(&format!("{hint}\n{listing}")).await
            }
            Some("set") => self.set(ctx, account_type).await,
            Some("clear") => self.clear(ctx, account_type).await,
            Some("view") => self.view(ctx, account_type).await,
            Some("list") => ctx.reply(&self.listing(ctx, account_type).await?).await,
            Some(_) => self.help(ctx).await,
        }
    }

    /// Help is per account type: `help steamid` explains how to find a Steam id.
    async fn help(&self, ctx: &MessageContext) -> Result<()> {
        let account_type = ctx
            .args
            .iter()
            .take(3)
            .filter(|arg| *arg != "help")
            .find_map(|arg| arg.parse::<AccountType>().ok());

        let text = match account_type {
            None => format!(
                "{}\n{}",
                messages::account_types(&account_type_names()),
                help::render(help::ACCOUNT_TYPES_HINT, &ctx.prefix)
            ),
            Some(account_type) => {
                let howto = match account_type {
                    AccountType::SteamId => help::STEAMID_HOWTO,
                    AccountType::BattleTag => help::BATTLETAG_HOWTO,
                };
                let lines: Vec<String> = [
                    help::ACCOUNT_SET,
                    help::ACCOUNT_CLEAR,
                    help::ACCOUNT_VIEW,
                    help::ACCOUNT_LIST,
                ]
                .iter()
                .map(|t| account_usage(t, &ctx.prefix, account_type))
                .collect();
                format!("{howto}\n{}", lines.join("\n"))
            }
        };
        send_help(self.permission_level(), ctx, &text).await
    }
}
