//! # Command Dispatcher
//!
//! Routes incoming messages to the registered command handlers.
//! Resolves the guild's prefix, handles `help`, and enforces each handler's permission level.
//! Unknown commands and permission failures are ignored without a reply.

use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::context::MessageContext;
use crate::application::guild::DEFAULT_COMMAND_PREFIX;
use crate::application::permissions::is_permitted;
use crate::application::services::Services;
use crate::domain::types::{IncomingMessage, Visibility};
use crate::interface::commands::CommandHandler;
use crate::strings::messages;

/// Command token to handler, split by visibility. A token lives in exactly one map.
#[derive(Default)]
pub struct CommandRegistry {
    visible: BTreeMap<String, Arc<dyn CommandHandler>>,
    hidden: BTreeMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) -> Result<()> {
        for command in handler.commands() {
            if self.lookup(command).is_some() {
                bail!("Command `{}` is registered twice", command);
            }
            let map = match handler.visibility() {
                Visibility::Public => &mut self.visible,
                Visibility::Hidden => &mut self.hidden,
            };
            map.insert(command.to_string(), handler.clone());
        }
        Ok(())
    }

    pub fn visible(&self, command: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.visible.get(command)
    }

    pub fn lookup(&self, command: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.visible.get(command).or_else(|| self.hidden.get(command))
    }

    /// Visible command tokens, sorted.
    pub fn visible_commands(&self) -> Vec<&str> {
        self.visible.keys().map(String::as_str).collect()
    }
}

/// What the dispatcher did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Sent from outside any guild.
    NoGuild,
    /// Didn't start with the prefix.
    Ignored,
    /// Generic help listing sent.
    HelpListing,
    /// A handler's help was run.
    Help(String),
    UnknownCommand(String),
    PermissionDenied(String),
    Applied(String),
}

pub struct Dispatcher {
    services: Arc<Services>,
    registry: CommandRegistry,
}

impl Dispatcher {
    pub fn new(services: Arc<Services>, registry: CommandRegistry) -> Self {
        Self { services, registry }
    }

    pub async fn dispatch(&self, message: IncomingMessage) -> Result<DispatchOutcome> {
        let Some(guild_id) = message.context_id.clone() else {
            if message.content.starts_with(DEFAULT_COMMAND_PREFIX) {
                self.services
                    .chat
                    .send_message(&message.channel_id, messages::NO_GUILD)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))?;
            }
            return Ok(DispatchOutcome::NoGuild);
        };

        let guild = self.services.guild(&guild_id);
        let prefix = match guild.command_prefix().await {
            Ok(Some(prefix)) => prefix,
            Ok(None) => DEFAULT_COMMAND_PREFIX.to_string(),
            Err(e) => {
                tracing::error!("Prefix lookup failed for {}: {:#}", guild_id, e);
                self.notify_owner(&guild_id, &format!("{:#}", e)).await;
                DEFAULT_COMMAND_PREFIX.to_string()
            }
        };

        let Some(rest) = message.content.strip_prefix(prefix.as_str()) else {
            return Ok(DispatchOutcome::Ignored);
        };
        let args: Vec<String> = rest.split_whitespace().map(String::from).collect();
        let Some(command) = args.first().cloned() else {
            return Ok(DispatchOutcome::Ignored);
        };

        tracing::info!(
            "Dispatching cmd='{}' args={:?} sender='{}'",
            command,
            &args[1..],
            message.author_id
        );

        let ctx = MessageContext::new(message, guild, prefix, args, self.services.clone());

        if command == "help" {
            return self.help(&ctx).await;
        }

        let Some(handler) = self.registry.lookup(&command) else {
            tracing::debug!("No handler for command {}", command);
            return Ok(DispatchOutcome::UnknownCommand(command));
        };
        if !self.permitted(handler.as_ref(), &ctx).await {
            tracing::debug!("{} failed permission check for {}", ctx.author_id(), command);
            return Ok(DispatchOutcome::PermissionDenied(command));
        }

        handler.apply(&ctx).await?;
        Ok(DispatchOutcome::Applied(command))
    }

    async fn help(&self, ctx: &MessageContext) -> Result<DispatchOutcome> {
        let target = ctx
            .arg(1)
            .map(|arg| arg.strip_prefix(ctx.prefix.as_str()).unwrap_or(arg));

        if let Some((command, handler)) =
            target.and_then(|t| self.registry.visible(t).map(|h| (t.to_string(), h)))
        {
            if !self.permitted(handler.as_ref(), ctx).await {
                return Ok(DispatchOutcome::PermissionDenied(command));
            }
            handler.help(ctx).await?;
            return Ok(DispatchOutcome::Help(command));
        }

        let listing = messages::supported_commands(&ctx.prefix, &self.registry.visible_commands());
        ctx.reply(&listing).await?;
        Ok(DispatchOutcome::HelpListing)
    }

    async fn permitted(&self, handler: &dyn CommandHandler, ctx: &MessageContext) -> bool {
        is_permitted(
            handler.permission_level(),
            &ctx.guild,
            self.services.directory.as_ref(),
            ctx.author_id(),
        )
        .await
    }

    async fn notify_owner(&self, guild_id: &str, content: &str) {
        let Some(owner) = self.services.directory.owner(guild_id).await else {
            tracing::warn!("No owner known for {}; dropping diagnostic", guild_id);
            return;
        };
        if let Err(e) = self.services.chat.send_direct(&owner, content).await {
            tracing::error!("Failed to notify owner {}: {}", owner, e);
        }
    }
}
