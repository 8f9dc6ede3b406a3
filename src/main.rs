//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix, Store, Twitter
//! - Application: Dispatcher, Permissions, Sampler, Scheduler
//! - Interface: Command Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;
#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent, SyncRoomMemberEvent},
        message::{MessageType, SyncRoomMessageEvent},
    },
    ruma::UserId,
};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::application::dispatcher::{CommandRegistry, Dispatcher};
use crate::application::sampler::ListSampler;
use crate::application::scheduler::TwitterScheduler;
use crate::application::services::Services;
use crate::domain::config::{AppConfig, DEFAULT_CONFIG_PATH, LoggingConfig};
use crate::domain::types::IncomingMessage;
use crate::infrastructure::matrix::MatrixService;
use crate::infrastructure::twitter::TwitterClient;
use crate::interface::commands::accounts::AccountHandler;
use crate::interface::commands::admin::AdminHandler;
use crate::interface::commands::twitter::TwitterHandler;
use crate::strings::logs;

#[derive(Parser, Debug)]
#[command(version, about = "Guild management bot for Matrix")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

/// File and stdout logging. The returned guard must live as long as the process.
fn init_logging(config: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("Failed to create log directory {}", config.directory))?;

    // Clear previous session log
    let log_path = std::path::Path::new(&config.directory).join(&config.file);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(&config.directory, &config.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

/// Direct message rooms don't belong to any guild. A failed lookup counts as a guild room.
fn is_guild_room<E>(is_direct: Result<bool, E>) -> bool {
    !matches!(is_direct, Ok(true))
}

/// An invite addressed to the bot itself.
fn is_own_invite(invitee: &UserId, own_user_id: &UserId, membership: &MembershipState) -> bool {
    invitee == own_user_id && *membership == MembershipState::Invite
}

/// The bot left or was removed from a room.
fn is_own_departure(member: &UserId, own_user_id: &UserId, membership: &MembershipState) -> bool {
    member == own_user_id && matches!(membership, MembershipState::Leave | MembershipState::Ban)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;
    let _log_guard = init_logging(&config.logging)?;
    tracing::info!("{}", logs::config_loaded(&config.services.matrix.username));

    // 2. Storage and Twitter
    let store = crate::infrastructure::store::open(&config.database).await?;

    let twitter = match &config.services.twitter {
        Some(twitter_config) => Some(Arc::new(TwitterClient::new(twitter_config.clone())?)),
        None => {
            tracing::warn!("{}", logs::TWITTER_DISABLED);
            None
        }
    };

    // 3. Matrix login
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;
    tracing::info!("{}", logs::LOGIN_SUCCESS);

    if let Some(name) = &config.services.matrix.display_name {
        tracing::info!("{}", logs::setting_display_name(name));
        if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
            tracing::warn!("{}", logs::set_display_name_fail(&e.to_string()));
        }
    }

    // 4. Application components
    let matrix = Arc::new(MatrixService::new(
        client.clone(),
        config.services.matrix.owner.clone(),
    ));
    let services = Arc::new(Services {
        chat: matrix.clone(),
        directory: matrix,
        store,
    });

    let mut registry = CommandRegistry::new();
    registry.register(Arc::new(AdminHandler))?;
    registry.register(Arc::new(AccountHandler))?;

    let mut scheduler = None;
    if let Some(twitter) = twitter {
        registry.register(Arc::new(TwitterHandler::new(twitter.clone())))?;
        if config.scheduler.enabled {
            let sampler = Arc::new(ListSampler::new(twitter, config.sampler.clone()));
            scheduler = Some(Arc::new(TwitterScheduler::new(
                services.clone(),
                sampler,
                config.scheduler.clone(),
            )));
        }
    }
    tracing::info!("Visible commands: {:?}", registry.visible_commands());
    let dispatcher = Arc::new(Dispatcher::new(services, registry));

    // 5. Twitter schedulers, once the first sync has populated the joined rooms
    if let Some(scheduler) = scheduler.clone() {
        let startup_client = client.clone();
        tokio::spawn(async move {
            let timeout = Duration::from_secs(60);
            let start = Instant::now();
            loop {
                let rooms = startup_client.joined_rooms();
                if !rooms.is_empty() {
                    for room in rooms {
                        if !is_guild_room(room.is_direct().await) {
                            continue;
                        }
                        let room_id = room.room_id().to_string();
                        if scheduler.start(&room_id).is_some() {
                            tracing::info!("{}", logs::scheduler_started(&room_id));
                        }
                    }
                    break;
                }
                if start.elapsed() > timeout {
                    tracing::warn!("{}", logs::NO_ROOMS_AFTER_SYNC);
                    break;
                }
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        });
    }

    // 6. Event handlers
    let start_time = SystemTime::now();
    let loop_dispatcher = dispatcher.clone();
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let dispatcher = loop_dispatcher.clone();
        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore events older than start_time
            let ts = ev.origin_server_ts();
            let event_time = UNIX_EPOCH + Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }
            if original_msg.sender == room.own_user_id() {
                return;
            }
            let MessageType::Text(text_content) = &original_msg.content.msgtype else {
                return;
            };
            tracing::info!(
                "Received message from {}: \n{}",
                original_msg.sender,
                text_content.body
            );

            let author_name = match room.get_member(&original_msg.sender).await {
                Ok(Some(member)) => member.name().to_string(),
                _ => original_msg.sender.localpart().to_string(),
            };
            let context_id = is_guild_room(room.is_direct().await)
                .then(|| room.room_id().to_string());
            let message = IncomingMessage {
                author_id: original_msg.sender.to_string(),
                author_name,
                context_id,
                channel_id: room.room_id().to_string(),
                content: text_content.body.clone(),
            };

            match dispatcher.dispatch(message).await {
                Ok(outcome) => tracing::debug!("Dispatch outcome: {:?}", outcome),
                Err(e) => tracing::error!("Failed to dispatch message: {:#}", e),
            }
        }
    });

    // Join on invite, and start posting tweets to the new room
    let invite_scheduler = scheduler.clone();
    client.add_event_handler(move |ev: StrippedRoomMemberEvent, room: Room| {
        let scheduler = invite_scheduler.clone();
        async move {
            if !is_own_invite(&ev.state_key, room.own_user_id(), &ev.content.membership) {
                return;
            }
            let room_id = room.room_id().to_string();
            tracing::info!("{}", logs::invite_received(&room_id));
            if let Err(e) = room.join().await {
                tracing::error!("{}", logs::invite_join_fail(&room_id, &e.to_string()));
                return;
            }
            if let Some(scheduler) = scheduler {
                if is_guild_room(room.is_direct().await) && scheduler.start(&room_id).is_some() {
                    tracing::info!("{}", logs::scheduler_started(&room_id));
                }
            }
        }
    });

    // Stop posting to rooms the bot leaves or is removed from
    let leave_scheduler = scheduler.clone();
    client.add_event_handler(move |ev: SyncRoomMemberEvent, room: Room| {
        let scheduler = leave_scheduler.clone();
        async move {
            let Some(scheduler) = scheduler else {
                return;
            };
            if !is_own_departure(ev.state_key(), room.own_user_id(), ev.membership()) {
                return;
            }
            let room_id = room.room_id().to_string();
            if scheduler.cancel(&room_id) {
                tracing::info!("{}", logs::scheduler_stopped(&room_id));
            }
        }
    });

    // 7. Sync forever
    tracing::info!("{}", logs::SYNC_LOOP_START);
    if let Err(e) = client.sync(SyncSettings::default()).await {
        tracing::error!("{}", logs::sync_loop_fail(&e.to_string()));
        return Err(e.into());
    }

    Ok(())
}
