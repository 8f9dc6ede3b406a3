//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` and `GuildDirectory` traits for the Matrix protocol using the
//! `matrix_sdk`. A guild is a room. Its Twitter channel is the guild room itself, or another
//! joined room named by id or canonical alias.

use async_trait::async_trait;
use matrix_sdk::Client;
use matrix_sdk::room::{Room, RoomMember, RoomMemberRole};
use matrix_sdk::ruma::events::room::member::MembershipState;
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;
use matrix_sdk::ruma::{RoomId, UserId};

use crate::domain::traits::{ChatProvider, GuildDirectory};

pub const MEMBER_ROLE: &str = "member";
pub const MODERATOR_ROLE: &str = "moderator";
pub const ADMIN_ROLE: &str = "admin";

#[derive(Clone)]
pub struct MatrixService {
    client: Client,
    owner: Option<String>,
}

impl MatrixService {
    pub fn new(client: Client, owner: Option<String>) -> Self {
        Self { client, owner }
    }

    fn room(&self, room_id: &str) -> Result<Room, String> {
        let room_id = RoomId::parse(room_id).map_err(|e| e.to_string())?;
        self.client
            .get_room(&room_id)
            .ok_or_else(|| format!("Not in room {}", room_id))
    }

    async fn joined_member(&self, context_id: &str, user_id: &str) -> Result<Option<RoomMember>, String> {
        let room = self.room(context_id)?;
        let user_id = UserId::parse(user_id).map_err(|e| e.to_string())?;
        let member = room.get_member(&user_id).await.map_err(|e| e.to_string())?;
        Ok(member.filter(|m| *m.membership() == MembershipState::Join))
    }

    async fn dm_room(&self, user_id: &str) -> Result<Room, String> {
        let user_id = UserId::parse(user_id).map_err(|e| e.to_string())?;
        if let Some(room) = self.client.get_dm_room(&user_id) {
            return Ok(room);
        }
        tracing::info!("Creating direct message room with {}", user_id);
        self.client
            .create_dm(&user_id)
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), String> {
        tracing::info!("Bot sending message to {}: {}", channel_id, content);
        self.room(channel_id)?
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn send_direct(&self, user_id: &str, content: &str) -> Result<(), String> {
        tracing::info!("Bot sending direct message to {}", user_id);
        self.dm_room(user_id)
            .await?
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn find_channel(&self, context_id: &str, name: &str) -> Option<String> {
        let rooms: Vec<RoomLabels> = self
            .client
            .joined_rooms()
            .into_iter()
            .map(|room| RoomLabels {
                id: room.room_id().to_string(),
                alias: room.canonical_alias().map(|alias| alias.to_string()),
                name: room.name(),
            })
            .collect();
        resolve_channel(context_id, name, &rooms)
    }
}

/// The identifiers a channel setting can refer to a room by.
#[derive(Debug)]
struct RoomLabels {
    id: String,
    alias: Option<String>,
    name: Option<String>,
}

/// The guild's own room matches by id, alias or name. Other joined rooms match only by id or
/// canonical alias, since room names are neither unique nor scoped to a guild.
fn resolve_channel(context_id: &str, name: &str, rooms: &[RoomLabels]) -> Option<String> {
    let by_identifier =
        |room: &RoomLabels| room.id == name || room.alias.as_deref() == Some(name);

    if let Some(own) = rooms.iter().find(|room| room.id == context_id) {
        if by_identifier(own) || own.name.as_deref() == Some(name) {
            return Some(own.id.clone());
        }
    }
    rooms
        .iter()
        .find(|&room| by_identifier(room))
        .map(|room| room.id.clone())
}

#[async_trait]
impl GuildDirectory for MatrixService {
    async fn roles(&self, context_id: &str, user_id: &str) -> Result<Vec<String>, String> {
        let Some(member) = self.joined_member(context_id, user_id).await? else {
            return Ok(Vec::new());
        };
        let mut roles = vec![MEMBER_ROLE.to_string()];
        match member.suggested_role_for_power_level() {
            RoomMemberRole::Moderator => roles.push(MODERATOR_ROLE.to_string()),
            RoomMemberRole::User => {}
            _ => {
                roles.push(MODERATOR_ROLE.to_string());
                roles.push(ADMIN_ROLE.to_string());
            }
        }
        Ok(roles)
    }

    async fn owner(&self, _context_id: &str) -> Option<String> {
        self.owner.clone()
    }

    async fn display_name(&self, context_id: &str, user_id: &str) -> Option<String> {
        match self.joined_member(context_id, user_id).await {
            Ok(member) => member.map(|m| m.display_name().unwrap_or(m.name()).to_string()),
            Err(e) => {
                tracing::warn!("Failed to look up {} in {}: {}", user_id, context_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, alias: Option<&str>, name: Option<&str>) -> RoomLabels {
        RoomLabels {
            id: id.to_string(),
            alias: alias.map(String::from),
            name: name.map(String::from),
        }
    }

    fn rooms() -> Vec<RoomLabels> {
        vec![
            room("!other:x", Some("#tweets:x"), Some("tweets")),
            room("!guild:x", None, Some("tweets")),
            room("!feed:x", Some("#feed:x"), Some("feed")),
        ]
    }

    #[test]
    fn test_guild_room_wins_name_lookup() {
        assert_eq!(
            resolve_channel("!guild:x", "tweets", &rooms()).as_deref(),
            Some("!guild:x")
        );
    }

    #[test]
    fn test_other_rooms_need_id_or_alias() {
        let rooms = rooms();
        assert_eq!(resolve_channel("!guild:x", "feed", &rooms), None);
        assert_eq!(
            resolve_channel("!guild:x", "#feed:x", &rooms).as_deref(),
            Some("!feed:x")
        );
        assert_eq!(
            resolve_channel("!guild:x", "!feed:x", &rooms).as_deref(),
            Some("!feed:x")
        );
    }

    #[test]
    fn test_name_of_another_guild_room_is_not_matched() {
        assert_eq!(resolve_channel("!feed:x", "tweets", &rooms()), None);
    }
}
