//! # Permissions
//!
//! Checks a user against a handler's permission level. Any lookup failure denies.

use crate::application::guild::GuildData;
use crate::domain::traits::GuildDirectory;
use crate::domain::types::PermissionLevel;

pub async fn is_permitted(
    level: PermissionLevel,
    guild: &GuildData,
    directory: &dyn GuildDirectory,
    user_id: &str,
) -> bool {
    match level {
        PermissionLevel::Member => match guild.member_role().await {
            Ok(Some(role)) => holds_role(guild, directory, user_id, &role).await,
            Ok(None) => {
                tracing::debug!("No member role set for {}", guild.guild_id());
                false
            }
            Err(e) => {
                tracing::warn!("Member role lookup failed for {}: {}", guild.guild_id(), e);
                false
            }
        },
        PermissionLevel::Officer => match guild.officer_role().await {
            Ok(Some(role)) => holds_role(guild, directory, user_id, &role).await,
            Ok(None) => {
                tracing::debug!("No officer role set for {}", guild.guild_id());
                false
            }
            Err(e) => {
                tracing::warn!("Officer role lookup failed for {}: {}", guild.guild_id(), e);
                false
            }
        },
        PermissionLevel::Owner => directory
            .owner(guild.guild_id())
            .await
            .is_some_and(|owner| owner == user_id),
    }
}

async fn holds_role(
    guild: &GuildData,
    directory: &dyn GuildDirectory,
    user_id: &str,
    role: &str,
) -> bool {
    match directory.roles(guild.guild_id(), user_id).await {
        Ok(roles) => roles.iter().any(|r| r == role),
        Err(e) => {
            tracing::warn!("Role lookup for {} failed: {}", user_id, e);
            false
        }
    }
}
